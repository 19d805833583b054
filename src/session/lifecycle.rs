//! 会话生命周期广播负载定义。

use std::time::SystemTime;

use crate::flow::InterviewStage;

/// 会话状态机的阶段划分。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLifecyclePhase {
    Intro,
    Interview,
    Summary,
}

impl SessionLifecyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionLifecyclePhase::Intro => "intro",
            SessionLifecyclePhase::Interview => "interview",
            SessionLifecyclePhase::Summary => "summary",
        }
    }
}

impl From<InterviewStage> for SessionLifecyclePhase {
    fn from(stage: InterviewStage) -> Self {
        match stage {
            InterviewStage::Intro => SessionLifecyclePhase::Intro,
            InterviewStage::Interview => SessionLifecyclePhase::Interview,
            InterviewStage::Summary => SessionLifecyclePhase::Summary,
        }
    }
}

/// 生命周期事件。
#[derive(Debug, Clone)]
pub struct SessionLifecycleUpdate {
    pub session_id: String,
    pub phase: SessionLifecyclePhase,
    pub issued_at: SystemTime,
}

impl SessionLifecycleUpdate {
    pub fn new<S: Into<String>>(session_id: S, phase: SessionLifecyclePhase) -> Self {
        Self {
            session_id: session_id.into(),
            phase,
            issued_at: SystemTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_map_one_to_one_from_interview_stages() {
        assert_eq!(
            SessionLifecyclePhase::from(InterviewStage::Intro),
            SessionLifecyclePhase::Intro
        );
        assert_eq!(
            SessionLifecyclePhase::from(InterviewStage::Interview),
            SessionLifecyclePhase::Interview
        );
        assert_eq!(
            SessionLifecyclePhase::from(InterviewStage::Summary),
            SessionLifecyclePhase::Summary
        );
    }

    #[test]
    fn update_helper_carries_the_session_id() {
        let update = SessionLifecycleUpdate::new("s1", SessionLifecyclePhase::Interview);

        assert_eq!(update.session_id, "s1");
        assert_eq!(update.phase.as_str(), "interview");
    }
}
