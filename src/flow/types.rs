use crate::flow::state::FlowState;

/// 上层发往流程 worker 的指令。
#[derive(Debug, Clone)]
pub enum FlowCommand {
    Start,
    EditAnswer(String),
    AppendTranscript(String),
    Submit,
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Warn => "warn",
            NoticeLevel::Error => "error",
        }
    }
}

/// 面向用户的提示信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNotice {
    pub level: NoticeLevel,
    pub message: String,
}

impl FlowNotice {
    pub fn new<S: Into<String>>(level: NoticeLevel, message: S) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// 逐字显示进度：当前已展示的前缀。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealProgress {
    pub revealed: String,
    pub done: bool,
}

#[derive(Debug, Clone)]
pub enum FlowUpdatePayload {
    State(FlowState),
    Reveal(RevealProgress),
    Notice(FlowNotice),
}

/// 流程 worker 发出的增量更新。
#[derive(Debug, Clone)]
pub struct FlowUpdate {
    pub generation: u64,
    pub payload: FlowUpdatePayload,
}
