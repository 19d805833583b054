//! 面试阶段状态机：不可变状态快照加纯 reducer。
//!
//! reducer 不触碰时钟与网络，只声明需要执行的效果；调度由 runtime 完成，
//! 因此全部转移逻辑都可以在无渲染环境下做单元测试。

use crate::api::{AnalysisResult, ConversationTurn, NextStep};
use crate::flow::config::FlowConfig;
use crate::flow::constants::{
    CLOSING_MESSAGE, FALLBACK_SUMMARY, MISSING_RESUME_GUIDANCE, MISSING_SESSION_GUIDANCE,
};
use crate::flow::types::{FlowNotice, NoticeLevel};

/// 面试阶段。除显式重开外只向前推进。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewStage {
    Intro,
    Interview,
    Summary,
}

impl InterviewStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStage::Intro => "intro",
            InterviewStage::Interview => "interview",
            InterviewStage::Summary => "summary",
        }
    }
}

/// 启动面试所需的外部输入：会话键、简历文本与匹配分。
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session_id: String,
    pub resume_text: String,
    pub score: u32,
}

impl SessionContext {
    pub fn new<S: Into<String>>(analysis: &AnalysisResult, resume_text: S) -> Self {
        Self {
            session_id: analysis.session_id.clone(),
            resume_text: resume_text.into(),
            score: analysis.score,
        }
    }
}

/// 流程状态快照。
///
/// generation 在每次重开时递增；所有异步效果都携带发起时的 generation，
/// 回流事件不匹配即被丢弃，过期响应无法污染新会话。
#[derive(Debug, Clone, PartialEq)]
pub struct FlowState {
    pub stage: InterviewStage,
    pub generation: u64,
    /// 当前展示的问题全文（逐字显示进度由 runtime 单独下发）。
    pub question: String,
    /// 作答草稿。
    pub answer: String,
    /// 已提交的问答轮次，只增不改。
    pub conversation: Vec<ConversationTurn>,
    pub summary: String,
    pub time_left: u32,
    /// 收尾提示展示期间为真，期间禁用作答输入与倒计时。
    pub auto_closing: bool,
    /// 同一动作至多一个在途后端请求。
    pub awaiting_backend: bool,
    /// 问题逐字显示尚未结束。
    pub revealing: bool,
}

impl FlowState {
    pub fn new(config: &FlowConfig) -> Self {
        Self {
            stage: InterviewStage::Intro,
            generation: 0,
            question: String::new(),
            answer: String::new(),
            conversation: Vec::new(),
            summary: String::new(),
            time_left: config.question_time_limit,
            auto_closing: false,
            awaiting_backend: false,
            revealing: false,
        }
    }

    pub fn turn_count(&self) -> usize {
        self.conversation.len()
    }

    /// 作答输入是否可用。
    pub fn input_enabled(&self) -> bool {
        self.stage == InterviewStage::Interview && !self.auto_closing
    }

    fn countdown_running(&self) -> bool {
        self.stage == InterviewStage::Interview
            && !self.auto_closing
            && !self.revealing
            && !self.awaiting_backend
    }
}

/// 驱动状态转移的事件。带 generation 的变体由异步效果回流。
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    StartRequested,
    AnswerEdited(String),
    /// 语音识别结果，追加到草稿而不是替换。
    TranscriptAppended(String),
    SubmitRequested,
    CountdownTick,
    QuestionArrived { generation: u64, step: NextStep },
    QuestionFailed { generation: u64, message: String },
    RevealFinished { generation: u64 },
    SummaryArrived { generation: u64, summary: String },
    SummaryFailed { generation: u64 },
    AutoCloseElapsed { generation: u64 },
    RestartRequested,
}

/// reducer 声明、runtime 执行的副作用。
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchQuestion {
        generation: u64,
        last_answer: Option<String>,
    },
    FetchSummary {
        generation: u64,
        conversation: Vec<ConversationTurn>,
    },
    RevealQuestion {
        generation: u64,
        text: String,
    },
    Speak {
        text: String,
    },
    ScheduleAutoClose {
        generation: u64,
    },
    Notify(FlowNotice),
}

/// 纯转移函数：旧状态加事件得到新状态与待执行效果。
pub fn reduce(
    state: &FlowState,
    event: FlowEvent,
    config: &FlowConfig,
    ctx: &SessionContext,
) -> (FlowState, Vec<Effect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match event {
        FlowEvent::StartRequested => {
            if next.stage != InterviewStage::Intro || next.awaiting_backend {
                return (next, effects);
            }

            if ctx.session_id.trim().is_empty() {
                effects.push(Effect::Notify(FlowNotice::new(
                    NoticeLevel::Warn,
                    MISSING_SESSION_GUIDANCE,
                )));
                return (next, effects);
            }

            if ctx.resume_text.trim().is_empty() {
                effects.push(Effect::Notify(FlowNotice::new(
                    NoticeLevel::Warn,
                    MISSING_RESUME_GUIDANCE,
                )));
                return (next, effects);
            }

            next.stage = InterviewStage::Interview;
            next.awaiting_backend = true;
            effects.push(Effect::FetchQuestion {
                generation: next.generation,
                last_answer: None,
            });
        }

        FlowEvent::AnswerEdited(text) => {
            if next.input_enabled() {
                next.answer = text;
            }
        }

        FlowEvent::TranscriptAppended(chunk) => {
            let chunk = chunk.trim();
            if !chunk.is_empty() && next.input_enabled() {
                if next.answer.is_empty() {
                    next.answer = chunk.to_string();
                } else {
                    next.answer.push(' ');
                    next.answer.push_str(chunk);
                }
            }
        }

        FlowEvent::SubmitRequested => {
            effects.extend(commit_answer(&mut next, config, false));
        }

        FlowEvent::CountdownTick => {
            if next.countdown_running() && next.time_left > 0 {
                next.time_left -= 1;
                if next.time_left == 0 {
                    effects.extend(commit_answer(&mut next, config, true));
                }
            }
        }

        FlowEvent::QuestionArrived { generation, step } => {
            if generation != next.generation || next.stage != InterviewStage::Interview {
                return (next, effects);
            }

            next.awaiting_backend = false;

            match step {
                NextStep::Completed { message } => {
                    effects.extend(enter_closing(&mut next, message));
                }
                NextStep::Question(text) => {
                    next.question = text.clone();
                    next.revealing = true;
                    effects.push(Effect::RevealQuestion { generation, text });
                }
            }
        }

        FlowEvent::QuestionFailed {
            generation,
            message,
        } => {
            if generation != next.generation {
                return (next, effects);
            }

            next.awaiting_backend = false;
            effects.push(Effect::Notify(FlowNotice::new(
                NoticeLevel::Error,
                format!("Could not fetch next question: {message}"),
            )));
        }

        FlowEvent::RevealFinished { generation } => {
            if generation != next.generation || !next.revealing {
                return (next, effects);
            }

            next.revealing = false;
            next.time_left = config.question_time_limit;
            effects.push(Effect::Speak {
                text: next.question.clone(),
            });
        }

        FlowEvent::SummaryArrived {
            generation,
            summary,
        } => {
            if generation != next.generation {
                return (next, effects);
            }

            next.awaiting_backend = false;
            next.summary = if summary.trim().is_empty() {
                FALLBACK_SUMMARY.to_string()
            } else {
                summary
            };
            effects.push(Effect::ScheduleAutoClose { generation });
        }

        FlowEvent::SummaryFailed { generation } => {
            if generation != next.generation {
                return (next, effects);
            }

            // 总结失败刻意降级为固定文案，流程必须到达终态。
            next.awaiting_backend = false;
            next.summary = FALLBACK_SUMMARY.to_string();
            effects.push(Effect::ScheduleAutoClose { generation });
        }

        FlowEvent::AutoCloseElapsed { generation } => {
            if generation != next.generation || !next.auto_closing {
                return (next, effects);
            }

            next.auto_closing = false;
            next.stage = InterviewStage::Summary;
        }

        FlowEvent::RestartRequested => {
            next.generation = state.generation + 1;
            next.stage = InterviewStage::Intro;
            next.question.clear();
            next.answer.clear();
            next.summary.clear();
            next.conversation.clear();
            next.time_left = config.question_time_limit;
            next.auto_closing = false;
            next.awaiting_backend = false;
            next.revealing = false;
        }
    }

    (next, effects)
}

/// 提交当前草稿。forced 为倒计时触发：即使草稿为空也必须提交。
fn commit_answer(state: &mut FlowState, config: &FlowConfig, forced: bool) -> Vec<Effect> {
    if state.stage != InterviewStage::Interview || state.auto_closing || state.awaiting_backend {
        return Vec::new();
    }

    let committed = state.answer.trim().to_string();
    if !forced && committed.is_empty() {
        return Vec::new();
    }

    if !state.question.is_empty() {
        state.conversation.push(ConversationTurn {
            question: state.question.clone(),
            answer: committed.clone(),
        });
    }
    state.answer.clear();
    state.revealing = false;

    if state.conversation.len() >= config.max_turns {
        return enter_closing(state, None);
    }

    state.awaiting_backend = true;
    vec![Effect::FetchQuestion {
        generation: state.generation,
        last_answer: Some(committed),
    }]
}

/// 进入收尾：展示结束语并请求总结，总结就绪后再延时切换阶段。
fn enter_closing(state: &mut FlowState, message: Option<String>) -> Vec<Effect> {
    state.auto_closing = true;
    state.revealing = false;
    state.awaiting_backend = true;
    state.question = message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| CLOSING_MESSAGE.to_string());

    vec![Effect::FetchSummary {
        generation: state.generation,
        conversation: state.conversation.clone(),
    }]
}
