//! 面试流程编排脚手架。

mod constants;
mod runtime;

pub mod config;
pub mod state;
pub mod types;

pub use config::FlowConfig;
pub use runtime::InterviewFlowHandle;
pub use state::{reduce, Effect, FlowEvent, FlowState, InterviewStage, SessionContext};
pub use types::{
    FlowCommand, FlowNotice, FlowUpdate, FlowUpdatePayload, NoticeLevel, RevealProgress,
};

pub(crate) use runtime::spawn_flow;

#[cfg(test)]
mod tests;
