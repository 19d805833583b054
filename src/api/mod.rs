//! 面试后端 API 客户端脚手架。

pub mod client;
pub mod error;
pub mod types;

pub use client::{BackendConfig, InterviewBackend, SessionApiClient};
pub use error::{ApiError, Endpoint};
pub use types::{
    AnalysisResult, ConversationTurn, JobPosting, JobSource, NextQuestionRequest, NextStep,
    ResumeUploadResult,
};
