use thiserror::Error;

/// 后端端点标识，用于遥测与缺省错误文案。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Upload,
    Analyze,
    NextQuestion,
    Summary,
    Jobs,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Upload => "resume_upload",
            Endpoint::Analyze => "interview_analyze",
            Endpoint::NextQuestion => "interview_next",
            Endpoint::Summary => "interview_summary",
            Endpoint::Jobs => "jobs",
        }
    }

    /// 响应体不可解析时使用的缺省文案。
    pub(crate) fn fallback_message(&self) -> &'static str {
        match self {
            Endpoint::Upload => "Upload failed",
            Endpoint::Analyze => "Failed to analyze resume",
            Endpoint::NextQuestion => "Failed to get next question",
            Endpoint::Summary => "Failed to summarize interview",
            Endpoint::Jobs => "Failed to load jobs",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api {
        endpoint: Endpoint,
        status: u16,
        message: String,
    },
}

impl ApiError {
    /// 面向用户展示的错误文案，Api 变体只保留后端消息本身。
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http(err) => err.to_string(),
            ApiError::Api { message, .. } => message.clone(),
        }
    }
}
