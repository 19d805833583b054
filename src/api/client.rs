use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::api::error::{ApiError, Endpoint};
use crate::api::types::{
    AnalysisResult, ConversationTurn, ErrorBody, JobPosting, JobSource, JobsResponse,
    NextQuestionRequest, NextQuestionResponse, NextStep, ResumeUploadResult, SummaryRequest,
    SummaryResponse,
};
use crate::telemetry::events::record_backend_failure;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// 面试后端的调用契约。所有 HTTP 访问都必须经由该 trait。
///
/// 每个操作都是单次请求，失败不重试；重试由触发动作的用户决定。
#[async_trait]
pub trait InterviewBackend: Send + Sync {
    /// 上传简历文件（multipart 字段 `file`），返回解析出的纯文本。
    async fn upload_resume(
        &self,
        file_name: &str,
        payload: Bytes,
    ) -> Result<ResumeUploadResult, ApiError>;

    /// 分析简历文本，铸造面试会话并返回匹配分与介绍。
    async fn analyze(&self, resume_text: &str) -> Result<AnalysisResult, ApiError>;

    /// 请求下一问。面试是否结束以响应里的 completed 标记为准。
    async fn next_question(
        &self,
        request: NextQuestionRequest<'_>,
    ) -> Result<NextStep, ApiError>;

    /// 汇总整场面试。调用方在失败时自行降级，不应让流程中断。
    async fn summarize(
        &self,
        resume_text: &str,
        score: u32,
        conversation: &[ConversationTurn],
    ) -> Result<String, ApiError>;

    /// 拉取职位列表。
    async fn list_jobs(&self, source: JobSource) -> Result<Vec<JobPosting>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl BackendConfig {
    /// 从 HIREFLOW_API_BASE / HIREFLOW_REQUEST_TIMEOUT_SECS 读取部署配置。
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("HIREFLOW_API_BASE") {
            if !base_url.trim().is_empty() {
                config.base_url = base_url;
            }
        }

        if let Ok(timeout) = std::env::var("HIREFLOW_REQUEST_TIMEOUT_SECS") {
            if let Ok(seconds) = timeout.trim().parse::<u64>() {
                if seconds > 0 {
                    config.request_timeout = Duration::from_secs(seconds);
                }
            }
        }

        config
    }
}

/// reqwest 实现的后端客户端。
#[derive(Clone)]
pub struct SessionApiClient {
    client: Client,
    base_url: String,
}

impl SessionApiClient {
    pub fn new(config: BackendConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(
        response: Response,
        endpoint: Endpoint,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .map(|body| body.detail)
                .filter(|detail| !detail.trim().is_empty())
                .unwrap_or_else(|| endpoint.fallback_message().to_string());

            record_backend_failure(endpoint.as_str(), status.as_u16(), &message);

            return Err(ApiError::Api {
                endpoint,
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl InterviewBackend for SessionApiClient {
    async fn upload_resume(
        &self,
        file_name: &str,
        payload: Bytes,
    ) -> Result<ResumeUploadResult, ApiError> {
        let part = Part::bytes(payload.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/api/resume/upload"))
            .multipart(form)
            .send()
            .await?;

        let result: ResumeUploadResult = Self::decode(response, Endpoint::Upload).await?;

        debug!(
            target: "session_api",
            file_name,
            chars = result.text_content.chars().count(),
            "resume uploaded"
        );

        Ok(result)
    }

    async fn analyze(&self, resume_text: &str) -> Result<AnalysisResult, ApiError> {
        let response = self
            .client
            .post(self.url("/api/interview/analyze"))
            .json(&serde_json::json!({ "resume_text": resume_text }))
            .send()
            .await?;

        let analysis: AnalysisResult = Self::decode(response, Endpoint::Analyze).await?;

        debug!(
            target: "session_api",
            session_id = %analysis.session_id,
            score = analysis.score,
            "resume analyzed"
        );

        Ok(analysis)
    }

    async fn next_question(
        &self,
        request: NextQuestionRequest<'_>,
    ) -> Result<NextStep, ApiError> {
        let response = self
            .client
            .post(self.url("/api/interview/next"))
            .json(&request)
            .send()
            .await?;

        let step: NextQuestionResponse = Self::decode(response, Endpoint::NextQuestion).await?;
        Ok(step.into())
    }

    async fn summarize(
        &self,
        resume_text: &str,
        score: u32,
        conversation: &[ConversationTurn],
    ) -> Result<String, ApiError> {
        let request = SummaryRequest {
            resume_text,
            score,
            conversation,
        };

        let response = self
            .client
            .post(self.url("/api/interview/summary"))
            .json(&request)
            .send()
            .await?;

        let summary: SummaryResponse = Self::decode(response, Endpoint::Summary).await?;
        Ok(summary.summary)
    }

    async fn list_jobs(&self, source: JobSource) -> Result<Vec<JobPosting>, ApiError> {
        let response = self.client.get(self.url(source.path())).send().await?;

        let jobs: JobsResponse = Self::decode(response, Endpoint::Jobs).await?;

        debug!(
            target: "session_api",
            source = source.as_str(),
            count = jobs.jobs.len(),
            "job listings fetched"
        );

        Ok(jobs.jobs)
    }
}
