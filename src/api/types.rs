use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// 职位列表的数据来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSource {
    /// 平台自有职位库。
    Curated,
    /// RemoteOK 聚合源。
    RemoteOk,
}

impl JobSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::Curated => "curated",
            JobSource::RemoteOk => "remoteok",
        }
    }

    pub(crate) fn path(&self) -> &'static str {
        match self {
            JobSource::Curated => "/api/jobs",
            JobSource::RemoteOk => "/api/jobs/remoteok",
        }
    }
}

/// 职位条目，拉取后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl JobPosting {
    /// 展示用地点，缺省时视为远程。
    pub fn location_label(&self) -> &str {
        self.location
            .as_deref()
            .filter(|location| !location.trim().is_empty())
            .unwrap_or("Remote")
    }
}

/// 简历解析结果。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResumeUploadResult {
    pub text_content: String,
}

/// 简历分析结果，session_id 是后续面试调用的关联键。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "opaque_id")]
    pub session_id: String,
    pub score: u32,
    pub intro: String,
}

/// 一轮问答，入会话记录后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
}

/// 追问请求。首问的 last_answer 必须为空。
#[derive(Debug, Serialize)]
pub struct NextQuestionRequest<'a> {
    pub session_id: &'a str,
    pub resume_text: &'a str,
    pub score: u32,
    pub last_answer: Option<&'a str>,
}

/// 追问接口的去向：继续提问，或由后端宣告面试结束。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    Question(String),
    Completed { message: Option<String> },
}

#[derive(Debug, Deserialize)]
pub(crate) struct NextQuestionResponse {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    message: Option<String>,
}

impl From<NextQuestionResponse> for NextStep {
    fn from(response: NextQuestionResponse) -> Self {
        if response.completed {
            NextStep::Completed {
                message: response.message,
            }
        } else {
            NextStep::Question(response.question.unwrap_or_default())
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SummaryRequest<'a> {
    pub resume_text: &'a str,
    pub score: u32,
    pub conversation: &'a [ConversationTurn],
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryResponse {
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobsResponse {
    #[serde(default)]
    pub jobs: Vec<JobPosting>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}

// Backends disagree on whether ids are JSON strings or numbers; the client
// treats them as opaque either way.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(id) => Ok(id.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
