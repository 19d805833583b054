//! 会话管理状态机脚手架。

pub mod console;
pub mod lifecycle;

use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use crate::api::{AnalysisResult, ApiError, InterviewBackend};
use crate::flow::{
    spawn_flow, FlowConfig, FlowUpdate, FlowUpdatePayload, InterviewFlowHandle, InterviewStage,
    SessionContext,
};
use crate::session::lifecycle::{SessionLifecyclePhase, SessionLifecycleUpdate};
use crate::speech::SpeechCapability;

/// 面试会话协调器：串联简历上传、分析、面试流程与语音能力。
///
/// 所有派生状态仅存活于本实例，重开即丢弃；跨标签页、跨进程不共享。
pub struct SessionManager {
    backend: Arc<dyn InterviewBackend>,
    speech: Arc<dyn SpeechCapability>,
    flow_config: FlowConfig,
    lifecycle_tx: broadcast::Sender<SessionLifecycleUpdate>,
    resume_text: Option<String>,
    analysis: Option<AnalysisResult>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn InterviewBackend>, speech: Arc<dyn SpeechCapability>) -> Self {
        Self::with_config(backend, speech, FlowConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn InterviewBackend>,
        speech: Arc<dyn SpeechCapability>,
        flow_config: FlowConfig,
    ) -> Self {
        let (lifecycle_tx, _) = broadcast::channel(32);

        Self {
            backend,
            speech,
            flow_config,
            lifecycle_tx,
            resume_text: None,
            analysis: None,
        }
    }

    pub fn backend(&self) -> Arc<dyn InterviewBackend> {
        Arc::clone(&self.backend)
    }

    pub fn subscribe_lifecycle(&self) -> broadcast::Receiver<SessionLifecycleUpdate> {
        self.lifecycle_tx.subscribe()
    }

    pub fn resume_text(&self) -> Option<&str> {
        self.resume_text.as_deref()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// 上传简历并留存解析出的纯文本，供后续所有面试调用复用。
    pub async fn upload_resume(
        &mut self,
        file_name: &str,
        payload: Bytes,
    ) -> Result<String, ApiError> {
        let result = self.backend.upload_resume(file_name, payload).await?;
        self.resume_text = Some(result.text_content.clone());
        Ok(result.text_content)
    }

    /// 分析已上传的简历，铸造面试会话。
    pub async fn analyze(&mut self) -> Result<AnalysisResult, ApiError> {
        let resume_text = self.resume_text.clone().unwrap_or_default();
        let analysis = self.backend.analyze(&resume_text).await?;

        info!(
            target: "interview_session",
            session_id = %analysis.session_id,
            score = analysis.score,
            "interview session created"
        );

        let _ = self.lifecycle_tx.send(SessionLifecycleUpdate::new(
            analysis.session_id.clone(),
            SessionLifecyclePhase::Intro,
        ));

        self.analysis = Some(analysis.clone());
        Ok(analysis)
    }

    /// 启动面试流程 worker。
    ///
    /// 前置条件不足时流程仍可启动，Start 指令会被 reducer 挡下并给出提示。
    /// 阶段切换会同步转发到生命周期广播。
    pub fn start_interview(&self) -> (InterviewFlowHandle, mpsc::Receiver<FlowUpdate>) {
        let ctx = match (&self.analysis, &self.resume_text) {
            (Some(analysis), Some(resume_text)) => {
                SessionContext::new(analysis, resume_text.as_str())
            }
            _ => SessionContext::default(),
        };
        let session_id = ctx.session_id.clone();

        let (handle, mut inner_rx) = spawn_flow(
            self.flow_config.clone(),
            ctx,
            Arc::clone(&self.backend),
            Arc::clone(&self.speech),
        );

        let (out_tx, out_rx) = mpsc::channel(self.flow_config.channel_capacity);
        let lifecycle_tx = self.lifecycle_tx.clone();

        tokio::spawn(async move {
            let mut last_stage: Option<InterviewStage> = None;

            while let Some(update) = inner_rx.recv().await {
                if let FlowUpdatePayload::State(state) = &update.payload {
                    if last_stage != Some(state.stage) {
                        last_stage = Some(state.stage);
                        let _ = lifecycle_tx.send(SessionLifecycleUpdate::new(
                            session_id.clone(),
                            state.stage.into(),
                        ));
                    }
                }

                if out_tx.send(update).await.is_err() {
                    break;
                }
            }
        });

        (handle, out_rx)
    }

    /// 触发一次语音作答：识别结果追加进当前草稿。返回是否有结果入稿。
    pub async fn capture_voice_answer(&self, handle: &InterviewFlowHandle) -> Result<bool> {
        if !self.speech.is_supported() {
            warn!(
                target: "interview_session",
                "voice capture requested but speech is not supported"
            );
            return Ok(false);
        }

        match self.speech.capture_once().await? {
            Some(transcript) if !transcript.trim().is_empty() => {
                handle.append_transcript(transcript).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
