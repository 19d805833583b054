use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::flow::types::FlowCommand;

/// 面试流程的外部句柄。Drop 时中止 worker。
pub struct InterviewFlowHandle {
    command_tx: mpsc::Sender<FlowCommand>,
    worker: Option<JoinHandle<()>>,
}

impl InterviewFlowHandle {
    pub(super) fn new(command_tx: mpsc::Sender<FlowCommand>, worker: JoinHandle<()>) -> Self {
        Self {
            command_tx,
            worker: Some(worker),
        }
    }

    pub async fn start(&self) -> Result<(), mpsc::error::SendError<FlowCommand>> {
        self.command_tx.send(FlowCommand::Start).await
    }

    pub async fn edit_answer<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<(), mpsc::error::SendError<FlowCommand>> {
        self.command_tx
            .send(FlowCommand::EditAnswer(text.into()))
            .await
    }

    /// 追加一段语音识别结果到当前草稿。
    pub async fn append_transcript<S: Into<String>>(
        &self,
        chunk: S,
    ) -> Result<(), mpsc::error::SendError<FlowCommand>> {
        let chunk = chunk.into();
        if chunk.trim().is_empty() {
            warn!(target: "interview_flow", "ignoring empty voice transcript");
            return Ok(());
        }

        self.command_tx
            .send(FlowCommand::AppendTranscript(chunk))
            .await
    }

    pub async fn submit(&self) -> Result<(), mpsc::error::SendError<FlowCommand>> {
        self.command_tx.send(FlowCommand::Submit).await
    }

    pub async fn restart(&self) -> Result<(), mpsc::error::SendError<FlowCommand>> {
        self.command_tx.send(FlowCommand::Restart).await
    }

    pub fn command_sender(&self) -> mpsc::Sender<FlowCommand> {
        self.command_tx.clone()
    }
}

impl Drop for InterviewFlowHandle {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}
