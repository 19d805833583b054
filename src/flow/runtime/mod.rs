mod handle;
mod worker;

pub use handle::InterviewFlowHandle;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::InterviewBackend;
use crate::flow::config::FlowConfig;
use crate::flow::state::{FlowState, SessionContext};
use crate::flow::types::{FlowCommand, FlowUpdate};
use crate::speech::SpeechCapability;

use self::worker::FlowWorker;

pub(crate) fn spawn_flow(
    config: FlowConfig,
    ctx: SessionContext,
    backend: Arc<dyn InterviewBackend>,
    speech: Arc<dyn SpeechCapability>,
) -> (InterviewFlowHandle, mpsc::Receiver<FlowUpdate>) {
    let (command_tx, command_rx) = mpsc::channel::<FlowCommand>(config.channel_capacity);
    let (event_tx, event_rx) = mpsc::channel(config.channel_capacity);
    let (updates_tx, updates_rx) = mpsc::channel(config.channel_capacity);

    let state = FlowState::new(&config);
    let worker = FlowWorker::new(
        config, ctx, backend, speech, command_rx, event_rx, event_tx, updates_tx, state,
    );

    let handle = InterviewFlowHandle::new(command_tx, worker.spawn());
    (handle, updates_rx)
}
