use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use crate::api::{
    AnalysisResult, ApiError, ConversationTurn, Endpoint, InterviewBackend, JobPosting,
    JobSource, NextQuestionRequest, NextStep, ResumeUploadResult,
};
use crate::flow::config::FlowConfig;
use crate::flow::constants::{CLOSING_MESSAGE, FALLBACK_SUMMARY};
use crate::flow::runtime::spawn_flow;
use crate::flow::state::{FlowState, InterviewStage, SessionContext};
use crate::flow::types::{FlowUpdate, FlowUpdatePayload};
use crate::speech::{ScriptedSpeech, SpeechCapability};

struct ScriptedBackend {
    steps: Mutex<VecDeque<Result<NextStep, ApiError>>>,
    summary: Mutex<Option<Result<String, ApiError>>>,
    question_delay: Duration,
}

impl ScriptedBackend {
    fn new(steps: Vec<Result<NextStep, ApiError>>, summary: Result<String, ApiError>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            summary: Mutex::new(Some(summary)),
            question_delay: Duration::ZERO,
        }
    }

    fn with_question_delay(mut self, delay: Duration) -> Self {
        self.question_delay = delay;
        self
    }
}

fn unavailable(endpoint: Endpoint) -> ApiError {
    ApiError::Api {
        endpoint,
        status: 503,
        message: "not scripted".into(),
    }
}

#[async_trait]
impl InterviewBackend for ScriptedBackend {
    async fn upload_resume(
        &self,
        _file_name: &str,
        _payload: Bytes,
    ) -> Result<ResumeUploadResult, ApiError> {
        Err(unavailable(Endpoint::Upload))
    }

    async fn analyze(&self, _resume_text: &str) -> Result<AnalysisResult, ApiError> {
        Err(unavailable(Endpoint::Analyze))
    }

    async fn next_question(
        &self,
        _request: NextQuestionRequest<'_>,
    ) -> Result<NextStep, ApiError> {
        if !self.question_delay.is_zero() {
            sleep(self.question_delay).await;
        }

        self.steps
            .lock()
            .expect("steps lock poisoned")
            .pop_front()
            .unwrap_or(Ok(NextStep::Completed { message: None }))
    }

    async fn summarize(
        &self,
        _resume_text: &str,
        _score: u32,
        _conversation: &[ConversationTurn],
    ) -> Result<String, ApiError> {
        self.summary
            .lock()
            .expect("summary lock poisoned")
            .take()
            .unwrap_or(Ok("Summary ready.".into()))
    }

    async fn list_jobs(&self, _source: JobSource) -> Result<Vec<JobPosting>, ApiError> {
        Ok(Vec::new())
    }
}

fn question(text: &str) -> Result<NextStep, ApiError> {
    Ok(NextStep::Question(text.into()))
}

fn completed(message: Option<&str>) -> Result<NextStep, ApiError> {
    Ok(NextStep::Completed {
        message: message.map(String::from),
    })
}

fn ctx() -> SessionContext {
    SessionContext {
        session_id: "s1".into(),
        resume_text: "Experienced engineer...".into(),
        score: 82,
    }
}

fn fast_config() -> FlowConfig {
    FlowConfig {
        max_turns: 5,
        question_time_limit: 600,
        tick_interval: Duration::from_millis(5),
        reveal_char_delay: Duration::from_micros(200),
        auto_close_delay: Duration::from_millis(10),
        channel_capacity: 32,
    }
}

fn spawn(
    config: FlowConfig,
    backend: ScriptedBackend,
) -> (
    crate::flow::runtime::InterviewFlowHandle,
    mpsc::Receiver<FlowUpdate>,
    Arc<ScriptedSpeech>,
) {
    let speech = Arc::new(ScriptedSpeech::default());
    let dyn_speech: Arc<dyn SpeechCapability> = speech.clone();
    let (handle, updates) = spawn_flow(config, ctx(), Arc::new(backend), dyn_speech);
    (handle, updates, speech)
}

async fn wait_for_state<F>(updates: &mut mpsc::Receiver<FlowUpdate>, mut predicate: F) -> FlowState
where
    F: FnMut(&FlowState) -> bool,
{
    loop {
        let update = timeout(Duration::from_secs(5), updates.recv())
            .await
            .expect("timed out waiting for flow update")
            .expect("updates channel closed");

        if let FlowUpdatePayload::State(state) = update.payload {
            if predicate(&state) {
                return state;
            }
        }
    }
}

fn question_ready(state: &FlowState, turn: usize, text: &str) -> bool {
    state.turn_count() == turn
        && state.question == text
        && !state.revealing
        && !state.awaiting_backend
        && !state.auto_closing
}

#[tokio::test]
async fn full_interview_reaches_summary_with_an_ordered_transcript() {
    let backend = ScriptedBackend::new(
        (0..5).map(|index| question(&format!("q{index}"))).collect(),
        Ok("Solid performance".into()),
    );
    let (handle, mut updates, speech) = spawn(fast_config(), backend);

    handle.start().await.expect("start command accepted");

    for index in 0..5 {
        let text = format!("q{index}");
        wait_for_state(&mut updates, |state| question_ready(state, index, &text)).await;
        handle
            .edit_answer(format!("a{index}"))
            .await
            .expect("edit command accepted");
        handle.submit().await.expect("submit command accepted");
    }

    let state = wait_for_state(&mut updates, |state| {
        state.stage == InterviewStage::Summary
    })
    .await;

    assert_eq!(state.turn_count(), 5);
    for (index, turn) in state.conversation.iter().enumerate() {
        assert_eq!(turn.question, format!("q{index}"));
        assert_eq!(turn.answer, format!("a{index}"));
    }
    assert_eq!(state.summary, "Solid performance");

    // Speak effects run on their own tasks; give them a beat to land.
    sleep(Duration::from_millis(50)).await;
    assert!(speech.spoken().contains(&"q0".to_string()));
}

#[tokio::test]
async fn backend_completed_flag_ends_the_interview_early() {
    let backend = ScriptedBackend::new(
        vec![question("q0"), completed(Some("Done"))],
        Ok("Great".into()),
    );
    let (handle, mut updates, _speech) = spawn(fast_config(), backend);

    handle.start().await.expect("start command accepted");
    wait_for_state(&mut updates, |state| question_ready(state, 0, "q0")).await;

    handle.edit_answer("a0").await.expect("edit command accepted");
    handle.submit().await.expect("submit command accepted");

    let closing = wait_for_state(&mut updates, |state| state.auto_closing).await;
    assert_eq!(closing.question, "Done");

    let state = wait_for_state(&mut updates, |state| {
        state.stage == InterviewStage::Summary
    })
    .await;

    assert_eq!(state.turn_count(), 1);
    assert_eq!(state.summary, "Great");
}

#[tokio::test]
async fn summary_failure_degrades_to_the_fallback_text() {
    let backend = ScriptedBackend::new(
        vec![completed(None)],
        Err(unavailable(Endpoint::Summary)),
    );
    let (handle, mut updates, _speech) = spawn(fast_config(), backend);

    handle.start().await.expect("start command accepted");

    let closing = wait_for_state(&mut updates, |state| state.auto_closing).await;
    assert_eq!(closing.question, CLOSING_MESSAGE);

    let state = wait_for_state(&mut updates, |state| {
        state.stage == InterviewStage::Summary
    })
    .await;

    assert_eq!(state.summary, FALLBACK_SUMMARY);
    assert_eq!(state.turn_count(), 0);
}

#[tokio::test]
async fn countdown_expiry_forces_a_submission_with_an_empty_answer() {
    let mut config = fast_config();
    config.question_time_limit = 3;

    let backend = ScriptedBackend::new(
        vec![question("q0"), question("q1")],
        Ok("Summary ready.".into()),
    );
    let (handle, mut updates, _speech) = spawn(config, backend);

    handle.start().await.expect("start command accepted");
    wait_for_state(&mut updates, |state| question_ready(state, 0, "q0")).await;

    // No answer; the countdown has to submit on its own.
    let state = wait_for_state(&mut updates, |state| state.turn_count() == 1).await;
    assert_eq!(state.conversation[0].question, "q0");
    assert_eq!(state.conversation[0].answer, "");

    wait_for_state(&mut updates, |state| question_ready(state, 1, "q1")).await;
}

#[tokio::test]
async fn restart_discards_a_stale_in_flight_question() {
    let backend = ScriptedBackend::new(vec![question("stale")], Ok("Summary ready.".into()))
        .with_question_delay(Duration::from_millis(150));
    let (handle, mut updates, _speech) = spawn(fast_config(), backend);

    handle.start().await.expect("start command accepted");
    wait_for_state(&mut updates, |state| {
        state.stage == InterviewStage::Interview
    })
    .await;

    handle.restart().await.expect("restart command accepted");
    let state = wait_for_state(&mut updates, |state| state.generation == 1).await;
    assert_eq!(state.stage, InterviewStage::Intro);

    // Let the stale response land; it must not produce any further update.
    sleep(Duration::from_millis(250)).await;
    while let Ok(update) = updates.try_recv() {
        if let FlowUpdatePayload::State(state) = update.payload {
            assert_eq!(state.stage, InterviewStage::Intro);
            assert!(state.question.is_empty());
        }
    }
}

#[tokio::test]
async fn voice_transcript_appends_to_the_typed_draft() {
    let backend = ScriptedBackend::new(
        vec![question("q0"), completed(None)],
        Ok("Summary ready.".into()),
    );
    let (handle, mut updates, _speech) = spawn(fast_config(), backend);

    handle.start().await.expect("start command accepted");
    wait_for_state(&mut updates, |state| question_ready(state, 0, "q0")).await;

    handle.edit_answer("typed").await.expect("edit command accepted");
    handle
        .append_transcript("spoken")
        .await
        .expect("transcript command accepted");

    let state = wait_for_state(&mut updates, |state| state.answer == "typed spoken").await;
    assert_eq!(state.turn_count(), 0);

    handle.submit().await.expect("submit command accepted");
    let state = wait_for_state(&mut updates, |state| state.turn_count() == 1).await;
    assert_eq!(state.conversation[0].answer, "typed spoken");
}

#[tokio::test]
async fn reveal_streams_growing_prefixes_before_enabling_input() {
    let backend = ScriptedBackend::new(vec![question("hi")], Ok("Summary ready.".into()));
    let (handle, mut updates, _speech) = spawn(fast_config(), backend);

    handle.start().await.expect("start command accepted");

    let mut prefixes = Vec::new();
    loop {
        let update = timeout(Duration::from_secs(5), updates.recv())
            .await
            .expect("timed out waiting for reveal")
            .expect("updates channel closed");

        if let FlowUpdatePayload::Reveal(progress) = update.payload {
            let done = progress.done;
            prefixes.push(progress.revealed);
            if done {
                break;
            }
        }
    }

    assert_eq!(prefixes, vec!["h".to_string(), "hi".to_string()]);

    let state = wait_for_state(&mut updates, |state| !state.revealing).await;
    assert_eq!(state.question, "hi");
    assert_eq!(state.time_left, 600);
}
