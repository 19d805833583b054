use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::warn;

use crate::api::{InterviewBackend, NextQuestionRequest};
use crate::flow::config::FlowConfig;
use crate::flow::state::{reduce, Effect, FlowEvent, FlowState, SessionContext};
use crate::flow::types::{FlowCommand, FlowUpdate, FlowUpdatePayload, RevealProgress};
use crate::speech::SpeechCapability;
use crate::telemetry::events::{record_stage_transition, record_turn_committed};

pub(crate) struct FlowWorker {
    config: FlowConfig,
    ctx: SessionContext,
    backend: Arc<dyn InterviewBackend>,
    speech: Arc<dyn SpeechCapability>,
    command_rx: mpsc::Receiver<FlowCommand>,
    event_rx: mpsc::Receiver<FlowEvent>,
    event_tx: mpsc::Sender<FlowEvent>,
    updates_tx: mpsc::Sender<FlowUpdate>,
    state: FlowState,
    reveal_task: Option<JoinHandle<()>>,
    auto_close_task: Option<JoinHandle<()>>,
}

impl FlowWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: FlowConfig,
        ctx: SessionContext,
        backend: Arc<dyn InterviewBackend>,
        speech: Arc<dyn SpeechCapability>,
        command_rx: mpsc::Receiver<FlowCommand>,
        event_rx: mpsc::Receiver<FlowEvent>,
        event_tx: mpsc::Sender<FlowEvent>,
        updates_tx: mpsc::Sender<FlowUpdate>,
        state: FlowState,
    ) -> Self {
        Self {
            config,
            ctx,
            backend,
            speech,
            command_rx,
            event_rx,
            event_tx,
            updates_tx,
            state,
            reveal_task: None,
            auto_close_task: None,
        }
    }

    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(mut self) {
        let mut ticker = interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // 吃掉 interval 的立即首 tick，倒计时从完整额度开始。
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;

                maybe_command = self.command_rx.recv() => {
                    match maybe_command {
                        Some(command) => {
                            let event = match command {
                                FlowCommand::Start => FlowEvent::StartRequested,
                                FlowCommand::EditAnswer(text) => FlowEvent::AnswerEdited(text),
                                FlowCommand::AppendTranscript(chunk) => {
                                    FlowEvent::TranscriptAppended(chunk)
                                }
                                FlowCommand::Submit => FlowEvent::SubmitRequested,
                                FlowCommand::Restart => FlowEvent::RestartRequested,
                            };
                            if !self.apply(event).await {
                                break;
                            }
                        }
                        None => break,
                    }
                }

                maybe_event = self.event_rx.recv() => {
                    match maybe_event {
                        Some(event) => {
                            if !self.apply(event).await {
                                break;
                            }
                        }
                        None => break,
                    }
                }

                _ = ticker.tick() => {
                    if !self.apply(FlowEvent::CountdownTick).await {
                        break;
                    }
                }
            }
        }

        self.cancel_reveal();
        self.cancel_auto_close();
    }

    /// 跑一次 reducer，再把效果落到任务与更新通道上。返回 false 表示对端已关闭。
    async fn apply(&mut self, event: FlowEvent) -> bool {
        let forced = matches!(event, FlowEvent::CountdownTick);
        let (next, effects) = reduce(&self.state, event, &self.config, &self.ctx);
        let prev = std::mem::replace(&mut self.state, next);

        if prev.generation != self.state.generation {
            // 重开：在途的展示与延时任务全部作废。
            self.cancel_reveal();
            self.cancel_auto_close();
        }

        if prev.stage != self.state.stage {
            record_stage_transition(
                &self.ctx.session_id,
                prev.stage.as_str(),
                self.state.stage.as_str(),
            );
        }

        if self.state.conversation.len() > prev.conversation.len() {
            let answer_chars = self
                .state
                .conversation
                .last()
                .map(|turn| turn.answer.chars().count())
                .unwrap_or(0);
            record_turn_committed(
                &self.ctx.session_id,
                self.state.conversation.len(),
                forced,
                answer_chars,
            );
        }

        if prev != self.state {
            if !self
                .emit(FlowUpdatePayload::State(self.state.clone()))
                .await
            {
                return false;
            }
        }

        for effect in effects {
            if !self.handle_effect(effect).await {
                return false;
            }
        }

        true
    }

    async fn emit(&self, payload: FlowUpdatePayload) -> bool {
        self.updates_tx
            .send(FlowUpdate {
                generation: self.state.generation,
                payload,
            })
            .await
            .is_ok()
    }

    async fn handle_effect(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::FetchQuestion {
                generation,
                last_answer,
            } => {
                self.cancel_reveal();

                let backend = Arc::clone(&self.backend);
                let ctx = self.ctx.clone();
                let events = self.event_tx.clone();

                tokio::spawn(async move {
                    let result = backend
                        .next_question(NextQuestionRequest {
                            session_id: &ctx.session_id,
                            resume_text: &ctx.resume_text,
                            score: ctx.score,
                            last_answer: last_answer.as_deref(),
                        })
                        .await;

                    let event = match result {
                        Ok(step) => FlowEvent::QuestionArrived { generation, step },
                        Err(err) => {
                            warn!(
                                target: "interview_flow",
                                %err,
                                "next question request failed"
                            );
                            FlowEvent::QuestionFailed {
                                generation,
                                message: err.user_message(),
                            }
                        }
                    };

                    if events.send(event).await.is_err() {
                        warn!(
                            target: "interview_flow",
                            "flow worker gone before question result was delivered"
                        );
                    }
                });
            }

            Effect::FetchSummary {
                generation,
                conversation,
            } => {
                self.cancel_reveal();

                let backend = Arc::clone(&self.backend);
                let ctx = self.ctx.clone();
                let events = self.event_tx.clone();

                tokio::spawn(async move {
                    let result = backend
                        .summarize(&ctx.resume_text, ctx.score, &conversation)
                        .await;

                    let event = match result {
                        Ok(summary) => FlowEvent::SummaryArrived {
                            generation,
                            summary,
                        },
                        Err(err) => {
                            warn!(
                                target: "interview_flow",
                                %err,
                                "summary request failed, falling back to canned text"
                            );
                            FlowEvent::SummaryFailed { generation }
                        }
                    };

                    let _ = events.send(event).await;
                });
            }

            Effect::RevealQuestion { generation, text } => {
                self.cancel_reveal();

                let updates = self.updates_tx.clone();
                let events = self.event_tx.clone();
                let delay = self.config.reveal_char_delay;

                self.reveal_task = Some(tokio::spawn(async move {
                    let total = text.len();
                    let mut revealed = String::with_capacity(total);

                    for ch in text.chars() {
                        sleep(delay).await;
                        revealed.push(ch);

                        let progress = RevealProgress {
                            revealed: revealed.clone(),
                            done: revealed.len() == total,
                        };
                        let update = FlowUpdate {
                            generation,
                            payload: FlowUpdatePayload::Reveal(progress),
                        };
                        if updates.send(update).await.is_err() {
                            return;
                        }
                    }

                    let _ = events.send(FlowEvent::RevealFinished { generation }).await;
                }));
            }

            Effect::Speak { text } => {
                let speech = Arc::clone(&self.speech);
                tokio::spawn(async move {
                    if let Err(err) = speech.speak(&text).await {
                        warn!(target: "interview_flow", %err, "text to speech failed");
                    }
                });
            }

            Effect::ScheduleAutoClose { generation } => {
                self.cancel_auto_close();

                let events = self.event_tx.clone();
                let delay = self.config.auto_close_delay;

                self.auto_close_task = Some(tokio::spawn(async move {
                    sleep(delay).await;
                    let _ = events.send(FlowEvent::AutoCloseElapsed { generation }).await;
                }));
            }

            Effect::Notify(notice) => {
                return self.emit(FlowUpdatePayload::Notice(notice)).await;
            }
        }

        true
    }

    fn cancel_reveal(&mut self) {
        if let Some(task) = self.reveal_task.take() {
            task.abort();
        }
    }

    fn cancel_auto_close(&mut self) {
        if let Some(task) = self.auto_close_task.take() {
            task.abort();
        }
    }
}
