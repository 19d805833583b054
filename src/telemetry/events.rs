use serde::Serialize;
use tracing::{info, warn};

pub(crate) const TARGET: &str = "telemetry::interview_session";
pub(crate) const EVENT_STAGE: &str = "stage_transition";
pub(crate) const EVENT_TURN: &str = "turn_committed";
pub(crate) const EVENT_BACKEND_FAILURE: &str = "backend_failure";

#[derive(Debug, Serialize)]
pub struct StageTransitionEvent<'a> {
    pub session_id: &'a str,
    pub from: &'static str,
    pub to: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TurnCommittedEvent<'a> {
    pub session_id: &'a str,
    pub turn_index: usize,
    pub forced: bool,
    pub answer_chars: usize,
}

#[derive(Debug, Serialize)]
pub struct BackendFailureEvent<'a> {
    pub endpoint: &'static str,
    pub status: u16,
    pub message: &'a str,
}

pub fn record_stage_transition(session_id: &str, from: &'static str, to: &'static str) {
    let event = StageTransitionEvent {
        session_id,
        from,
        to,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_STAGE,
            session_id = event.session_id,
            from = event.from,
            to = event.to,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_STAGE,
            %err,
            "failed to encode stage transition event"
        ),
    }
}

pub fn record_turn_committed(
    session_id: &str,
    turn_index: usize,
    forced: bool,
    answer_chars: usize,
) {
    let event = TurnCommittedEvent {
        session_id,
        turn_index,
        forced,
        answer_chars,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_TURN,
            session_id = event.session_id,
            turn_index = event.turn_index,
            forced = event.forced,
            answer_chars = event.answer_chars,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_TURN,
            %err,
            "failed to encode turn committed event"
        ),
    }
}

pub fn record_backend_failure(endpoint: &'static str, status: u16, message: &str) {
    let event = BackendFailureEvent {
        endpoint,
        status,
        message,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => warn!(
            target: TARGET,
            event = EVENT_BACKEND_FAILURE,
            endpoint = event.endpoint,
            status = event.status,
            message = event.message,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_BACKEND_FAILURE,
            %err,
            "failed to encode backend failure event"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_transition_event_serializes_all_fields() {
        let event = StageTransitionEvent {
            session_id: "s1",
            from: "intro",
            to: "interview",
        };

        let payload = serde_json::to_string(&event).expect("event serializes");
        assert!(payload.contains("\"session_id\":\"s1\""));
        assert!(payload.contains("\"from\":\"intro\""));
        assert!(payload.contains("\"to\":\"interview\""));
    }

    #[test]
    fn turn_committed_event_serializes_the_forced_flag() {
        let event = TurnCommittedEvent {
            session_id: "s1",
            turn_index: 3,
            forced: true,
            answer_chars: 0,
        };

        let payload = serde_json::to_string(&event).expect("event serializes");
        assert!(payload.contains("\"forced\":true"));
        assert!(payload.contains("\"answer_chars\":0"));
    }
}
