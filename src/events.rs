//! Backend event processing (replies, failures, connection status).

use crossbeam_channel::Receiver;

use crate::backend::FALLBACK_APOLOGY;
use crate::protocol::GuiEvent;
use crate::state::ChatState;
use crate::transcript::Role;

/// Process all pending events from the backend.
///
/// The typing indicator (`awaiting_reply`) is cleared on every outcome of a
/// send, success or failure; no event path may leave it stuck.
pub fn process_events(event_rx: &Receiver<GuiEvent>, state: &mut ChatState) {
    // Drain all pending events from the backend
    while let Ok(event) = event_rx.try_recv() {
        match event {
            GuiEvent::ReplyReceived(text) => {
                state.awaiting_reply = false;
                state.append_turn(&text, Role::Bot);
            }

            GuiEvent::RequestFailed(detail) => {
                state.awaiting_reply = false;
                state.log_system(&format!("Request failed: {}", detail));
                state.append_turn(FALLBACK_APOLOGY, Role::Bot);
                state.is_connected = false;
                state.bot_status = "Connection issue - Using offline mode".to_string();
            }

            GuiEvent::ConnectionStatus { connected, detail } => {
                state.is_connected = connected;
                state.bot_status = detail.clone();
                if connected {
                    state.log_system(&format!("Connected: {}", detail));
                } else {
                    state.log_system(&format!("Connection failed: {}", detail));
                }
            }

            GuiEvent::RawLog(line) => {
                state.log_system(&line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionContext;
    use crate::transcript::Transcript;
    use crossbeam_channel::unbounded;

    fn test_state() -> ChatState {
        ChatState {
            is_connected: true,
            bot_status: "Online".into(),
            awaiting_reply: true,
            session: SessionContext {
                chat_id: "test".into(),
                transcript: Transcript::new(),
            },
            show_suggestions: false,
            welcome_time: "12:00 PM".into(),
            system_log: Vec::new(),
            logger: None,
        }
    }

    #[test]
    fn test_reply_appends_bot_turn_and_clears_typing() {
        let (tx, rx) = unbounded();
        let mut state = test_state();
        tx.send(GuiEvent::ReplyReceived("**hi**".into())).unwrap();

        process_events(&rx, &mut state);

        assert!(!state.awaiting_reply);
        assert_eq!(state.session.transcript.len(), 1);
        let turn = &state.session.transcript.turns[0];
        assert_eq!(turn.role, Role::Bot);
        assert!(turn.rendered.contains("<strong>hi</strong>"));
    }

    #[test]
    fn test_failure_substitutes_apology_and_clears_typing() {
        let (tx, rx) = unbounded();
        let mut state = test_state();
        tx.send(GuiEvent::RequestFailed("connection refused".into()))
            .unwrap();

        process_events(&rx, &mut state);

        assert!(!state.awaiting_reply);
        assert_eq!(state.session.transcript.turns[0].raw, FALLBACK_APOLOGY);
        assert!(!state.is_connected);
        assert!(state
            .system_log
            .iter()
            .any(|l| l.contains("connection refused")));
    }

    #[test]
    fn test_connection_status_updates_state() {
        let (tx, rx) = unbounded();
        let mut state = test_state();
        state.is_connected = false;
        tx.send(GuiEvent::ConnectionStatus {
            connected: true,
            detail: "Online - Connected to AI assistant".into(),
        })
        .unwrap();

        process_events(&rx, &mut state);

        assert!(state.is_connected);
        assert_eq!(state.bot_status, "Online - Connected to AI assistant");
    }
}
