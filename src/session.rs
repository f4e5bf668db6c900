//! Session context: the chat id and the transcript it owns.
//!
//! The chat id and conversation history are process-wide state with a defined
//! lifecycle: created on first load if absent, persisted after every appended
//! turn, regenerated on an explicit reset. Persistence failures are logged
//! and otherwise ignored so the conversation stays usable for the session.

use uuid::Uuid;

use crate::store;
use crate::transcript::{ChatTurn, Role, Transcript};

pub struct SessionContext {
    pub chat_id: String,
    pub transcript: Transcript,
}

impl SessionContext {
    /// Load-or-create: restore the persisted chat id and transcript snapshot,
    /// generating and persisting a fresh chat id when none exists.
    pub fn init() -> Self {
        let chat_id = match store::load_chat_id() {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                if let Err(e) = store::save_chat_id(&id) {
                    eprintln!("Failed to persist chat id: {}", e);
                }
                id
            }
        };
        let transcript = store::load_transcript().unwrap_or_default();
        Self {
            chat_id,
            transcript,
        }
    }

    /// Append a turn for the given role, rendering it per the role's policy,
    /// trim to the transcript bound, and persist the snapshot.
    pub fn append(&mut self, content: &str, role: Role) -> ChatTurn {
        let turn = ChatTurn::new(role, content);
        self.transcript.push(turn.clone());
        if let Err(e) = store::save_transcript(&self.transcript) {
            eprintln!("Failed to persist transcript: {}", e);
        }
        turn
    }

    /// Clear-and-regenerate: drop the conversation, delete the snapshot, and
    /// start a fresh session under a new chat id.
    pub fn reset(&mut self) {
        self.transcript.clear();
        store::clear_transcript();
        self.chat_id = Uuid::new_v4().to_string();
        if let Err(e) = store::save_chat_id(&self.chat_id) {
            eprintln!("Failed to persist chat id: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_renders_per_role() {
        let mut session = SessionContext {
            chat_id: "test".into(),
            transcript: Transcript::new(),
        };
        let user = session.append("<b>hi</b>", Role::User);
        assert_eq!(user.rendered, "&lt;b&gt;hi&lt;/b&gt;");
        let bot = session.append("**hi**", Role::Bot);
        assert!(bot.rendered.contains("<strong>hi</strong>"));
        assert_eq!(session.transcript.len(), 2);
    }

    #[test]
    fn test_reset_regenerates_chat_id() {
        let mut session = SessionContext {
            chat_id: "before".into(),
            transcript: Transcript::new(),
        };
        session.append("hello", Role::User);
        session.reset();
        assert!(session.transcript.is_empty());
        assert_ne!(session.chat_id, "before");
        // UUIDv4 shape: 36 chars with hyphens
        assert_eq!(session.chat_id.len(), 36);
    }
}
