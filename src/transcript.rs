use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::sanitize::{escape_html, format_bot_html};

/// Maximum turns kept in the transcript (4 exchanges)
pub const MAX_TRANSCRIPT_TURNS: usize = 8;
/// Number of most recent turns sent to the completion service as context
pub const HISTORY_CONTEXT_TURNS: usize = 6;

/// Who authored a chat turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    /// The message type tag used by the completion service's history format.
    pub fn history_type(self) -> &'static str {
        match self {
            Role::User => "userMessage",
            Role::Bot => "apiMessage",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
        }
    }
}

/// One message exchanged in either direction. Immutable after creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    /// The content as it arrived (bot) or as typed (user)
    pub raw: String,
    /// Trusted HTML for bot turns; entity-escaped text for user turns
    pub rendered: String,
    /// Locale-style 12-hour time, e.g. "02:35 PM"
    pub timestamp: String,
}

impl ChatTurn {
    /// Build a turn for the given role, rendering the content accordingly:
    /// bot content goes through the sanitizer, user content is escaped and
    /// never interpreted as markup.
    pub fn new(role: Role, content: &str) -> Self {
        let rendered = match role {
            Role::Bot => format_bot_html(content),
            Role::User => escape_html(content),
        };
        Self {
            role,
            raw: content.to_string(),
            rendered,
            timestamp: format_time(),
        }
    }
}

/// Format the current local time the way message timestamps are displayed.
pub fn format_time() -> String {
    Local::now().format("%I:%M %p").to_string()
}

/// The bounded, ordered record of recent chat turns. Mutated only by
/// appending; the oldest turns are evicted once the bound is exceeded.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Transcript {
    pub turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a turn, trimming to the most recent bound.
    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
        if self.turns.len() > MAX_TRANSCRIPT_TURNS {
            let excess = self.turns.len() - MAX_TRANSCRIPT_TURNS;
            self.turns.drain(0..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// The last few turns in the completion service's history format:
    /// `[{ "message": ..., "type": "userMessage" | "apiMessage" }, ...]`.
    /// Raw content is sent, never the rendered HTML.
    pub fn history_payload(&self) -> Vec<serde_json::Value> {
        let start = self.turns.len().saturating_sub(HISTORY_CONTEXT_TURNS);
        self.turns[start..]
            .iter()
            .map(|turn| {
                serde_json::json!({
                    "message": turn.raw,
                    "type": turn.role.history_type(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_most_recent_in_order() {
        let mut transcript = Transcript::new();
        for i in 0..10 {
            transcript.push(ChatTurn::new(Role::User, &format!("msg{}", i)));
        }
        assert_eq!(transcript.len(), MAX_TRANSCRIPT_TURNS);
        // Exactly the 8 most recent turns, original relative order.
        let raws: Vec<&str> = transcript.turns.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(
            raws,
            vec!["msg2", "msg3", "msg4", "msg5", "msg6", "msg7", "msg8", "msg9"]
        );
    }

    #[test]
    fn test_user_turn_is_escaped_not_rendered() {
        let turn = ChatTurn::new(Role::User, "<script>alert(1)</script>");
        assert_eq!(turn.rendered, "&lt;script&gt;alert(1)&lt;/script&gt;");
        assert_eq!(turn.raw, "<script>alert(1)</script>");
    }

    #[test]
    fn test_bot_turn_is_sanitized() {
        let turn = ChatTurn::new(Role::Bot, "**hi** there");
        assert!(turn.rendered.contains("<strong>hi</strong>"));
    }

    #[test]
    fn test_history_payload_last_six() {
        let mut transcript = Transcript::new();
        for i in 0..8 {
            let role = if i % 2 == 0 { Role::User } else { Role::Bot };
            transcript.push(ChatTurn::new(role, &format!("m{}", i)));
        }
        let history = transcript.history_payload();
        assert_eq!(history.len(), HISTORY_CONTEXT_TURNS);
        assert_eq!(history[0]["message"], "m2");
        assert_eq!(history[0]["type"], "userMessage");
        assert_eq!(history[1]["type"], "apiMessage");
        assert_eq!(history[5]["message"], "m7");
    }

    #[test]
    fn test_roundtrip_serialization() {
        let mut transcript = Transcript::new();
        transcript.push(ChatTurn::new(Role::User, "hello"));
        transcript.push(ChatTurn::new(Role::Bot, "**hi**"));
        let json = serde_json::to_string(&transcript).unwrap();
        let back: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.turns[0].role, Role::User);
        assert_eq!(back.turns[1].rendered, transcript.turns[1].rendered);
    }
}
