//! Core application state, separated from UI logic.
//!
//! `ChatState` holds all data that represents the chat session: the session
//! context (chat id + transcript), connection status, the pending-request
//! flag behind the typing indicator, and the system log. This separation
//! allows UI components to receive state as a parameter rather than owning it.

use chrono::Local;

use crate::logging::{LogEntry, Logger};
use crate::session::SessionContext;
use crate::transcript::{format_time, ChatTurn, Role};

/// System log lines kept before the oldest are dropped
const MAX_SYSTEM_LOG_LINES: usize = 500;

pub struct ChatState {
    /// Whether the completion endpoint is reachable
    pub is_connected: bool,

    /// Human-readable status line shown under the title
    pub bot_status: String,

    /// True while a completion request is in flight; drives the typing
    /// indicator and disables the send control
    pub awaiting_reply: bool,

    /// The chat session: chat id and bounded transcript
    pub session: SessionContext,

    /// Whether the quick-suggestion buttons are shown
    pub show_suggestions: bool,

    /// Timestamp shown on the canned welcome message
    pub welcome_time: String,

    /// Diagnostic log lines (connection probes, errors)
    pub system_log: Vec<String>,

    /// Conversation logger for persisting turns to disk
    pub logger: Option<Logger>,
}

impl ChatState {
    pub fn new() -> Self {
        let session = SessionContext::init();
        let show_suggestions = session.transcript.is_empty();
        Self {
            is_connected: false,
            bot_status: "Connecting...".to_string(),
            awaiting_reply: false,
            session,
            show_suggestions,
            welcome_time: format_time(),
            system_log: vec!["Welcome to FlowChat!".to_string()],
            logger: Logger::new().ok(),
        }
    }

    /// Append a turn through the session (render, trim, persist) and mirror
    /// it to the conversation log.
    pub fn append_turn(&mut self, content: &str, role: Role) -> ChatTurn {
        let turn = self.session.append(content, role);
        if let Some(logger) = &self.logger {
            logger.log(LogEntry {
                timestamp: turn.timestamp.clone(),
                role: role.label().to_string(),
                message: turn.raw.clone(),
            });
        }
        turn
    }

    /// Push a timestamped line onto the system log, keeping it bounded.
    pub fn log_system(&mut self, line: &str) {
        let ts = Local::now().format("%H:%M:%S").to_string();
        self.system_log.push(format!("[{}] {}", ts, line));
        if self.system_log.len() > MAX_SYSTEM_LOG_LINES {
            self.system_log.remove(0);
        }
    }

    /// Reset the conversation: new chat id, empty transcript, suggestions
    /// and welcome state restored.
    pub fn reset_conversation(&mut self) {
        self.session.reset();
        self.show_suggestions = true;
        self.welcome_time = format_time();
        self.log_system("Chat conversation reset");
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}
