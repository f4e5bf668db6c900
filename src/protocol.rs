/// Actions sent from the UI to the Backend
#[derive(Debug, Clone)]
pub enum BackendAction {
    /// Point the backend at a completion endpoint
    UpdateEndpoint {
        api_host: String,
        chatflow_id: String,
    },
    /// Probe the endpoint and report reachability
    CheckConnection,
    /// Ask the completion service one question for the given session
    AskQuestion {
        question: String,
        chat_id: String,
        /// Recent turns in the service's history format (may be empty)
        history: Vec<serde_json::Value>,
    },
}

/// Events sent from the Backend to the UI
#[derive(Debug, Clone)]
pub enum GuiEvent {
    /// The completion service produced a reply
    ReplyReceived(String),
    /// The request failed in transport or returned a non-success status
    RequestFailed(String),
    /// Result of a connection probe
    ConnectionStatus { connected: bool, detail: String },
    /// Raw line for the system log
    RawLog(String),
}
