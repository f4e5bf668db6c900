//! Outbound question validation

/// Longest question accepted by the send flow. The endpoint itself accepts
/// more, but unbounded input makes for a bad transcript and a slow request.
const MAX_QUESTION_LEN: usize = 2000;

/// Validates a question before it is sent to the completion service
pub fn validate_question(text: &str) -> Result<(), String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Message cannot be empty".to_string());
    }
    if trimmed.len() > MAX_QUESTION_LEN {
        return Err(format!(
            "Message too long (max {} characters)",
            MAX_QUESTION_LEN
        ));
    }
    Ok(())
}

/// Sanitizes a question by trimming and dropping control characters
/// (newlines survive; the transcript renders them as line breaks)
pub fn sanitize_question(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .take(MAX_QUESTION_LEN)
        .collect()
}
