//! Persistent key-value snapshots: the serialized transcript and the session
//! chat id, stored as plain files under the platform config directory. Read
//! at startup and on reset, written after every appended turn.

use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::transcript::Transcript;

const TRANSCRIPT_FILE: &str = "chat_history.json";
const CHAT_ID_FILE: &str = "chat_id";

fn store_dir() -> Option<PathBuf> {
    if let Some(proj) = ProjectDirs::from("io", "flowchat", "flowchat") {
        let dir = proj.config_dir();
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Failed to create store dir: {}", e);
            return None;
        }
        return Some(dir.to_path_buf());
    }
    None
}

pub fn transcript_path() -> Option<PathBuf> {
    Some(store_dir()?.join(TRANSCRIPT_FILE))
}

pub fn chat_id_path() -> Option<PathBuf> {
    Some(store_dir()?.join(CHAT_ID_FILE))
}

pub fn load_transcript() -> Option<Transcript> {
    let path = transcript_path()?;
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn save_transcript(transcript: &Transcript) -> std::io::Result<()> {
    if let Some(path) = transcript_path() {
        let data = serde_json::to_string_pretty(transcript).unwrap_or_default();
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
    }
    Ok(())
}

pub fn load_chat_id() -> Option<String> {
    let path = chat_id_path()?;
    let id = fs::read_to_string(path).ok()?;
    let id = id.trim().to_string();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

pub fn save_chat_id(chat_id: &str) -> std::io::Result<()> {
    if let Some(path) = chat_id_path() {
        fs::write(path, chat_id)?;
    }
    Ok(())
}

/// Delete the persisted transcript snapshot (used on reset).
pub fn clear_transcript() {
    if let Some(path) = transcript_path() {
        let _ = fs::remove_file(path);
    }
}
