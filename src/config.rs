use serde::{Serialize, Deserialize};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

// Default completion endpoint
pub const DEFAULT_API_HOST: &str = "https://gideonlim-flowise.hf.space";
pub const DEFAULT_CHATFLOW_ID: &str = "10b2d13f-5baf-42c5-b4c8-244a67aeff54";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    pub api_host: String,
    pub chatflow_id: String,
    pub theme: String,
    #[serde(default = "default_suggestions")]
    pub quick_suggestions: Vec<String>,
}

fn default_suggestions() -> Vec<String> {
    vec![
        "What can you help me with?".to_string(),
        "Find cheap eats near campus".to_string(),
        "Show me healthy options".to_string(),
        "Late-night delivery ideas".to_string(),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            chatflow_id: DEFAULT_CHATFLOW_ID.to_string(),
            theme: "dark".to_string(),
            quick_suggestions: default_suggestions(),
        }
    }
}

pub fn settings_path() -> Option<PathBuf> {
    if let Some(proj) = ProjectDirs::from("io", "flowchat", "flowchat") {
        let dir = proj.config_dir();
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Failed to create config dir: {}", e);
            return None;
        }
        return Some(dir.join("settings.json"));
    }
    None
}

pub fn load_settings() -> Option<Settings> {
    let path = settings_path()?;
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn save_settings(settings: &Settings) -> std::io::Result<()> {
    if let Some(path) = settings_path() {
        let data = serde_json::to_string_pretty(settings).unwrap_or_default();
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
    }
    Ok(())
}
