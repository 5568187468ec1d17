use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;
use vos_blocks::DEFAULT_NAMESPACE;
use vos_editor::DEFAULT_MAX_LEVELS;

pub const DEFAULT_CONFIG_NAME: &str = "vos.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Seconds between autosaves of the active page (0 disables autosave)
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,

    /// Undo levels kept per session (0, the default, keeps every level)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Namespace for deterministic block ids
    #[serde(default = "default_id_namespace")]
    pub id_namespace: Uuid,

    /// Identifier for the edit session, shows up in logs
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

fn default_autosave_interval_secs() -> u64 {
    30
}

fn default_history_limit() -> usize {
    DEFAULT_MAX_LEVELS
}

fn default_id_namespace() -> Uuid {
    DEFAULT_NAMESPACE
}

fn default_session_id() -> String {
    "editor".to_string()
}

impl EditorConfig {
    /// Load config from a directory
    pub fn load(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EditorConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(EditorConfig::default())
        }
    }

    pub fn autosave_interval(&self) -> Option<Duration> {
        match self.autosave_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_interval_secs: default_autosave_interval_secs(),
            history_limit: default_history_limit(),
            id_namespace: default_id_namespace(),
            session_id: default_session_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "autosaveIntervalSecs": 5,
            "historyLimit": 20
        }"#;

        let config: EditorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.autosave_interval(), Some(Duration::from_secs(5)));
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.id_namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.session_id, "editor");
    }

    #[test]
    fn test_zero_interval_disables_autosave() {
        let config: EditorConfig = serde_json::from_str(r#"{"autosaveIntervalSecs": 0}"#).unwrap();
        assert_eq!(config.autosave_interval(), None);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.autosave_interval(), Some(Duration::from_secs(30)));
        assert_eq!(config.history_limit, 0);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{"sessionId": "desk-2", "historyLimit": 50}"#,
        )
        .unwrap();

        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config.session_id, "desk-2");
        assert_eq!(config.history_limit, 50);
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ nope").unwrap();
        assert!(EditorConfig::load(dir.path()).is_err());
    }
}
