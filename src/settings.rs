//! Compaction settings, resolved from layered JSON sources.
//!
//! Layers are applied left to right (global file, project file, live session
//! event). A layer only overrides the fields it actually carries; anything
//! missing, mistyped, or unreadable leaves the previous value in place.

use std::env;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::Result;

const AGENT_DIR_ENV: &str = "PI_CODING_AGENT_DIR";
const SETTINGS_FILE: &str = "settings.json";

/// Resolved compaction configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionSettings {
    pub enabled: bool,
    pub reserve_tokens: u64,
    pub keep_recent_tokens: u64,
}

impl Default for CompactionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            reserve_tokens: 16_384,
            keep_recent_tokens: 20_000,
        }
    }
}

/// Fields one layer explicitly sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionOverride {
    pub enabled: Option<bool>,
    pub reserve_tokens: Option<u64>,
    pub keep_recent_tokens: Option<u64>,
}

impl CompactionOverride {
    /// Extract the `compaction` object from a settings document.
    ///
    /// Each field is validated on its own: negative or fractional token counts
    /// and non-boolean flags are dropped without discarding their siblings.
    pub fn from_settings(doc: &Value) -> Option<Self> {
        let compaction = doc.get("compaction")?.as_object()?;
        Some(Self {
            enabled: compaction.get("enabled").and_then(Value::as_bool),
            reserve_tokens: compaction.get("reserveTokens").and_then(Value::as_u64),
            keep_recent_tokens: compaction.get("keepRecentTokens").and_then(Value::as_u64),
        })
    }

    /// Stack `self` on an earlier override of the same layer; set fields win.
    pub fn layered_on(self, earlier: Option<Self>) -> Self {
        let Some(earlier) = earlier else {
            return self;
        };
        Self {
            enabled: self.enabled.or(earlier.enabled),
            reserve_tokens: self.reserve_tokens.or(earlier.reserve_tokens),
            keep_recent_tokens: self.keep_recent_tokens.or(earlier.keep_recent_tokens),
        }
    }
}

/// Apply one override on top of `fallback`.
pub fn merge(fallback: CompactionSettings, layer: Option<&CompactionOverride>) -> CompactionSettings {
    let Some(layer) = layer else {
        return fallback;
    };
    CompactionSettings {
        enabled: layer.enabled.unwrap_or(fallback.enabled),
        reserve_tokens: layer.reserve_tokens.unwrap_or(fallback.reserve_tokens),
        keep_recent_tokens: layer.keep_recent_tokens.unwrap_or(fallback.keep_recent_tokens),
    }
}

/// Fold layers over the defaults, least specific first.
pub fn resolve(layers: &[Option<CompactionOverride>]) -> CompactionSettings {
    layers
        .iter()
        .fold(CompactionSettings::default(), |acc, layer| merge(acc, layer.as_ref()))
}

fn parse_layer(content: &str) -> Result<Option<CompactionOverride>> {
    let doc: Value = serde_json::from_str(content)?;
    Ok(CompactionOverride::from_settings(&doc))
}

/// Read one settings file. Missing, unreadable, or malformed files yield `None`.
pub async fn read_layer(path: &Path) -> Option<CompactionOverride> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) => {
            debug!(path = %path.display(), %err, "settings file not readable");
            return None;
        }
    };
    match parse_layer(&content) {
        Ok(layer) => layer,
        Err(err) => {
            debug!(path = %path.display(), %err, "ignoring malformed settings file");
            None
        }
    }
}

/// Expand a leading `~` against `home`.
pub fn expand_home(path: &str, home: &str) -> PathBuf {
    if home.is_empty() {
        return PathBuf::from(path);
    }
    if path == "~" {
        return PathBuf::from(home);
    }
    match path.strip_prefix("~/") {
        Some(rest) => Path::new(home).join(rest),
        None => PathBuf::from(path),
    }
}

/// Home directory from `HOME`, then `USERPROFILE`.
pub fn home_dir() -> String {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .unwrap_or_default()
}

/// Locations of the global and project settings files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPaths {
    pub global: Option<PathBuf>,
    pub project: PathBuf,
}

impl SettingsPaths {
    pub fn resolve(cwd: &Path, agent_dir: Option<&str>, home: &str) -> Self {
        let global_dir = match agent_dir.filter(|dir| !dir.trim().is_empty()) {
            Some(dir) => Some(expand_home(dir.trim(), home)),
            None if !home.is_empty() => Some(Path::new(home).join(".pi").join("agent")),
            None => None,
        };
        Self {
            global: global_dir.map(|dir| dir.join(SETTINGS_FILE)),
            project: cwd.join(".pi").join(SETTINGS_FILE),
        }
    }

    pub fn from_env(cwd: &Path) -> Self {
        let agent_dir = env::var(AGENT_DIR_ENV).ok();
        Self::resolve(cwd, agent_dir.as_deref(), &home_dir())
    }

    /// Read both files and resolve them with an optional live-session layer on top.
    pub async fn load(&self, session: Option<&CompactionOverride>) -> CompactionSettings {
        let global = match &self.global {
            Some(path) => read_layer(path).await,
            None => None,
        };
        let project = read_layer(&self.project).await;
        resolve(&[global, project, session.copied()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_project_overrides_only_its_fields() {
        let global = CompactionOverride::from_settings(&json!({"compaction": {"reserveTokens": 1000}}));
        let project = CompactionOverride::from_settings(&json!({"compaction": {"enabled": false}}));
        let resolved = resolve(&[global, project]);
        assert_eq!(
            resolved,
            CompactionSettings {
                enabled: false,
                reserve_tokens: 1000,
                keep_recent_tokens: CompactionSettings::default().keep_recent_tokens,
            }
        );
    }

    #[test]
    fn test_invalid_fields_keep_prior_values() {
        let layer = CompactionOverride::from_settings(&json!({
            "compaction": {"enabled": "yes", "reserveTokens": -5, "keepRecentTokens": 12.5}
        }));
        let base = CompactionSettings {
            enabled: false,
            reserve_tokens: 42,
            keep_recent_tokens: 7,
        };
        assert_eq!(merge(base, layer.as_ref()), base);
    }

    #[test]
    fn test_missing_compaction_is_no_override() {
        assert_eq!(CompactionOverride::from_settings(&json!({"theme": "dark"})), None);
        assert_eq!(CompactionOverride::from_settings(&json!({"compaction": 3})), None);
        assert_eq!(resolve(&[None, None]), CompactionSettings::default());
    }

    #[test]
    fn test_session_events_stack() {
        let first = CompactionOverride {
            reserve_tokens: Some(10),
            enabled: Some(false),
            ..CompactionOverride::default()
        };
        let second = CompactionOverride {
            enabled: Some(true),
            ..CompactionOverride::default()
        };
        let stacked = second.layered_on(Some(first));
        assert_eq!(stacked.enabled, Some(true));
        assert_eq!(stacked.reserve_tokens, Some(10));
        assert_eq!(stacked.keep_recent_tokens, None);
    }

    #[test]
    fn test_paths_honor_agent_dir_override() {
        let paths = SettingsPaths::resolve(Path::new("/work"), Some("~/agent"), "/home/u");
        assert_eq!(paths.global, Some(PathBuf::from("/home/u/agent/settings.json")));
        assert_eq!(paths.project, PathBuf::from("/work/.pi/settings.json"));

        let paths = SettingsPaths::resolve(Path::new("/work"), None, "/home/u");
        assert_eq!(paths.global, Some(PathBuf::from("/home/u/.pi/agent/settings.json")));

        let paths = SettingsPaths::resolve(Path::new("/work"), Some("  "), "");
        assert_eq!(paths.global, None);
    }

    #[tokio::test]
    async fn test_load_layers_from_disk() {
        let dir = TempDir::new().unwrap();
        let global_dir = dir.path().join("agent");
        let project_dir = dir.path().join("proj");
        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::create_dir_all(project_dir.join(".pi")).unwrap();
        std::fs::write(
            global_dir.join("settings.json"),
            r#"{"compaction": {"reserveTokens": 1000, "keepRecentTokens": 5}}"#,
        )
        .unwrap();
        std::fs::write(project_dir.join(".pi/settings.json"), "{not json").unwrap();

        let paths = SettingsPaths::resolve(&project_dir, global_dir.to_str(), "");
        let session = CompactionOverride {
            keep_recent_tokens: Some(9),
            ..CompactionOverride::default()
        };
        let resolved = paths.load(Some(&session)).await;
        assert_eq!(
            resolved,
            CompactionSettings {
                enabled: true,
                reserve_tokens: 1000,
                keep_recent_tokens: 9,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_files_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let paths = SettingsPaths::resolve(dir.path(), dir.path().join("nope").to_str(), "");
        assert_eq!(paths.load(None).await, CompactionSettings::default());
    }
}
