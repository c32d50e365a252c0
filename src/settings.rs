//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/blockfall/settings.toml (or platform equivalent)

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Visual settings
    pub visual: VisualSettings,
    /// Gameplay settings
    pub gameplay: GameplaySettings,
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_cw: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_ccw: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hard_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub start: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or array of strings")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut keys = Vec::new();
            while let Some(key) = seq.next_element::<String>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}

/// Serialize keys: single key as string, multiple as array
fn serialize_keys<S>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;

    if keys.len() == 1 {
        serializer.serialize_str(&keys[0])
    } else {
        let mut seq = serializer.serialize_seq(Some(keys.len()))?;
        for key in keys {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

/// Visual settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Ghost piece visibility
    pub show_ghost: bool,
    /// Block style: "solid", "bracket", "round"
    pub block_style: String,
}

/// Gameplay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Fixed randomizer seed; a fresh seed is drawn per run when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// A held key counts as released after this long without a repeat event
    pub key_release_ms: u64,
    /// Release timeout before the first auto-repeat of a held key arrives
    pub key_repeat_delay_ms: u64,
    /// Frames per second of the run loop
    pub fps: u64,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["Left".to_string()],
            move_right: vec!["Right".to_string()],
            rotate_cw: vec!["Up".to_string(), "x".to_string()],
            rotate_ccw: vec!["z".to_string()],
            soft_drop: vec!["Down".to_string()],
            hard_drop: vec!["Space".to_string()],
            start: vec!["Enter".to_string()],
            quit: vec!["q".to_string(), "Esc".to_string()],
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            show_ghost: true,
            block_style: "solid".to_string(),
        }
    }
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            seed: None,
            key_release_ms: 150,
            key_repeat_delay_ms: 700,
            fps: 60,
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Parse settings from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings")
    }

    /// Load settings from file, writing the defaults if no file exists yet
    ///
    /// An unreadable or malformed file is logged and replaced by defaults in
    /// memory; the file itself is left alone.
    pub fn load_or_init() -> Self {
        let Some(path) = Self::settings_path() else {
            tracing::warn!("could not determine config directory, using default settings");
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml(&contents) {
                Ok(settings) => {
                    tracing::info!(path = %path.display(), "loaded settings");
                    settings
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "{:#}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                match settings.save() {
                    Ok(()) => tracing::info!(path = %path.display(), "wrote default settings"),
                    Err(e) => tracing::warn!("{:#}", e),
                }
                settings
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to read settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings to file
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir().context("could not determine config directory")?;
        let path = dir.join("settings.toml");

        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create config dir {}", dir.display()))?;

        let contents = toml::to_string_pretty(self).context("failed to serialize settings")?;

        fs::write(&path, contents)
            .with_context(|| format!("failed to write settings to {}", path.display()))?;

        Ok(())
    }
}

impl VisualSettings {
    /// Get the (block, ghost) characters based on style
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style.as_str() {
            "bracket" => ("[]", ".."),
            "round" => ("()", ".."),
            _ => ("██", "░░"), // "solid" or default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed = Settings::from_toml(&text).unwrap();
        assert_eq!(parsed.keys.rotate_cw, settings.keys.rotate_cw);
        assert_eq!(parsed.keys.hard_drop, settings.keys.hard_drop);
        assert_eq!(parsed.gameplay.fps, 60);
        assert_eq!(parsed.gameplay.seed, None);
    }

    #[test]
    fn test_single_key_serialized_as_string() {
        let text = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(text.contains("hard_drop = \"Space\""));
        assert!(text.contains("rotate_cw = ["));
    }

    #[test]
    fn test_keys_accept_string_or_list() {
        let settings = Settings::from_toml(
            r#"
            [keys]
            move_left = "a"
            move_right = ["d", "Right"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.keys.move_left, vec!["a"]);
        assert_eq!(settings.keys.move_right, vec!["d", "Right"]);
        // Untouched bindings keep their defaults
        assert_eq!(settings.keys.soft_drop, vec!["Down"]);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings = Settings::from_toml(
            r#"
            [gameplay]
            seed = 99
            "#,
        )
        .unwrap();
        assert_eq!(settings.gameplay.seed, Some(99));
        assert_eq!(settings.gameplay.key_release_ms, 150);
        assert_eq!(settings.gameplay.key_repeat_delay_ms, 700);
        assert!(settings.visual.show_ghost);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(Settings::from_toml("[keys]\nmove_left = 3").is_err());
    }

    #[test]
    fn test_block_chars() {
        let mut visual = VisualSettings::default();
        assert_eq!(visual.block_chars(), ("██", "░░"));
        visual.block_style = "bracket".to_string();
        assert_eq!(visual.block_chars(), ("[]", ".."));
        visual.block_style = "unknown".to_string();
        assert_eq!(visual.block_chars(), ("██", "░░"));
    }
}
