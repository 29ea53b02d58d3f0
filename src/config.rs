//! Configuration management

use crate::{GovorunError, Result};
use ini::Ini;
use log::{debug, info};
use std::collections::HashMap;
use std::path::PathBuf;

/// Application configuration for the pipeline
///
/// Manages persistent settings: synthesis parameters, segment length
/// limit, the engine command template, and the stress exception
/// dictionary location.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.govorun.cfg)
    path: PathBuf,
}

impl Config {
    /// Load configuration from disk or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(path)
    }

    /// Load configuration from an explicit path (used by tests)
    pub fn load_from(path: PathBuf) -> Result<Self> {
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| GovorunError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| GovorunError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| GovorunError::Config(format!("Failed to save config: {}", e)))
    }

    /// Get config file path (~/.govorun.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".govorun.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("synthesis"))
            .set("language", "ru")
            .set("speed", "1.0")
            .set("temperature", "0.7")
            .set("length_penalty", "1.0")
            .set("repetition_penalty", "2.0")
            .set("top_k", "50")
            .set("top_p", "0.85")
            .set("max_segment_length", "150");

        // The engine command is rendered once per segment. Placeholders:
        // {text} {speaker} {language} {out} {speed} {temperature}
        // {length_penalty} {repetition_penalty} {top_k} {top_p}
        // Tuning placeholders expand to nothing on the degraded retry.
        ini.with_section(Some("engine"))
            .set(
                "command",
                "xtts --text {text} --speaker-wav {speaker} --language {language} \
                 --out {out} {speed} {temperature} {length_penalty} \
                 {repetition_penalty} {top_k} {top_p}",
            );

        ini.with_section(Some("audio"))
            .set("tolerate_rate_mismatch", "false");

        // Optional JSON file of whole-word stressed spellings that
        // override marker resolution, e.g. {"творог": "творо́г"}
        ini.with_section(Some("stress")).set("exceptions", "");

        ini
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get a float value from config
    pub fn get_float(&self, section: &str, key: &str, default: f32) -> f32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    // Pipeline-specific configuration getters

    /// Language code passed to the engine (ISO-639-1-like)
    pub fn language(&self) -> String {
        self.get_string("synthesis", "language", "ru")
    }

    /// Speech speed multiplier
    pub fn speed(&self) -> f32 {
        self.get_float("synthesis", "speed", 1.0)
    }

    /// Sampling temperature for the engine
    pub fn temperature(&self) -> f32 {
        self.get_float("synthesis", "temperature", 0.7)
    }

    /// Length penalty for the engine
    pub fn length_penalty(&self) -> f32 {
        self.get_float("synthesis", "length_penalty", 1.0)
    }

    /// Repetition penalty for the engine
    pub fn repetition_penalty(&self) -> f32 {
        self.get_float("synthesis", "repetition_penalty", 2.0)
    }

    /// Top-k sampling cutoff for the engine
    pub fn top_k(&self) -> u32 {
        self.get_int("synthesis", "top_k", 50).max(0) as u32
    }

    /// Top-p sampling cutoff for the engine
    pub fn top_p(&self) -> f32 {
        self.get_float("synthesis", "top_p", 0.85)
    }

    /// Maximum characters per synthesis call
    ///
    /// XTTS v2 truncates somewhere past 180 characters for Russian, so
    /// the default stays comfortably below that.
    pub fn max_segment_length(&self) -> usize {
        self.get_int("synthesis", "max_segment_length", 150).max(1) as usize
    }

    /// Engine command template
    pub fn engine_command(&self) -> String {
        self.get_string("engine", "command", "")
    }

    /// Concatenate rate-mismatched buffers under the first buffer's rate
    /// instead of aborting the run
    pub fn tolerate_rate_mismatch(&self) -> bool {
        self.get_bool("audio", "tolerate_rate_mismatch", false)
    }

    /// Path of the user's stress exception dictionary, if configured
    pub fn stress_exceptions_path(&self) -> Option<PathBuf> {
        let path = self.get_string("stress", "exceptions", "");
        if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }

    /// Load the user's stress exception dictionary
    ///
    /// The file is a flat JSON object mapping lowercase words to their
    /// stressed spellings. Missing file -> empty map.
    pub fn load_stress_exceptions(&self) -> Result<HashMap<String, String>> {
        match self.stress_exceptions_path() {
            Some(path) if path.exists() => {
                let data = std::fs::read_to_string(&path)?;
                let map: HashMap<String, String> = serde_json::from_str(&data)?;
                info!("Loaded {} stress exceptions from {:?}", map.len(), path);
                Ok(map)
            }
            Some(path) => Err(GovorunError::Config(format!(
                "Stress exception file not found: {:?}",
                path
            ))),
            None => Ok(HashMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> (Config, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(dir.path().join("govorun.cfg")).expect("config");
        (config, dir)
    }

    #[test]
    fn test_defaults() {
        let (config, _dir) = temp_config();
        assert_eq!(config.language(), "ru");
        assert_eq!(config.max_segment_length(), 150);
        assert!(!config.tolerate_rate_mismatch());
        assert!((config.temperature() - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.top_k(), 50);
    }

    #[test]
    fn test_set_and_get() {
        let (mut config, _dir) = temp_config();
        config.set("synthesis", "max_segment_length", "120");
        assert_eq!(config.max_segment_length(), 120);
    }

    #[test]
    fn test_save_and_reload() {
        let (mut config, dir) = temp_config();
        config.set("synthesis", "language", "en");
        config.save().expect("save");

        let reloaded = Config::load_from(dir.path().join("govorun.cfg")).expect("reload");
        assert_eq!(reloaded.language(), "en");
    }

    #[test]
    fn test_no_exceptions_configured() {
        let (config, _dir) = temp_config();
        assert!(config.load_stress_exceptions().expect("load").is_empty());
    }

    #[test]
    fn test_exception_file_loading() {
        let (mut config, dir) = temp_config();
        let dict = dir.path().join("exceptions.json");
        std::fs::write(&dict, r#"{"творог": "творо́г"}"#).expect("write dict");
        config.set("stress", "exceptions", dict.to_str().expect("utf-8 path"));

        let map = config.load_stress_exceptions().expect("load");
        assert_eq!(map.get("творог").map(String::as_str), Some("творо́г"));
    }

    #[test]
    fn test_missing_exception_file_is_error() {
        let (mut config, _dir) = temp_config();
        config.set("stress", "exceptions", "/nonexistent/dict.json");
        assert!(config.load_stress_exceptions().is_err());
    }
}
