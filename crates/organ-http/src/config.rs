//! Configuration loading and layering.
//!
//! Resolves the recordings directory and organ display name from built-in
//! defaults, the global and per-user JSON files, and command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Display name used when no config file names the organ.
pub const DEFAULT_ORGAN_NAME: &str = "Custom Digital Organ";

/// System-wide config file.
pub const GLOBAL_CONFIG_PATH: &str = "/etc/organ-http/config.json";

/// Resolved, immutable configuration shared with the request handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganConfig {
    /// Directory that is listed, served and mutated.
    pub recordings_dir: PathBuf,
    /// Title shown on the dashboard.
    pub organ_name: String,
}

/// One JSON config file. Absent keys leave earlier layers untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(rename = "recordings-directory")]
    pub recordings_directory: Option<PathBuf>,
    #[serde(rename = "organ-name")]
    pub organ_name: Option<String>,
}

impl ConfigFile {
    /// Load and parse a config file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = serde_json::from_str::<ConfigFile>(&raw)
            .with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }
}

impl OrganConfig {
    /// Built-in defaults, relative to the given home directory.
    pub fn defaults(home: Option<&Path>) -> Self {
        let recordings_dir = home
            .map(|home| home.join("GrandOrgue").join("Audio recordings"))
            .unwrap_or_default();
        Self {
            recordings_dir,
            organ_name: DEFAULT_ORGAN_NAME.to_string(),
        }
    }

    /// Overlay the keys present in `file`.
    pub fn apply(&mut self, file: ConfigFile) {
        if let Some(dir) = file.recordings_directory {
            self.recordings_dir = dir;
        }
        if let Some(name) = file.organ_name {
            self.organ_name = name;
        }
    }

    /// Overlay an optional config file; read or parse failures are logged and skipped.
    pub fn apply_optional(&mut self, path: &Path) {
        match ConfigFile::load(path) {
            Ok(file) => {
                tracing::info!(path = %path.display(), "loaded config");
                self.apply(file);
            }
            Err(err) => {
                let error = format!("{err:#}");
                tracing::warn!(path = %path.display(), error = %error, "config not applied");
            }
        }
    }

    /// Resolve the configuration from defaults, the global file and the user file.
    pub fn discover(home: Option<&Path>) -> Self {
        let mut cfg = Self::defaults(home);
        cfg.apply_optional(Path::new(GLOBAL_CONFIG_PATH));
        match user_config_path(home) {
            Some(path) => cfg.apply_optional(&path),
            None => tracing::warn!("HOME is not set; skipping user config"),
        }
        cfg
    }
}

/// Per-user config file under `$HOME/.config`.
pub fn user_config_path(home: Option<&Path>) -> Option<PathBuf> {
    home.map(|home| home.join(".config").join("organ-http").join("config.json"))
}

/// Home directory from the environment, ignoring an empty value.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "organ-http-config-{tag}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&root).expect("create temp dir");
        root
    }

    #[test]
    fn defaults_are_home_relative() {
        let cfg = OrganConfig::defaults(Some(Path::new("/home/organist")));
        assert_eq!(
            cfg.recordings_dir,
            PathBuf::from("/home/organist/GrandOrgue/Audio recordings")
        );
        assert_eq!(cfg.organ_name, DEFAULT_ORGAN_NAME);
    }

    #[test]
    fn defaults_without_home_use_empty_dir() {
        let cfg = OrganConfig::defaults(None);
        assert_eq!(cfg.recordings_dir, PathBuf::new());
    }

    #[test]
    fn user_file_overrides_only_present_keys() {
        let root = temp_root("overlay");
        let global = root.join("global.json");
        let user = root.join("user.json");
        std::fs::write(
            &global,
            r#"{ "recordings-directory": "/srv/recordings", "organ-name": "Hauptwerk" }"#,
        )
        .unwrap();
        std::fs::write(&user, r#"{ "organ-name": "Chapel Organ" }"#).unwrap();

        let mut cfg = OrganConfig::defaults(None);
        cfg.apply_optional(&global);
        cfg.apply_optional(&user);

        assert_eq!(cfg.recordings_dir, PathBuf::from("/srv/recordings"));
        assert_eq!(cfg.organ_name, "Chapel Organ");
    }

    #[test]
    fn malformed_file_keeps_previous_values() {
        let root = temp_root("malformed");
        let path = root.join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut cfg = OrganConfig::defaults(Some(Path::new("/home/organist")));
        let before = cfg.clone();
        cfg.apply_optional(&path);
        assert_eq!(cfg, before);
    }

    #[test]
    fn missing_file_is_an_error_with_path_context() {
        let root = temp_root("missing");
        let path = root.join("absent.json");
        let err = ConfigFile::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let root = temp_root("unknown");
        let path = root.join("config.json");
        std::fs::write(&path, r#"{ "organ-name": "Positive", "stops": 12 }"#).unwrap();
        let file = ConfigFile::load(&path).expect("load config");
        assert_eq!(file.organ_name.as_deref(), Some("Positive"));
        assert!(file.recordings_directory.is_none());
    }

    #[test]
    fn user_config_path_under_dot_config() {
        let path = user_config_path(Some(Path::new("/home/organist"))).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/home/organist/.config/organ-http/config.json")
        );
        assert!(user_config_path(None).is_none());
    }
}
