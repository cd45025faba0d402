use std::env;
use std::path::{Path, PathBuf};

use super::schema::Settings;

const ENV_PREFIX: &str = "AUDIOFOLIO";
const CONFIG_PATH_VAR: &str = "AUDIOFOLIO_CONFIG_PATH";

/// Layers, lowest priority first: struct defaults, the config file (if any),
/// then `AUDIOFOLIO__SECTION__KEY` environment variables.
fn layered(file: Option<&Path>) -> ::config::ConfigBuilder<::config::builder::DefaultState> {
    let mut builder = ::config::Config::builder();
    if let Some(path) = file {
        builder = builder.add_source(::config::File::from(path).required(false));
    }
    builder.add_source(
        ::config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("library.extensions")
            .try_parsing(true),
    )
}

impl Settings {
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let file = resolve_config_path();
        layered(file.as_deref()).build()?.try_deserialize()
    }

    /// Every problem found, joined with `; `.
    pub fn validate(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        let named = self
            .library
            .extensions
            .iter()
            .any(|e| !e.trim().trim_start_matches('.').is_empty());
        if !named {
            problems.push("library.extensions must name at least one extension");
        }
        if self.tools.timeout_secs == Some(0) {
            problems.push("tools.timeout_secs must be >= 1 when set");
        }
        if self.tools.ffmpeg.trim().is_empty() {
            problems.push("tools.ffmpeg must name a program");
        }
        if self.tools.audio_codec.trim().is_empty() {
            problems.push("tools.audio_codec must not be empty");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}

/// `AUDIOFOLIO_CONFIG_PATH` when set, else the per-user default.
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `$XDG_CONFIG_HOME/audiofolio/config.toml`, or under `~/.config` without XDG.
pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("audiofolio").join("config.toml"))
}
