use log::{debug, warn};

use crate::config::{Settings, resolve_config_path};

/// The effective settings. A config file that fails to load or validate is
/// reported and replaced by the defaults.
pub fn load_settings() -> Settings {
    match resolve_config_path() {
        Some(path) if path.is_file() => debug!("reading config from {}", path.display()),
        Some(path) => debug!("no config at {}, using defaults", path.display()),
        None => debug!("no config location, using defaults"),
    }

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            warn!("could not load config: {e}");
            return Settings::default();
        }
    };
    match settings.validate() {
        Ok(()) => settings,
        Err(problems) => {
            warn!("ignoring config ({problems})");
            Settings::default()
        }
    }
}
