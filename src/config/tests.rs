use super::load::{default_config_path, resolve_config_path};
use super::*;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

fn layout_for(source: &str) -> Layout {
    Settings::default()
        .layout(Some(Path::new(source)))
        .unwrap()
}

#[test]
fn resolve_config_path_prefers_explicit_variable() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("AUDIOFOLIO_CONFIG_PATH", "/tmp/audiofolio-test.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        PathBuf::from("/tmp/audiofolio-test.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        PathBuf::from("/tmp/xdg-config-home")
            .join("audiofolio")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("audiofolio")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[paths]
source_dir = "/recordings/wav"
publish_dir = "/srv/site"

[library]
extensions = ["wav", "flac"]
include_hidden = true

[tools]
inspector = "builtin"
ffmpeg = "/opt/ffmpeg"
vbr_quality = "5"
timeout_secs = 600

[site]
sync_cache_times = false
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("AUDIOFOLIO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("AUDIOFOLIO__TOOLS__FFMPEG");

    let s = Settings::load().unwrap();
    assert_eq!(s.paths.source_dir, Some(PathBuf::from("/recordings/wav")));
    assert_eq!(s.paths.publish_dir, PathBuf::from("/srv/site"));
    assert_eq!(s.library.extensions, vec!["wav".to_string(), "flac".to_string()]);
    assert!(s.library.include_hidden);
    assert_eq!(s.tools.inspector, InspectorKind::Builtin);
    assert_eq!(s.tools.ffmpeg, "/opt/ffmpeg");
    assert_eq!(s.tools.ffprobe, "ffprobe");
    assert_eq!(s.tools.vbr_quality, "5");
    assert_eq!(s.tools.timeout_secs, Some(600));
    assert!(!s.site.sync_cache_times);
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(&cfg_path, "[tools]\nffmpeg = \"from-file\"\n").unwrap();

    let _g1 = EnvGuard::set("AUDIOFOLIO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("AUDIOFOLIO__TOOLS__FFMPEG", "from-env");

    let s = Settings::load().unwrap();
    assert_eq!(s.tools.ffmpeg, "from-env");
}

#[test]
fn validate_rejects_empty_extensions_and_zero_timeout() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.library.extensions = vec![" . ".into()];
    assert!(s.validate().is_err());

    s.library.extensions = vec!["wav".into()];
    s.tools.timeout_secs = Some(0);
    assert!(s.validate().is_err());
}

#[test]
fn validate_reports_every_problem_at_once() {
    let mut s = Settings::default();
    s.library.extensions = Vec::new();
    s.tools.ffmpeg = " ".into();
    s.tools.audio_codec = String::new();

    let msg = s.validate().unwrap_err();
    assert_eq!(msg.split("; ").count(), 3);
    assert!(msg.contains("library.extensions"));
    assert!(msg.contains("tools.ffmpeg"));
    assert!(msg.contains("tools.audio_codec"));
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "AUDIOFOLIO_CONFIG_PATH",
        dir.path().join("absent.toml").to_str().unwrap(),
    );
    let _g2 = EnvGuard::remove("AUDIOFOLIO__TOOLS__FFMPEG");

    let s = Settings::load().unwrap();
    assert_eq!(s.tools.ffmpeg, "ffmpeg");
    assert_eq!(s.library.extensions, vec!["wav".to_string()]);
}

#[test]
fn layout_defaults_sibling_directories() {
    let layout = layout_for("/data/wav");
    assert_eq!(layout.metadata_dir, PathBuf::from("/data/json"));
    assert_eq!(layout.cache_dir, PathBuf::from("/data/m4a"));
    assert_eq!(layout.publish_dir, PathBuf::from("dist"));
}

#[test]
fn layout_requires_a_source_directory() {
    let err = Settings::default().layout(None).unwrap_err();
    assert!(err.to_string().contains("source directory"));
}

#[test]
fn derived_paths_mirror_the_source_path() {
    let layout = layout_for("/data/wav");
    let src = "trips/20240315_143000.wav";

    assert_eq!(
        layout.document_path(src),
        PathBuf::from("/data/json/trips/20240315_143000.json")
    );
    assert_eq!(
        layout.cache_path(src),
        PathBuf::from("/data/m4a/trips/20240315_143000.m4a")
    );
    assert_eq!(
        layout.compressed_path(src),
        "assets/audio/trips/20240315_143000.m4a"
    );
    // same input, same output
    assert_eq!(layout.document_path(src), layout.document_path(src));
    assert_ne!(
        layout.document_path("a/clip.wav"),
        layout.document_path("b/clip.wav")
    );
}

#[test]
fn source_candidates_cover_both_cases() {
    let layout = layout_for("/data/wav");
    let c = layout.source_candidates(Path::new("dir/clip.json"));
    assert_eq!(c, vec!["dir/clip.wav".to_string(), "dir/clip.WAV".to_string()]);
}

#[test]
fn is_source_file_is_case_insensitive() {
    let layout = layout_for("/data/wav");
    assert!(layout.is_source_file(Path::new("a.wav")));
    assert!(layout.is_source_file(Path::new("a.WAV")));
    assert!(!layout.is_source_file(Path::new("a.m4a")));
    assert!(!layout.is_source_file(Path::new("wav")));
}

#[test]
fn folder_of_maps_root_to_slash() {
    assert_eq!(folder_of("clip.wav"), "/");
    assert_eq!(folder_of("trips/2024/clip.wav"), "trips/2024");
}

#[test]
fn special_documents_are_recognised() {
    assert!(is_special_document("about.json"));
    assert!(is_special_document("settings.json"));
    assert!(!is_special_document("clip.json"));
}
