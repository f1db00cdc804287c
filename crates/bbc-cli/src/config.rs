//! Configuration Vault – reads `~/.bbc/config.toml`.
//!
//! The file only needs the keys it wants to change.  Missing keys fall back
//! to the stock tuning of the selected profile, so `profile = "blob"` on its
//! own already yields the blob robot's speeds and loop delay.

use std::fs;
use std::path::{Path, PathBuf};

use bbc_runtime::{ArbiterConfig, Profile};
use bbc_types::BbcError;
use tracing::warn;

/// Return the path to `~/.bbc/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".bbc").join("config.toml")
}

/// Load the config from `path`.
///
/// `profile` (from the command line or environment) takes precedence over
/// the file's own `profile` key.  A missing file yields the stock tuning.
pub fn load_from(path: &Path, profile: Option<Profile>) -> Result<ArbiterConfig, BbcError> {
    if !path.exists() {
        return Ok(ArbiterConfig::for_profile(profile.unwrap_or_default()));
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        BbcError::Config(format!("Failed to read config at {}: {}", path.display(), e))
    })?;
    parse(&raw, profile)
}

/// Parse a TOML document layered over the stock tuning of its profile.
pub(crate) fn parse(raw: &str, profile: Option<Profile>) -> Result<ArbiterConfig, BbcError> {
    let overlay: toml::Table =
        toml::from_str(raw).map_err(|e| BbcError::Config(format!("Failed to parse config: {e}")))?;

    let profile = match profile {
        Some(p) => p,
        None => match overlay.get("profile") {
            Some(value) => value
                .as_str()
                .ok_or_else(|| BbcError::Config("profile must be a string".to_string()))?
                .parse()
                .map_err(|e| BbcError::Config(format!("{e}")))?,
            None => Profile::default(),
        },
    };

    let toml::Value::Table(mut base) = toml::Value::try_from(ArbiterConfig::for_profile(profile))
        .map_err(|e| BbcError::Config(format!("Failed to serialize defaults: {e}")))?
    else {
        return Err(BbcError::Config("defaults did not serialize to a table".to_string()));
    };
    merge(&mut base, overlay);
    base.insert("profile".to_string(), toml::Value::String(profile.to_string()));

    toml::Value::Table(base)
        .try_into()
        .map_err(|e| BbcError::Config(format!("Failed to parse config: {e}")))
}

/// Recursively overwrite `base` with every key present in `overlay`.
fn merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(inner)), toml::Value::Table(patch)) => merge(inner, patch),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Render `cfg` as a TOML document.
pub fn render(cfg: &ArbiterConfig) -> Result<String, BbcError> {
    toml::to_string_pretty(cfg)
        .map_err(|e| BbcError::Config(format!("Failed to serialize config: {e}")))
}

/// Read `BBC_PROFILE`.  Unknown names are logged and ignored.
pub fn profile_from_env() -> Option<Profile> {
    let v = std::env::var("BBC_PROFILE").ok()?;
    match v.parse() {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(error = %e, "Ignoring BBC_PROFILE");
            None
        }
    }
}

/// Apply `BBC_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `BBC_LOOP_DELAY_MS` | `loop_delay_ms` |
/// | `BBC_STARTUP_DELAY_MS` | `startup_delay_ms` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut ArbiterConfig) {
    if let Ok(v) = std::env::var("BBC_LOOP_DELAY_MS")
        && let Ok(ms) = v.trim().parse::<u64>()
    {
        cfg.loop_delay_ms = ms;
    }
    if let Ok(v) = std::env::var("BBC_STARTUP_DELAY_MS")
        && let Ok(ms) = v.trim().parse::<u64>()
    {
        cfg.startup_delay_ms = ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_points_to_bbc_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".bbc"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn missing_file_yields_stock_tuning() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = load_from(&path, None).expect("no error");
        assert_eq!(cfg, ArbiterConfig::default());

        let cfg = load_from(&path, Some(Profile::Blob)).expect("no error");
        assert_eq!(cfg, ArbiterConfig::for_profile(Profile::Blob));
    }

    #[test]
    fn file_profile_selects_its_defaults() {
        let cfg = parse("profile = \"blob\"\n", None).expect("parse");
        assert_eq!(cfg.profile, Profile::Blob);
        assert_eq!(cfg.loop_delay_ms, 20);
        assert_eq!(cfg.cruise.speed, 100);
    }

    #[test]
    fn explicit_profile_beats_file() {
        let cfg = parse("profile = \"blob\"\n", Some(Profile::Line)).expect("parse");
        assert_eq!(cfg.profile, Profile::Line);
        assert_eq!(cfg.loop_delay_ms, 0);
        assert_eq!(cfg.cruise.speed, 150);
    }

    #[test]
    fn partial_sections_merge_over_defaults() {
        let raw = r#"
            startup_delay_ms = 0

            [line]
            kp = 55.0

            [intervals]
            sonar_ms = 50
        "#;
        let cfg = parse(raw, Some(Profile::Line)).expect("parse");
        assert_eq!(cfg.startup_delay_ms, 0);
        assert_eq!(cfg.line.kp, 55.0);
        assert_eq!(cfg.line.kd, 100.0);
        assert_eq!(cfg.intervals.sonar_ms, 50);
        assert_eq!(cfg.intervals.ir_ms, 125);
    }

    #[test]
    fn cue_table_replaces_default() {
        let raw = r#"
            [[blob.cues]]
            signature = 4
            sequence = 9
        "#;
        let cfg = parse(raw, None).expect("parse");
        assert_eq!(cfg.blob.cues.len(), 1);
        assert_eq!(cfg.blob.cues[0].sequence, 9);
    }

    #[test]
    fn unknown_profile_in_file_is_an_error() {
        let err = parse("profile = \"dance\"\n", None).unwrap_err();
        assert!(matches!(err, BbcError::Config(_)));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "cruise = [").expect("write");
        assert!(load_from(&path, None).is_err());
    }

    #[test]
    fn rendered_config_loads_back() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        let mut cfg = ArbiterConfig::for_profile(Profile::Wall);
        cfg.wall.kp = 0.75;

        std::fs::write(&path, render(&cfg).expect("render")).expect("write");
        let loaded = load_from(&path, None).expect("load");
        assert_eq!(loaded.profile, Profile::Wall);
        assert_eq!(loaded.wall.kp, 0.75);
        assert_eq!(loaded.cruise.speed, 150);
    }

    #[test]
    fn apply_env_overrides_changes_delays() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("BBC_STARTUP_DELAY_MS", "250") };
        let mut cfg = ArbiterConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.startup_delay_ms, 250);
        unsafe { std::env::remove_var("BBC_STARTUP_DELAY_MS") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_delay() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("BBC_LOOP_DELAY_MS", "soon") };
        let mut cfg = ArbiterConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.loop_delay_ms, 0);
        unsafe { std::env::remove_var("BBC_LOOP_DELAY_MS") };
    }
}
