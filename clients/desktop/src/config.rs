use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use vaga_messaging::{Participant, ParticipantKind};

/// Default polling cadence in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Runtime configuration for the desktop client, read from the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub data_dir: PathBuf,
    pub poll_interval_secs: u64,
    pub polling_enabled: bool,
    pub notifications_enabled: bool,
    pub seed_demo: bool,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        let data_dir = match env::var("VAGA_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => default_data_dir()?,
        };
        // The timer panics on a zero period, so clamp to at least 1s.
        let poll_interval_secs = env::var("VAGA_POLL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
            .max(1);
        let polling_enabled = env_flag("VAGA_POLLING", true);
        let notifications_enabled = env_flag("VAGA_NOTIFY", true);
        let seed_demo = env_flag("VAGA_SEED", false);

        Ok(Self {
            data_dir,
            poll_interval_secs,
            polling_enabled,
            notifications_enabled,
            seed_demo,
        })
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => !matches!(value.as_str(), "0" | "false" | "off" | ""),
        Err(_) => default,
    }
}

/// Per-user data directory, created on first use.
pub fn default_data_dir() -> Result<PathBuf> {
    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("Could not find home directory")?;

    let data_dir = PathBuf::from(home).join(".vaga");
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
    }
    Ok(data_dir)
}

/// Loads the local participant profile, creating one on first run.
///
/// The profile stands in for the signed-in account; its id keys the
/// conversation snapshot file.
pub fn load_or_create_profile(data_dir: &Path) -> Result<Participant> {
    let path = data_dir.join("profile.json");
    if path.exists() {
        let json = fs::read_to_string(&path).context("Failed to read profile")?;
        let profile = serde_json::from_str(&json).context("Failed to parse profile")?;
        return Ok(profile);
    }

    let name = env::var("VAGA_USER_NAME").unwrap_or_else(|_| "Candidate".to_string());
    let profile = Participant::new(name, ParticipantKind::Candidate);
    let json = serde_json::to_string_pretty(&profile).context("Failed to serialize profile")?;
    fs::write(&path, json).context("Failed to save profile")?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_flag_parses_common_spellings() {
        assert!(env_flag("VAGA_TEST_FLAG_UNSET", true));
        assert!(!env_flag("VAGA_TEST_FLAG_UNSET", false));

        env::set_var("VAGA_TEST_FLAG", "0");
        assert!(!env_flag("VAGA_TEST_FLAG", true));
        env::set_var("VAGA_TEST_FLAG", "1");
        assert!(env_flag("VAGA_TEST_FLAG", false));
        env::remove_var("VAGA_TEST_FLAG");
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        env::set_var("VAGA_DATA_DIR", dir.path());
        env::set_var("VAGA_POLL_SECS", "0");
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.poll_interval_secs, 1);
        env::remove_var("VAGA_POLL_SECS");
        env::remove_var("VAGA_DATA_DIR");
    }

    #[test]
    fn profile_is_stable_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let first = load_or_create_profile(dir.path()).unwrap();
        let second = load_or_create_profile(dir.path()).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.name, second.name);
        assert_eq!(first.kind, ParticipantKind::Candidate);
    }
}
