use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{WardenError, WardenResult};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WardenConfig {
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Completion endpoint of the local inference server.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model name sent to the API.
    #[serde(default = "default_model")]
    pub model: String,
    /// Pinned to 0.0 so the same intent/action pair classifies the same way every run.
    #[serde(default)]
    pub temperature: f64,
    /// Generation cap; the verdict is a single word.
    #[serde(default = "default_num_predict")]
    pub num_predict: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PolicyConfig {
    #[serde(default)]
    pub fail_mode: FailMode,
    #[serde(default)]
    pub blocked_feedback: BlockedFeedback,
}

/// Disposition when the oracle cannot be consulted or answers ambiguously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailMode {
    /// Admit the call anyway.
    Open,
    /// Deny the call.
    #[default]
    Closed,
}

/// What happens to the synthesized results of blocked calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockedFeedback {
    /// Append a tool-result turn per blocked call so the agent sees the denial.
    #[default]
    Inject,
    /// Drop the call silently; blocked results are only returned to the host.
    Discard,
}

fn default_endpoint() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_model() -> String {
    "phi3:mini".to_string()
}

fn default_num_predict() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    8
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: 0.0,
            num_predict: default_num_predict(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn resolve_config_path() -> WardenResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(WardenError::Config(
        "config.toml not found next to executable or in working directory".into(),
    ))
}

pub fn load_config() -> WardenResult<WardenConfig> {
    let path = resolve_config_path()?;
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> WardenResult<WardenConfig> {
    let content = std::fs::read_to_string(path)?;
    let mut config: WardenConfig = toml::from_str(&content)?;
    apply_env_overrides(&mut config.oracle);
    tracing::info!(
        path = %path.display(),
        endpoint = %config.oracle.endpoint,
        model = %config.oracle.model,
        "config loaded"
    );
    Ok(config)
}

/// Env vars (and `.env` entries) win over the file so deployments can repoint
/// the oracle without editing config.toml.
fn apply_env_overrides(oracle: &mut OracleConfig) {
    let _ = dotenvy::dotenv();
    if let Ok(endpoint) = std::env::var("WARDEN_ORACLE_ENDPOINT") {
        if !endpoint.is_empty() {
            oracle.endpoint = endpoint;
        }
    }
    if let Ok(model) = std::env::var("WARDEN_ORACLE_MODEL") {
        if !model.is_empty() {
            oracle.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_fill_missing_sections() {
        let config: WardenConfig = toml::from_str("").unwrap();
        assert_eq!(config.oracle.endpoint, "http://localhost:11434/api/generate");
        assert_eq!(config.oracle.model, "phi3:mini");
        assert_eq!(config.oracle.temperature, 0.0);
        assert_eq!(config.oracle.num_predict, 10);
        assert_eq!(config.oracle.timeout_secs, 8);
        assert_eq!(config.policy.fail_mode, FailMode::Closed);
        assert_eq!(config.policy.blocked_feedback, BlockedFeedback::Inject);
    }

    #[test]
    fn parses_policy_enums() {
        let config: WardenConfig = toml::from_str(
            r#"
            [policy]
            fail_mode = "open"
            blocked_feedback = "discard"
            "#,
        )
        .unwrap();
        assert_eq!(config.policy.fail_mode, FailMode::Open);
        assert_eq!(config.policy.blocked_feedback, BlockedFeedback::Discard);
    }

    #[test]
    fn rejects_unknown_fail_mode() {
        let result: Result<WardenConfig, _> = toml::from_str(
            r#"
            [policy]
            fail_mode = "maybe"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[oracle]\nmodel = \"gemma2:2b\"\ntimeout_secs = 3").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.oracle.model, "gemma2:2b");
        assert_eq!(config.oracle.timeout_secs, 3);
        assert_eq!(config.oracle.endpoint, "http://localhost:11434/api/generate");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = load_config_from(&dir.path().join("config.toml"));
        assert!(matches!(result, Err(WardenError::Io(_))));
    }
}
