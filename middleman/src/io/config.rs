//! Middleman configuration stored in `.middleman/config.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".middleman/config.toml";

/// Middleman configuration (TOML).
///
/// Missing fields fall back to defaults, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MiddlemanConfig {
    /// Model name sent with every completion request.
    pub model: String,

    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    pub base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    pub shell: ShellConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShellConfig {
    /// Interpreter executable.
    pub program: String,
    /// Arguments placed before the command line (e.g. `["-c"]`).
    pub args: Vec<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: "sh".to_string(),
            args: vec!["-c".to_string()],
        }
    }
}

impl Default for MiddlemanConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            shell: ShellConfig::default(),
        }
    }
}

impl MiddlemanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("model must be non-empty"));
        }
        if self.base_url.trim().is_empty() {
            return Err(anyhow!("base_url must be non-empty"));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(anyhow!("api_key_env must be non-empty"));
        }
        if self.shell.program.trim().is_empty() {
            return Err(anyhow!("shell.program must be non-empty"));
        }
        Ok(())
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(anyhow!(
                "missing API key: set the {} environment variable",
                self.api_key_env
            )),
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `MiddlemanConfig::default()`.
pub fn load_config(path: &Path) -> Result<MiddlemanConfig> {
    if !path.exists() {
        let cfg = MiddlemanConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: MiddlemanConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, MiddlemanConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "model = \"gpt-4o-mini\"\n\n[shell]\nprogram = \"bash\"\n",
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.shell.program, "bash");
        assert_eq!(cfg.shell.args, vec!["-c"]);
        assert_eq!(cfg.base_url, MiddlemanConfig::default().base_url);
    }

    #[test]
    fn rejects_empty_model() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "model = \"  \"\n").expect("write");

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("model must be non-empty"));
    }

    #[test]
    fn rejects_unparseable_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "model = [").expect("write");

        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parse"));
    }

    #[test]
    fn api_key_reports_variable_name() {
        let cfg = MiddlemanConfig {
            api_key_env: "MIDDLEMAN_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..MiddlemanConfig::default()
        };
        let err = cfg.api_key().unwrap_err();
        assert!(
            err.to_string()
                .contains("MIDDLEMAN_TEST_KEY_THAT_IS_NEVER_SET")
        );
    }
}
