use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional per-project config file.
pub const CONFIG_FILE_NAME: &str = "provlock.json";

/// Registry host used when the mirror layout is looked up.
pub const DEFAULT_REGISTRY_HOST: &str = "registry.terraform.io";

/// Environment variable naming the provider mirror root.
pub const MIRROR_DIR_ENV: &str = "PROVLOCK_MIRROR_DIR";

/// Environment variable overriding the registry host.
pub const REGISTRY_HOST_ENV: &str = "PROVLOCK_REGISTRY_HOST";

/// Environment variable overriding the GitLab API base URL.
pub const GITLAB_BASE_URL_ENV: &str = "GITLAB_BASE_URL";

/// Environment variable holding the GitLab access token.
pub const GITLAB_TOKEN_ENV: &str = "GITLAB_TOKEN";

/// Runtime configuration for the provlock CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Root of the unpacked provider mirror.
    pub mirror_dir: Option<PathBuf>,

    /// Host segment of provider addresses inside the mirror.
    pub registry_host: String,

    /// GitLab API base URL (None means the public instance).
    pub gitlab_base_url: Option<String>,

    /// GitLab personal access token.
    #[serde(skip_serializing)]
    pub gitlab_token: Option<String>,
}

/// On-disk shape of `provlock.json`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    mirror_dir: Option<PathBuf>,
    registry_host: Option<String>,
    gitlab_base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
            mirror_dir: None,
            registry_host: DEFAULT_REGISTRY_HOST.to_string(),
            gitlab_base_url: None,
            gitlab_token: None,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Load configuration for `cwd`.
    ///
    /// Values from `provlock.json` (if present) are applied first, then
    /// environment variables. A relative `mirror_dir` in the file is resolved
    /// against `cwd`.
    pub fn load(cwd: &Path) -> Result<Self, Error> {
        let mut config = Self::new(cwd.to_path_buf());

        let path = cwd.join(CONFIG_FILE_NAME);
        if path.is_file() {
            let content = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
                path: path.clone(),
                source,
            })?;
            let file: ConfigFile =
                serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
                    path: path.clone(),
                    source,
                })?;
            config.apply_file(file);
        }

        config.apply_env();

        if config.registry_host.is_empty() {
            return Err(Error::other("registry host must not be empty"));
        }

        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(dir) = file.mirror_dir {
            self.mirror_dir = Some(self.cwd.join(dir));
        }
        if let Some(host) = file.registry_host {
            self.registry_host = host;
        }
        if let Some(url) = file.gitlab_base_url {
            self.gitlab_base_url = Some(url);
        }
    }

    fn apply_env(&mut self) {
        if let Some(dir) = env_non_empty(MIRROR_DIR_ENV) {
            self.mirror_dir = Some(PathBuf::from(dir));
        }
        if let Some(host) = env_non_empty(REGISTRY_HOST_ENV) {
            self.registry_host = host;
        }
        if let Some(url) = env_non_empty(GITLAB_BASE_URL_ENV) {
            self.gitlab_base_url = Some(url);
        }
        if let Some(token) = env_non_empty(GITLAB_TOKEN_ENV) {
            self.gitlab_token = Some(token);
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Set the mirror root.
    #[must_use]
    pub fn with_mirror_dir(mut self, dir: PathBuf) -> Self {
        self.mirror_dir = Some(dir);
        self
    }

    /// Set the GitLab API base URL.
    #[must_use]
    pub fn with_gitlab_base_url(mut self, url: String) -> Self {
        self.gitlab_base_url = Some(url);
        self
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
