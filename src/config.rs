use crate::domain::{BranchRules, VersionIncrement};
use crate::error::{GitflowError, Result};
use crate::host::github::DEFAULT_API_URL;
use crate::host::RepoSlug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for one run, resolved once at startup and passed to every workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub develop_branch: String,
    pub main_branch: String,
    /// Merge the production branch back into development instead of the released head branch
    pub merge_back_from_main: bool,
    /// Explicit version, used verbatim
    pub version: Option<String>,
    pub version_increment: Option<VersionIncrement>,
    pub dry_run: bool,
    /// Text placed under "## Release summary" in release pull requests
    pub release_summary: String,
    pub release_branch_prefix: String,
    pub hotfix_branch_prefix: String,
    /// Raw JSON channel configuration; announcements are off when absent
    pub slack: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            develop_branch: "develop".to_string(),
            main_branch: "main".to_string(),
            merge_back_from_main: false,
            version: None,
            version_increment: None,
            dry_run: false,
            release_summary: String::new(),
            release_branch_prefix: "release/".to_string(),
            hotfix_branch_prefix: "hotfix/".to_string(),
            slack: None,
        }
    }
}

impl Config {
    pub fn branch_rules(&self) -> BranchRules {
        BranchRules::new(
            self.main_branch.clone(),
            self.release_branch_prefix.clone(),
            self.hotfix_branch_prefix.clone(),
        )
    }

    /// Check the invariants every workflow relies on
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("develop_branch", &self.develop_branch),
            ("main_branch", &self.main_branch),
            ("release_branch_prefix", &self.release_branch_prefix),
            ("hotfix_branch_prefix", &self.hotfix_branch_prefix),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(GitflowError::config(format!("{} must not be empty", name)));
            }
        }

        if self.develop_branch == self.main_branch {
            return Err(GitflowError::config(format!(
                "develop_branch and main_branch are both '{}'",
                self.main_branch
            )));
        }
        Ok(())
    }
}

/// Settings read from a TOML file. Every key is optional and named like its action input.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub develop_branch: Option<String>,
    #[serde(default)]
    pub main_branch: Option<String>,
    #[serde(default)]
    pub merge_back_from_main: Option<bool>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub version_increment: Option<String>,
    #[serde(default)]
    pub dry_run: Option<bool>,
    #[serde(default)]
    pub release_summary: Option<String>,
    #[serde(default)]
    pub release_branch_prefix: Option<String>,
    #[serde(default)]
    pub hotfix_branch_prefix: Option<String>,
    /// Either a JSON string or a `[slack]` table
    #[serde(default)]
    pub slack: Option<serde_json::Value>,
}

/// Read a named input the way GitHub Actions exposes it
///
/// Looks up `INPUT_<NAME>` first, then `<NAME>`. Empty values count as absent.
pub fn action_input<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let key = name.replace(' ', "_").to_uppercase();
    lookup(&format!("INPUT_{}", key))
        .filter(|v| !v.trim().is_empty())
        .or_else(|| lookup(&key).filter(|v| !v.trim().is_empty()))
}

/// Boolean inputs are true only for a literal "true"
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Merge inputs over file settings over defaults
///
/// # Arguments
/// * `file` - Settings from the TOML file (use `FileConfig::default()` when none)
/// * `lookup` - Environment lookup, e.g. `|k| std::env::var(k).ok()`
pub fn resolve_config<F>(file: FileConfig, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();
    let text = |name: &str, from_file: Option<String>| {
        action_input(&lookup, name).or_else(|| from_file.filter(|v| !v.trim().is_empty()))
    };

    let version_increment = match text("version_increment", file.version_increment) {
        Some(kind) => Some(kind.parse::<VersionIncrement>()?),
        None => None,
    };

    let slack = match action_input(&lookup, "slack") {
        Some(raw) => Some(raw),
        None => match file.slack {
            Some(serde_json::Value::String(raw)) if !raw.trim().is_empty() => Some(raw),
            Some(serde_json::Value::String(_)) | Some(serde_json::Value::Null) | None => None,
            Some(table) => Some(table.to_string()),
        },
    };

    let config = Config {
        develop_branch: text("develop_branch", file.develop_branch)
            .unwrap_or(defaults.develop_branch),
        main_branch: text("main_branch", file.main_branch).unwrap_or(defaults.main_branch),
        merge_back_from_main: action_input(&lookup, "merge_back_from_main")
            .map(|v| parse_flag(&v))
            .or(file.merge_back_from_main)
            .unwrap_or(defaults.merge_back_from_main),
        version: text("version", file.version),
        version_increment,
        dry_run: action_input(&lookup, "dry_run")
            .map(|v| parse_flag(&v))
            .or(file.dry_run)
            .unwrap_or(defaults.dry_run),
        release_summary: action_input(&lookup, "release_summary")
            .or(file.release_summary)
            .unwrap_or(defaults.release_summary),
        release_branch_prefix: text("release_branch_prefix", file.release_branch_prefix)
            .unwrap_or(defaults.release_branch_prefix),
        hotfix_branch_prefix: text("hotfix_branch_prefix", file.hotfix_branch_prefix)
            .unwrap_or(defaults.hotfix_branch_prefix),
        slack,
    };

    config.validate()?;
    Ok(config)
}

/// Loads the optional TOML settings file.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `.github/gitflow.toml` in current directory
/// 3. `gitflow.toml` in current directory
/// 4. `gitflow-release.toml` in user config directory
/// 5. Empty settings if no file found
///
/// # Returns
/// * `Ok(FileConfig)` - Loaded or empty settings
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_file_config(config_path: Option<&str>) -> Result<FileConfig> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./.github/gitflow.toml").exists() {
        fs::read_to_string("./.github/gitflow.toml")?
    } else if Path::new("./gitflow.toml").exists() {
        fs::read_to_string("./gitflow.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("gitflow-release.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(FileConfig::default());
        }
    } else {
        return Ok(FileConfig::default());
    };

    toml::from_str(&config_str)
        .map_err(|e| GitflowError::config(format!("Invalid config file: {}", e)))
}

/// Loads settings from the process environment and the optional TOML file
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let file = load_file_config(config_path)?;
    resolve_config(file, |key| std::env::var(key).ok())
}

/// Credentials and CI context, kept apart from workflow settings
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeEnv {
    pub github_token: String,
    pub slack_token: Option<String>,
    /// `owner/name` from `GITHUB_REPOSITORY`, if set
    pub repository: Option<RepoSlug>,
    pub api_url: String,
    pub event_name: Option<String>,
    pub event_path: Option<String>,
}

impl RuntimeEnv {
    /// Read the runtime environment
    ///
    /// # Returns
    /// * `Err(CredentialMissing)` - `GITHUB_TOKEN` is not set
    /// * `Err(Config)` - `GITHUB_REPOSITORY` is set but malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let github_token = non_empty("GITHUB_TOKEN")
            .ok_or_else(|| GitflowError::credential_missing("GITHUB_TOKEN is not set"))?;

        let repository = match non_empty("GITHUB_REPOSITORY") {
            Some(slug) => Some(slug.parse::<RepoSlug>()?),
            None => None,
        };

        Ok(RuntimeEnv {
            github_token,
            slack_token: non_empty("SLACK_TOKEN"),
            repository,
            api_url: non_empty("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            event_name: non_empty("GITHUB_EVENT_NAME"),
            event_path: non_empty("GITHUB_EVENT_PATH"),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}
