use crate::error::ClipError;
use crate::service::selection::CaptureMode;
use crate::types::Hotkey;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

pub static NOTION_API_BASE: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://api.notion.com/v1/").expect("FATAL: invalid Notion API base url")
});

pub const NOTION_VERSION: &str = "2022-06-28";

/// Rich text column that receives the captured text.
pub const DEFAULT_MEMO_PROPERTY: &str = "メモ";

pub const CONFIG_DIR_NAME: &str = ".clip_to_notion";
pub const CONFIG_FILE_NAME: &str = ".env";

/// Env file keys that land in `Config` fields prefixed with `NOTION_`.
const NOTION_KEYS: [&str; 4] = ["api_key", "database_id", "memo_property", "api_base"];
/// Env file keys used verbatim.
const RAW_KEYS: [&str; 4] = ["hotkey", "capture_mode", "proxy", "loglevel"];

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub database_id: String,
    pub memo_property: String,
    pub api_base: Url,
    pub hotkey: Hotkey,
    pub capture_mode: CaptureMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<Url>,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::new(),
            database_id: String::new(),
            memo_property: DEFAULT_MEMO_PROPERTY.to_string(),
            api_base: NOTION_API_BASE.clone(),
            hotkey: Hotkey::default(),
            capture_mode: CaptureMode::default(),
            proxy: None,
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    /// Validated credential pair. Fails before any network use.
    pub fn credentials(&self) -> Result<Credentials, ClipError> {
        Credentials::new(&self.api_key, &self.database_id)
    }
}

/// API key plus target database id, both guaranteed non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    database_id: String,
}

impl Credentials {
    pub fn new(api_key: impl AsRef<str>, database_id: impl AsRef<str>) -> Result<Self, ClipError> {
        let api_key = api_key.as_ref().trim();
        let database_id = database_id.as_ref().trim();
        if api_key.is_empty() {
            return Err(ClipError::MissingConfig("NOTION_API_KEY"));
        }
        if database_id.is_empty() {
            return Err(ClipError::MissingConfig("NOTION_DATABASE_ID"));
        }
        if !is_notion_id(database_id) {
            warn!(database_id, "database id is not a 32 character hex identifier");
        }
        Ok(Self {
            api_key: api_key.to_string(),
            database_id: database_id.to_string(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &mask_secret(&self.api_key))
            .field("database_id", &self.database_id)
            .finish()
    }
}

/// 32 hex digits, dashes ignored.
pub fn is_notion_id(id: &str) -> bool {
    let hex: Vec<char> = id.chars().filter(|c| *c != '-').collect();
    hex.len() == 32 && hex.iter().all(|c| c.is_ascii_hexdigit())
}

/// Keep the first four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "<unset>".to_string();
    }
    let head: String = secret.chars().take(4).collect();
    format!("{head}****")
}

/// Flat `KEY=value` file holding the user's settings.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.clip_to_notion/.env`
    pub fn default_location() -> Result<Self, ClipError> {
        let home = dirs::home_dir().ok_or(ClipError::MissingConfig("HOME"))?;
        Ok(Self::new(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Defaults, then the file, then the process environment.
    pub fn load(&self) -> Result<Config, ClipError> {
        let file_values = self.read_file()?;
        debug!(path = %self.path.display(), keys = file_values.len(), "loaded config file");
        layered(file_values)
    }

    /// Like [`load`](Self::load), but an unreadable file is skipped so the
    /// settings can be rewritten from scratch.
    pub fn load_for_repair(&self) -> Result<Config, ClipError> {
        match self.load() {
            Ok(config) => Ok(config),
            Err(ClipError::EnvFile(e)) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable config file");
                layered(BTreeMap::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Write `config` back, creating the directory if needed.
    pub fn save(&self, config: &Config) -> Result<(), ClipError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, render(config))?;
        Ok(())
    }

    /// Whether setup has been completed: both required keys present and non-empty.
    pub fn is_complete(&self) -> bool {
        match self.read_file() {
            Ok(values) => ["api_key", "database_id"]
                .iter()
                .all(|k| values.get(*k).is_some_and(|v| !v.trim().is_empty())),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read config file");
                false
            }
        }
    }

    /// Parse the file into field-name keyed values without touching the
    /// process environment. A missing file yields no values.
    fn read_file(&self) -> Result<BTreeMap<String, String>, ClipError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let mut values = BTreeMap::new();
        for item in dotenvy::from_path_iter(&self.path)? {
            let (key, value) = item?;
            if value.trim().is_empty() {
                continue;
            }
            if let Some(field) = field_for_key(&key) {
                values.insert(field, value);
            }
        }
        Ok(values)
    }
}

fn layered(file_values: BTreeMap<String, String>) -> Result<Config, ClipError> {
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Serialized::defaults(file_values))
        .merge(Serialized::defaults(env_values()))
        .extract()?;
    Ok(config)
}

/// Non-blank process environment values, keyed like the file values.
fn env_values() -> BTreeMap<String, String> {
    Env::prefixed("NOTION_")
        .only(&NOTION_KEYS)
        .iter()
        .chain(Env::raw().only(&RAW_KEYS).iter())
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| (key.as_str().to_ascii_lowercase(), value))
        .collect()
}

fn field_for_key(key: &str) -> Option<String> {
    let lower = key.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("notion_")
        && NOTION_KEYS.contains(&rest)
    {
        return Some(rest.to_string());
    }
    RAW_KEYS.contains(&lower.as_str()).then_some(lower)
}

fn render(config: &Config) -> String {
    let defaults = Config::default();
    let mut lines = vec![
        ("NOTION_API_KEY", config.api_key.clone()),
        ("NOTION_DATABASE_ID", config.database_id.clone()),
        ("HOTKEY", config.hotkey.to_string()),
    ];
    if config.memo_property != defaults.memo_property {
        lines.push(("NOTION_MEMO_PROPERTY", config.memo_property.clone()));
    }
    if config.api_base != defaults.api_base {
        lines.push(("NOTION_API_BASE", config.api_base.to_string()));
    }
    if config.capture_mode != defaults.capture_mode {
        lines.push(("CAPTURE_MODE", config.capture_mode.to_string()));
    }
    if let Some(proxy) = &config.proxy {
        lines.push(("PROXY", proxy.to_string()));
    }
    if config.loglevel != defaults.loglevel {
        lines.push(("LOGLEVEL", config.loglevel.clone()));
    }
    lines
        .into_iter()
        .map(|(key, value)| format!("{key}={}\n", quote(&value)))
        .collect()
}

/// Single quotes keep the value literal; values containing one fall back to
/// escaped double quotes.
fn quote(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$");
    format!("\"{escaped}\"")
}
