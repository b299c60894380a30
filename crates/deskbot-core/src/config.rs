use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{domain::UserId, Result};

/// Token written into a freshly generated credential file.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_TOKEN_HERE";

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search?q=";
pub const DEFAULT_CONNECTIVITY_URL: &str = "http://clients3.google.com/generate_204";

/// On-disk credential file: `{"Token": "...", "UserId": 0}`.
///
/// `UserId == 0` means "no restriction".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "Token")]
    pub token: String,
    #[serde(rename = "UserId", default)]
    pub user_id: i64,
}

impl Credentials {
    pub fn placeholder() -> Self {
        Self {
            token: PLACEHOLDER_TOKEN.to_string(),
            user_id: 0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.token.trim() == PLACEHOLDER_TOKEN
    }

    pub fn authorized_user(&self) -> Option<UserId> {
        (self.user_id != 0).then_some(UserId(self.user_id))
    }

    /// Parses the file. An empty `Token` is accepted here and rejected later
    /// by the transport, so the operator's `UserId` is never overwritten.
    pub fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Writes the file with one-space indentation, the layout operators already
    /// have on disk.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        self.serialize(&mut ser)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, buf)?;
        Ok(())
    }

    /// `DESKBOT_TOKEN` / `DESKBOT_USER_ID` win over the file when set.
    fn with_overrides(mut self, token: Option<String>, user_id: Option<String>) -> Self {
        if let Some(token) = token.and_then(non_empty) {
            self.token = token;
        }
        if let Some(id) = user_id.and_then(|s| s.trim().parse::<i64>().ok()) {
            self.user_id = id;
        }
        self
    }
}

/// Runtime tunables read from the environment (`.env` honored).
#[derive(Clone, Debug)]
pub struct Settings {
    pub config_path: PathBuf,

    // Screenshot
    pub screenshot_max_width: u32,
    pub screenshot_max_height: u32,
    pub jpeg_quality: u8,

    // Clipboard
    pub search_url: String,

    // Startup
    pub connectivity_url: String,
    pub connectivity_timeout: Duration,

    // Transport
    pub poll_timeout: Duration,

    // Notifications
    pub notifications_enabled: bool,
    pub notification_icon: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            screenshot_max_width: 1280,
            screenshot_max_height: 720,
            jpeg_quality: 75,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            connectivity_url: DEFAULT_CONNECTIVITY_URL.to_string(),
            connectivity_timeout: Duration::from_millis(5000),
            poll_timeout: Duration::from_secs(30),
            notifications_enabled: true,
            notification_icon: None,
        }
    }
}

impl Settings {
    /// Reads tunables from the process environment after loading `.env`.
    ///
    /// `config_path` (usually the first CLI argument) wins over `DESKBOT_CONFIG`.
    pub fn from_env(config_path: Option<PathBuf>) -> Self {
        load_dotenv_if_present(Path::new(".env"));

        let defaults = Self::default();
        Self {
            config_path: config_path
                .or_else(|| env_path("DESKBOT_CONFIG"))
                .unwrap_or(defaults.config_path),
            screenshot_max_width: env_u32("DESKBOT_SCREENSHOT_WIDTH")
                .unwrap_or(defaults.screenshot_max_width),
            screenshot_max_height: env_u32("DESKBOT_SCREENSHOT_HEIGHT")
                .unwrap_or(defaults.screenshot_max_height),
            jpeg_quality: env_u32("DESKBOT_JPEG_QUALITY")
                .map(|q| q.clamp(1, 100) as u8)
                .unwrap_or(defaults.jpeg_quality),
            search_url: env_str("DESKBOT_SEARCH_URL")
                .and_then(non_empty)
                .unwrap_or(defaults.search_url),
            connectivity_url: env_str("DESKBOT_CONNECTIVITY_URL")
                .and_then(non_empty)
                .unwrap_or(defaults.connectivity_url),
            connectivity_timeout: env_u64("DESKBOT_CONNECTIVITY_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.connectivity_timeout),
            poll_timeout: env_u64("DESKBOT_POLL_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_timeout),
            notifications_enabled: env_bool("DESKBOT_NOTIFICATIONS")
                .unwrap_or(defaults.notifications_enabled),
            notification_icon: env_str("DESKBOT_NOTIFICATION_ICON").and_then(non_empty),
        }
    }
}

/// Typed configuration, immutable for the process lifetime.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    pub authorized_user: Option<UserId>,
    pub settings: Settings,
}

/// Outcome of loading the credential file.
#[derive(Debug)]
pub enum ConfigLoad {
    Ready(Config),
    /// The file was absent or unreadable; a placeholder now sits at `path`.
    PlaceholderWritten { path: PathBuf, reason: String },
}

impl Config {
    pub fn new(creds: Credentials, settings: Settings) -> Self {
        Self {
            authorized_user: creds.authorized_user(),
            telegram_bot_token: creds.token,
            settings,
        }
    }

    pub fn has_placeholder_token(&self) -> bool {
        self.telegram_bot_token.trim() == PLACEHOLDER_TOKEN
    }

    /// Loads the credential file named by `settings`, applying env overrides.
    ///
    /// A missing or malformed file is replaced by a placeholder.
    pub fn load(settings: Settings) -> Result<ConfigLoad> {
        let path = settings.config_path.clone();
        match Credentials::read(&path) {
            Ok(creds) => {
                let creds =
                    creds.with_overrides(env_str("DESKBOT_TOKEN"), env_str("DESKBOT_USER_ID"));
                Ok(ConfigLoad::Ready(Self::new(creds, settings)))
            }
            Err(e) => {
                Credentials::placeholder().write(&path)?;
                Ok(ConfigLoad::PlaceholderWritten {
                    path,
                    reason: e.to_string(),
                })
            }
        }
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_nanos();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}"))
    }

    fn settings_at(path: &Path) -> Settings {
        Settings {
            config_path: path.to_path_buf(),
            ..Settings::default()
        }
    }

    #[test]
    fn placeholder_round_trips_through_disk() {
        let dir = tmp("deskbot-cfg");
        let path = dir.join("config.json");

        let written = Credentials::placeholder();
        written.write(&path).unwrap();
        let read = Credentials::read(&path).unwrap();

        assert_eq!(read, written);
        assert_eq!(read.token, "YOUR_TOKEN_HERE");
        assert_eq!(read.user_id, 0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn placeholder_uses_one_space_indent() {
        let dir = tmp("deskbot-cfg");
        let path = dir.join("config.json");
        Credentials::placeholder().write(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "{\n \"Token\": \"YOUR_TOKEN_HERE\",\n \"UserId\": 0\n}");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_writes_placeholder() {
        let dir = tmp("deskbot-cfg");
        let path = dir.join("config.json");

        match Config::load(settings_at(&path)).unwrap() {
            ConfigLoad::PlaceholderWritten { path: p, .. } => assert_eq!(p, path),
            ConfigLoad::Ready(_) => panic!("expected placeholder"),
        }
        assert_eq!(Credentials::read(&path).unwrap(), Credentials::placeholder());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_is_replaced() {
        let dir = tmp("deskbot-cfg");
        let path = dir.join("config.json");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::load(settings_at(&path)).unwrap(),
            ConfigLoad::PlaceholderWritten { .. }
        ));
        assert_eq!(Credentials::read(&path).unwrap(), Credentials::placeholder());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn loads_operator_restriction() {
        let dir = tmp("deskbot-cfg");
        let path = dir.join("config.json");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, r#"{"Token":"123:abc","UserId":42}"#).unwrap();

        let creds = Credentials::read(&path).unwrap();
        assert_eq!(creds.authorized_user(), Some(UserId(42)));
        assert!(!creds.is_placeholder());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_token_file_is_loaded_not_replaced() {
        let dir = tmp("deskbot-cfg");
        let path = dir.join("config.json");
        fs::create_dir_all(&dir).unwrap();
        let on_disk = r#"{"Token":"","UserId":42}"#;
        fs::write(&path, on_disk).unwrap();

        let ConfigLoad::Ready(cfg) = Config::load(settings_at(&path)).unwrap() else {
            panic!("an empty token must not regenerate the file");
        };
        assert_eq!(cfg.authorized_user, Some(UserId(42)));
        assert_eq!(fs::read_to_string(&path).unwrap(), on_disk);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn env_quality_is_clamped() {
        env::set_var("DESKBOT_JPEG_QUALITY", "500");
        let settings = Settings::from_env(Some(PathBuf::from("/tmp/deskbot-elsewhere.json")));
        env::remove_var("DESKBOT_JPEG_QUALITY");

        assert_eq!(settings.jpeg_quality, 100);
        assert_eq!(settings.config_path, PathBuf::from("/tmp/deskbot-elsewhere.json"));
    }

    #[test]
    fn zero_user_id_means_unrestricted() {
        let creds = Credentials {
            token: "t".into(),
            user_id: 0,
        };
        assert_eq!(creds.authorized_user(), None);
        assert!(Config::new(Credentials::placeholder(), Settings::default()).has_placeholder_token());
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let creds = Credentials::placeholder()
            .with_overrides(Some("999:xyz".into()), Some(" 7 ".into()));
        assert_eq!(creds.token, "999:xyz");
        assert_eq!(creds.user_id, 7);

        let untouched = Credentials::placeholder()
            .with_overrides(Some("  ".into()), Some("nope".into()));
        assert_eq!(untouched, Credentials::placeholder());
    }
}
