use crate::announce::{Formatter, DEFAULT_INTRO};
use crate::diff::ExclusionPolicy;
use crate::error::{HeraldError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const REDACTED: &str = "********";

// ---------------------------------------------------------------------------
// TrelloConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrelloConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub board_id: String,
    #[serde(default)]
    pub target_list_name: String,
    #[serde(default = "default_trello_api_base")]
    pub api_base: String,
}

fn default_trello_api_base() -> String {
    "https://api.trello.com/1".to_string()
}

// ---------------------------------------------------------------------------
// TwitterConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub access_token_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
    #[serde(default = "default_twitter_api_base")]
    pub api_base: String,
    #[serde(default = "default_twitter_upload_base")]
    pub upload_base: String,
}

fn default_twitter_api_base() -> String {
    "https://api.twitter.com/2".to_string()
}

fn default_twitter_upload_base() -> String {
    "https://upload.twitter.com/1.1".to_string()
}

// ---------------------------------------------------------------------------
// AnnounceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnounceConfig {
    #[serde(default = "default_intro")]
    pub intro: String,
    #[serde(default = "default_version_prefix")]
    pub version_prefix: String,
    #[serde(default = "default_skip_first_card")]
    pub skip_first_card: bool,
    #[serde(default = "default_media_types")]
    pub media_types: Vec<String>,
}

fn default_intro() -> String {
    DEFAULT_INTRO.to_string()
}

fn default_version_prefix() -> String {
    "version".to_string()
}

fn default_skip_first_card() -> bool {
    true
}

fn default_media_types() -> Vec<String> {
    vec!["image/png".to_string(), "image/gif".to_string()]
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        Self {
            intro: default_intro(),
            version_prefix: default_version_prefix(),
            skip_first_card: default_skip_first_card(),
            media_types: default_media_types(),
        }
    }
}

impl AnnounceConfig {
    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.intro.clone(), self.media_types.clone())
    }

    pub fn exclusion_policy(&self) -> ExclusionPolicy {
        ExclusionPolicy {
            skip_first: self.skip_first_card,
            version_prefix: self.version_prefix.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// StoreConfig / HttpConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_tracked_file")]
    pub tracked_file: PathBuf,
}

fn default_tracked_file() -> PathBuf {
    PathBuf::from(paths::TRACKED_FILE)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            tracked_file: default_tracked_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn client(&self) -> Result<reqwest::blocking::Client> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .user_agent(concat!("herald/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(client)
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trello: Option<TrelloConfig>,
    #[serde(default)]
    pub twitter: Option<TwitterConfig>,
    #[serde(default)]
    pub announce: AnnounceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Read and parse the config file without validating it.
    pub fn read(path: &Path) -> Result<Self> {
        let data = crate::io::read_if_exists(path)?
            .ok_or_else(|| HeraldError::ConfigNotFound(path.display().to_string()))?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Read, parse, and validate. Any missing required key is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let cfg = Self::read(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Every missing section or required key, in a fixed trello-then-twitter order.
    pub fn missing(&self) -> Vec<HeraldError> {
        let mut missing = Vec::new();

        match &self.trello {
            None => missing.push(HeraldError::MissingConfigSection("trello".to_string())),
            Some(t) => check_keys(
                "trello",
                &[
                    ("api_key", &t.api_key),
                    ("token", &t.token),
                    ("board_id", &t.board_id),
                    ("target_list_name", &t.target_list_name),
                ],
                &mut missing,
            ),
        }

        match &self.twitter {
            None => missing.push(HeraldError::MissingConfigSection("twitter".to_string())),
            Some(t) => check_keys(
                "twitter",
                &[
                    ("api_key", &t.api_key),
                    ("api_secret", &t.api_secret),
                    ("access_token", &t.access_token),
                    ("access_token_secret", &t.access_token_secret),
                ],
                &mut missing,
            ),
        }

        missing
    }

    pub fn validate(&self) -> Result<()> {
        match self.missing().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn trello(&self) -> Result<&TrelloConfig> {
        self.trello
            .as_ref()
            .ok_or_else(|| HeraldError::MissingConfigSection("trello".to_string()))
    }

    pub fn twitter(&self) -> Result<&TwitterConfig> {
        self.twitter
            .as_ref()
            .ok_or_else(|| HeraldError::MissingConfigSection("twitter".to_string()))
    }

    pub fn tracked_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.store.tracked_file)
    }

    /// Copy with every credential replaced, for display.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if let Some(t) = cfg.trello.as_mut() {
            redact(&mut t.api_key);
            redact(&mut t.token);
        }
        if let Some(t) = cfg.twitter.as_mut() {
            redact(&mut t.api_key);
            redact(&mut t.api_secret);
            redact(&mut t.access_token);
            redact(&mut t.access_token_secret);
            if let Some(b) = t.bearer_token.as_mut() {
                redact(b);
            }
        }
        cfg
    }
}

fn check_keys(section: &str, keys: &[(&str, &String)], out: &mut Vec<HeraldError>) {
    for (key, value) in keys {
        if value.trim().is_empty() {
            out.push(HeraldError::MissingConfigKey {
                section: section.to_string(),
                key: key.to_string(),
            });
        }
    }
}

fn redact(value: &mut String) {
    if !value.is_empty() {
        *value = REDACTED.to_string();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL: &str = r#"
trello:
  api_key: k
  token: t
  board_id: b
  target_list_name: Done
twitter:
  api_key: ck
  api_secret: cs
  access_token: at
  access_token_secret: ats
"#;

    #[test]
    fn full_config_validates_with_defaults() {
        let cfg: Config = serde_yaml::from_str(FULL).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.announce.version_prefix, "version");
        assert!(cfg.announce.skip_first_card);
        assert_eq!(cfg.http.timeout_secs, 30);
        assert_eq!(cfg.trello().unwrap().api_base, "https://api.trello.com/1");
        assert_eq!(
            cfg.store.tracked_file,
            PathBuf::from(".herald/tracked_cards.json")
        );
    }

    #[test]
    fn json_config_is_accepted() {
        let json = r#"{"trello": {"api_key": "k", "token": "t", "board_id": "b",
            "target_list_name": "Done"}, "twitter": {"api_key": "ck", "api_secret": "cs",
            "access_token": "at", "access_token_secret": "ats", "bearer_token": "bt"}}"#;
        let cfg: Config = serde_yaml::from_str(json).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.twitter().unwrap().bearer_token.as_deref(), Some("bt"));
    }

    #[test]
    fn missing_section_is_reported() {
        let cfg: Config = serde_yaml::from_str("trello:\n  api_key: k\n").unwrap();
        let msgs: Vec<String> = cfg.missing().iter().map(|e| e.to_string()).collect();
        assert!(msgs.contains(&"missing 'token' in 'trello' section of config".to_string()));
        assert!(msgs.contains(&"missing 'twitter' section in config".to_string()));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let cfg: Config = serde_yaml::from_str(&FULL.replace("token: t", "token: \"  \"")).unwrap();
        assert!(matches!(
            cfg.validate(),
            Err(HeraldError::MissingConfigKey { ref key, .. }) if key == "token"
        ));
    }

    #[test]
    fn load_missing_file_is_config_not_found() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("config.yaml")).unwrap_err();
        assert!(matches!(err, HeraldError::ConfigNotFound(_)));
    }

    #[test]
    fn load_invalid_yaml_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "trello: [unclosed").unwrap();
        assert!(matches!(Config::load(&path), Err(HeraldError::Yaml(_))));
    }

    #[test]
    fn redacted_hides_credentials() {
        let cfg: Config = serde_yaml::from_str(FULL).unwrap();
        let shown = cfg.redacted();
        let twitter = shown.twitter().unwrap();
        assert_eq!(twitter.access_token_secret, REDACTED);
        assert_eq!(twitter.bearer_token, None);
        assert_eq!(shown.trello().unwrap().board_id, "b");
        assert_eq!(cfg.twitter().unwrap().access_token_secret, "ats");
    }

    #[test]
    fn tracked_path_resolves_against_root() {
        let cfg = Config::default();
        assert_eq!(
            cfg.tracked_path(Path::new("/srv/bot")),
            PathBuf::from("/srv/bot/.herald/tracked_cards.json")
        );
    }
}
