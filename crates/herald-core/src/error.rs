use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeraldError {
    #[error("config file not found: {0} (create it from config.example.yaml)")]
    ConfigNotFound(String),

    #[error("missing '{0}' section in config")]
    MissingConfigSection(String),

    #[error("missing '{key}' in '{section}' section of config")]
    MissingConfigKey { section: String, key: String },

    #[error("board unreachable: {0}")]
    Connectivity(String),

    #[error("list '{name}' not found on board; available lists: {available}")]
    ListNotFound { name: String, available: String },

    #[error("{stage} failed: {reason}")]
    Publish { stage: PublishStage, reason: String },

    #[error("request signing failed: {0}")]
    Signing(String),

    #[error("unexpected HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Step of a publish attempt that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Download,
    Upload,
    Post,
}

impl std::fmt::Display for PublishStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PublishStage::Download => "media download",
            PublishStage::Upload => "media upload",
            PublishStage::Post => "post",
        };
        f.write_str(s)
    }
}

impl HeraldError {
    pub(crate) fn publish(stage: PublishStage, reason: impl std::fmt::Display) -> Self {
        HeraldError::Publish {
            stage,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HeraldError>;
