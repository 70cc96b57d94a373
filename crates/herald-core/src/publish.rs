use crate::config::{HttpConfig, TwitterConfig};
use crate::error::{HeraldError, PublishStage, Result};
use crate::oauth::OAuth1Credentials;
use crate::types::{Announcement, MediaReference};
use reqwest::blocking::{multipart, Client, Response};
use serde::{Deserialize, Serialize};

/// Result of one publish attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Delivered. The remote id is not always reported.
    Published { external_id: Option<String> },
    Failed { reason: String },
}

impl PublishOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

/// Sink for announcements. Implementations report failure through the
/// outcome and never panic or return errors.
pub trait Publisher {
    fn publish(&self, announcement: &Announcement) -> PublishOutcome;
}

// ---------------------------------------------------------------------------
// Twitter wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    #[serde(default)]
    media_id_string: Option<String>,
    #[serde(default)]
    media_id: Option<u64>,
}

#[derive(Debug, Serialize)]
struct TweetRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<TweetMedia>,
}

#[derive(Debug, Serialize)]
struct TweetMedia {
    media_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    #[serde(default)]
    data: Option<TweetData>,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    #[serde(default)]
    id: Option<String>,
}

// ---------------------------------------------------------------------------
// TwitterPublisher
// ---------------------------------------------------------------------------

/// Posts announcements as tweets, uploading the cover image first when present.
pub struct TwitterPublisher {
    client: Client,
    credentials: OAuth1Credentials,
    api_base: String,
    upload_base: String,
}

impl TwitterPublisher {
    pub fn new(config: &TwitterConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: http.client()?,
            credentials: OAuth1Credentials {
                consumer_key: config.api_key.clone(),
                consumer_secret: config.api_secret.clone(),
                token: config.access_token.clone(),
                token_secret: config.access_token_secret.clone(),
            },
            api_base: config.api_base.trim_end_matches('/').to_string(),
            upload_base: config.upload_base.trim_end_matches('/').to_string(),
        })
    }

    fn try_publish(&self, announcement: &Announcement) -> Result<Option<String>> {
        let media_ids = match &announcement.media {
            Some(media) => {
                let bytes = self.download(media)?;
                vec![self.upload(media, bytes)?]
            }
            None => Vec::new(),
        };
        self.post(&announcement.text, media_ids)
    }

    fn download(&self, media: &MediaReference) -> Result<Vec<u8>> {
        let stage = PublishStage::Download;
        let resp = self
            .client
            .get(&media.url)
            .send()
            .map_err(|e| HeraldError::publish(stage, e))?;
        let resp = ensure_success(resp, stage)?;
        let bytes = resp.bytes().map_err(|e| HeraldError::publish(stage, e))?;
        tracing::debug!(url = %media.url, size = bytes.len(), "media downloaded");
        Ok(bytes.to_vec())
    }

    fn upload(&self, media: &MediaReference, bytes: Vec<u8>) -> Result<String> {
        let stage = PublishStage::Upload;
        let url = format!("{}/media/upload.json", self.upload_base);
        let part = multipart::Part::bytes(bytes)
            .file_name("cover")
            .mime_str(&media.mime_type)
            .map_err(|e| HeraldError::publish(stage, e))?;
        let form = multipart::Form::new().part("media", part);

        let auth = self.credentials.authorization("POST", &url, &[])?;
        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .multipart(form)
            .send()
            .map_err(|e| HeraldError::publish(stage, e))?;
        let body: MediaUploadResponse = ensure_success(resp, stage)?
            .json()
            .map_err(|e| HeraldError::publish(stage, e))?;

        body.media_id_string
            .or_else(|| body.media_id.map(|id| id.to_string()))
            .ok_or_else(|| HeraldError::publish(stage, "response carried no media id"))
    }

    fn post(&self, text: &str, media_ids: Vec<String>) -> Result<Option<String>> {
        let stage = PublishStage::Post;
        let url = format!("{}/tweets", self.api_base);
        let payload = TweetRequest {
            text,
            media: (!media_ids.is_empty()).then_some(TweetMedia { media_ids }),
        };

        let auth = self.credentials.authorization("POST", &url, &[])?;
        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(&payload)
            .send()
            .map_err(|e| HeraldError::publish(stage, e))?;
        let resp = ensure_success(resp, stage)?;

        // A 2xx without a parsable id still counts as delivered.
        let id = resp
            .json::<TweetResponse>()
            .ok()
            .and_then(|r| r.data)
            .and_then(|d| d.id);
        Ok(id)
    }
}

impl Publisher for TwitterPublisher {
    fn publish(&self, announcement: &Announcement) -> PublishOutcome {
        match self.try_publish(announcement) {
            Ok(external_id) => {
                tracing::debug!(id = ?external_id, "post published");
                PublishOutcome::Published { external_id }
            }
            Err(e) => {
                tracing::warn!(error = %e, "post failed");
                PublishOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn ensure_success(resp: Response, stage: PublishStage) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    Err(HeraldError::publish(
        stage,
        format!("HTTP {}: {}", status.as_u16(), snippet.trim()),
    ))
}
