use crate::config::{HttpConfig, TrelloConfig};
use crate::error::{HeraldError, Result};
use crate::types::{Attachment, Item, Label};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Source of the watched column's current cards.
pub trait BoardProvider {
    /// Cards currently in the column, in board order.
    fn list_current_items(&mut self) -> Result<Vec<Item>>;
}

// ---------------------------------------------------------------------------
// Trello wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TrelloBoardInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TrelloList {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrelloCard {
    id: String,
    name: String,
    #[serde(default)]
    labels: Vec<TrelloLabel>,
    #[serde(default)]
    cover: Option<TrelloCover>,
    #[serde(default)]
    attachments: Vec<TrelloAttachment>,
}

#[derive(Debug, Deserialize)]
struct TrelloLabel {
    #[serde(default)]
    name: String,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrelloCover {
    #[serde(default)]
    id_attachment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrelloAttachment {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

impl From<TrelloCard> for Item {
    fn from(card: TrelloCard) -> Self {
        Item {
            id: card.id,
            title: card.name,
            labels: card
                .labels
                .into_iter()
                .map(|l| Label {
                    name: l.name,
                    color: l.color,
                })
                .collect(),
            cover_attachment_id: card.cover.and_then(|c| c.id_attachment),
            attachments: card
                .attachments
                .into_iter()
                .filter_map(|a| {
                    Some(Attachment {
                        id: a.id,
                        url: a.url?,
                        mime_type: a.mime_type.filter(|m| !m.is_empty()),
                    })
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// TrelloBoard
// ---------------------------------------------------------------------------

/// Reads one list of a Trello board.
pub struct TrelloBoard {
    client: Client,
    config: TrelloConfig,
    board_name: String,
    list_id: String,
}

impl TrelloBoard {
    /// Resolve the board and the target list by name.
    pub fn connect(config: &TrelloConfig, http: &HttpConfig) -> Result<Self> {
        let mut board = Self {
            client: http.client()?,
            config: config.clone(),
            board_name: String::new(),
            list_id: String::new(),
        };
        board.resolve()?;
        Ok(board)
    }

    pub fn board_name(&self) -> &str {
        &self.board_name
    }

    pub fn list_name(&self) -> &str {
        &self.config.target_list_name
    }

    fn resolve(&mut self) -> Result<()> {
        tracing::debug!(board = %self.config.board_id, "connecting to board");
        let info: TrelloBoardInfo = self
            .get(&format!("/boards/{}", self.config.board_id), &[("fields", "name")])
            .map_err(connectivity)?;
        let lists: Vec<TrelloList> = self
            .get(
                &format!("/boards/{}/lists", self.config.board_id),
                &[("fields", "name")],
            )
            .map_err(connectivity)?;

        let wanted = &self.config.target_list_name;
        let Some(list) = lists.iter().find(|l| &l.name == wanted) else {
            let available: Vec<&str> = lists.iter().map(|l| l.name.as_str()).collect();
            return Err(HeraldError::ListNotFound {
                name: wanted.clone(),
                available: available.join(", "),
            });
        };

        tracing::debug!(board = %info.name, list = %list.name, "list resolved");
        self.board_name = info.name;
        self.list_id = list.id.clone();
        Ok(())
    }

    fn fetch_cards(&self) -> Result<Vec<Item>> {
        let cards: Vec<TrelloCard> = self.get(
            &format!("/lists/{}/cards", self.list_id),
            &[
                ("fields", "name,labels,cover"),
                ("attachments", "true"),
                ("attachment_fields", "id,url,mimeType"),
            ],
        )?;
        Ok(cards.into_iter().map(Item::from).collect())
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.config.api_base.trim_end_matches('/'), path);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("token", self.config.token.as_str()),
            ])
            .query(query)
            .send()
            .map_err(strip_url)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(HeraldError::HttpStatus {
                status: status.as_u16(),
                url: format!("{}{}", self.config.api_base, path),
            });
        }
        Ok(resp.json().map_err(strip_url)?)
    }
}

/// The request URL carries the API key and token as query parameters.
fn strip_url(err: reqwest::Error) -> HeraldError {
    HeraldError::Http(err.without_url())
}

impl BoardProvider for TrelloBoard {
    fn list_current_items(&mut self) -> Result<Vec<Item>> {
        with_one_retry(self, |b| b.fetch_cards(), |b| b.resolve())
    }
}

/// Run `op`; on failure reconnect and run it exactly once more.
fn with_one_retry<S, T>(
    state: &mut S,
    mut op: impl FnMut(&mut S) -> Result<T>,
    reconnect: impl FnOnce(&mut S) -> Result<()>,
) -> Result<T> {
    match op(state) {
        Ok(v) => Ok(v),
        Err(first) => {
            tracing::warn!(error = %first, "board request failed, reconnecting once");
            reconnect(state)?;
            op(state).map_err(connectivity)
        }
    }
}

fn connectivity(err: HeraldError) -> HeraldError {
    match err {
        HeraldError::Connectivity(_) => err,
        other => HeraldError::Connectivity(other.to_string()),
    }
}
