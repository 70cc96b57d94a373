use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    /// Board color category, e.g. `blue`, `sky_dark`. Boards may leave it unset.
    #[serde(default)]
    pub color: Option<String>,
}

impl Label {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Some(color.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// One card read from the watched board column. Owned by the board; the
/// pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Attachment the board shows as the card cover, if any.
    #[serde(default)]
    pub cover_attachment_id: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            labels: Vec::new(),
            cover_attachment_id: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_cover(mut self, attachment: Attachment) -> Self {
        self.cover_attachment_id = Some(attachment.id.clone());
        self.attachments.push(attachment);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// The attachment referenced by the cover, if the card has one.
    pub fn cover_attachment(&self) -> Option<&Attachment> {
        let cover_id = self.cover_attachment_id.as_deref()?;
        self.attachments.iter().find(|a| a.id == cover_id)
    }
}

// ---------------------------------------------------------------------------
// Announcement
// ---------------------------------------------------------------------------

/// Media to attach to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaReference {
    pub url: String,
    pub mime_type: String,
}

/// Publishable payload derived from one item. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Announcement {
    pub text: String,
    pub media: Option<MediaReference>,
}
