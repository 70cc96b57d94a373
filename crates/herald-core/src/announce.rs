use crate::types::{Announcement, Item, Label, MediaReference};

pub const DEFAULT_INTRO: &str = "🤖 *bip boop* Progress report !\n\nNew feature done : ";
pub const DEFAULT_GLYPH: &str = "⚫";

/// Color keyword to glyph, checked in order; the first keyword contained in
/// the label color wins.
const GLYPHS: &[(&str, &str)] = &[
    ("blue", "🔵"),
    ("sky", "🔵"),
    ("green", "🟢"),
    ("lime", "🟢"),
    ("yellow", "🟡"),
    ("orange", "🟠"),
    ("red", "🔴"),
    ("purple", "🟣"),
    ("pink", "🟣"),
    ("black", "⚫"),
];

pub fn glyph_for(color: Option<&str>) -> &'static str {
    let Some(color) = color else {
        return DEFAULT_GLYPH;
    };
    GLYPHS
        .iter()
        .find(|(keyword, _)| color.contains(keyword))
        .map(|(_, glyph)| *glyph)
        .unwrap_or(DEFAULT_GLYPH)
}

pub fn format_label(label: &Label) -> String {
    format!("[{} {}]", glyph_for(label.color.as_deref()), label.name)
}

/// Renders all labels separated by single spaces.
pub fn format_labels(labels: &[Label]) -> String {
    labels
        .iter()
        .map(format_label)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds announcements from items. Pure: no I/O, no mutation.
#[derive(Debug, Clone)]
pub struct Formatter {
    intro: String,
    media_types: Vec<String>,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            intro: DEFAULT_INTRO.to_string(),
            media_types: vec!["image/png".to_string(), "image/gif".to_string()],
        }
    }
}

impl Formatter {
    pub fn new(intro: impl Into<String>, media_types: Vec<String>) -> Self {
        Self {
            intro: intro.into(),
            media_types,
        }
    }

    pub fn format(&self, item: &Item) -> Announcement {
        let mut text = format!("{}{}", self.intro, item.title);
        if !item.labels.is_empty() {
            text.push_str("\n\n");
            text.push_str(&format_labels(&item.labels));
        }
        Announcement {
            text,
            media: self.cover_media(item),
        }
    }

    fn cover_media(&self, item: &Item) -> Option<MediaReference> {
        let cover = item.cover_attachment()?;
        let mime = cover.mime_type.as_deref()?;
        if !self.media_types.iter().any(|t| t.eq_ignore_ascii_case(mime)) {
            return None;
        }
        Some(MediaReference {
            url: cover.url.clone(),
            mime_type: mime.to_string(),
        })
    }
}
