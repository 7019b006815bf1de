// Shared data structs for the home screen sections.
// These are consumed by the view models in `modules` and can be tested independently.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum HomeSectionType {
    JumpBackIn,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub url: String,
    pub last_executed: DateTime<Utc>,
    pub is_private: bool,
    /// Search that led to this tab, if any. Used to group related tabs.
    pub search_term: Option<String>,
}

impl Tab {
    pub fn new(id: impl Into<String>, url: impl Into<String>, last_executed: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            url: url.into(),
            last_executed,
            is_private: false,
            search_term: None,
        }
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }
}

// Tabs are identified by id only; url and title change while browsing.
impl PartialEq for Tab {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tab {}

/// Tabs that were opened from the same search, shown collapsed as one tile.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct TabGroup {
    pub search_term: String,
    pub grouped_items: Vec<Tab>,
    pub timestamp: DateTime<Utc>,
}

impl TabGroup {
    pub fn contains(&self, tab: &Tab) -> bool {
        self.grouped_items.contains(tab)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub enum SiteKind {
    #[default]
    Regular,
    Pinned,
    Suggested,
    Sponsored,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub provider_name: Option<String>,
    pub icon_url: Option<String>,
    pub media_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Site {
    pub guid: Option<String>,
    pub url: String,
    pub title: String,
    pub metadata: Option<PageMetadata>,
    pub kind: SiteKind,
}

impl Site {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            guid: None,
            url: url.into(),
            title: title.into(),
            metadata: None,
            kind: SiteKind::Regular,
        }
    }

    pub fn with_kind(mut self, kind: SiteKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn with_metadata(mut self, metadata: PageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Provider name from page metadata, ignoring empty values.
    pub fn provider_name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.provider_name.as_deref())
            .filter(|name| !name.trim().is_empty())
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Favicon,
    HeroImage,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    Remote {
        url: String,
        bytes: Arc<[u8]>,
        content_type: Option<String>,
    },
    /// Placeholder drawn from the first letter of the site name.
    Letter(char),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SiteImage {
    pub kind: ImageKind,
    pub source: ImageSource,
}

impl SiteImage {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.source, ImageSource::Letter(_))
    }
}
