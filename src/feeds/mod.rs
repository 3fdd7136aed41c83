//! Remote feeds: the profile sheet and the links list.

mod links;
mod profile;
mod traits;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use url::Url;

use crate::error::FetchError;

pub use links::{parse_markdown_link, LinkEntry, LinksSchema, LinksSnapshot};
pub use profile::{parse_profile, ProfileSnapshot, HIDDEN_STATUS};
pub use traits::{Fetcher, HttpFetcher};

/// Which of the two independently polled feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Profile,
    Links,
}

impl FeedKind {
    pub fn name(self) -> &'static str {
        match self {
            FeedKind::Profile => "profile",
            FeedKind::Links => "links",
        }
    }
}

/// Last successfully adapted payload of one feed.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    /// Raw JSON the snapshot was built from; change detection compares this
    pub payload: Value,
    pub data: T,
    pub fetched_at: DateTime<Utc>,
}

impl<T> Snapshot<T> {
    pub fn new(payload: Value, data: T) -> Self {
        Self {
            payload,
            data,
            fetched_at: Utc::now(),
        }
    }

    /// Structural comparison of raw payloads: object key sets must match and
    /// every value must be equal recursively. `null` never equals a missing
    /// key, and key order is ignored.
    pub fn same_payload(&self, other: &Snapshot<T>) -> bool {
        self.payload == other.payload
    }
}

impl<T: PartialEq> Snapshot<T> {
    /// Equal payloads that also adapt to equal data. Catches changes the raw
    /// comparison ignores, such as links reordered within a sheet row.
    pub fn same_content(&self, other: &Snapshot<T>) -> bool {
        self.same_payload(other) && self.data == other.data
    }
}

/// Cache state of one feed as the renderer sees it.
#[derive(Debug, Clone)]
pub enum Resource<T> {
    /// Never loaded; rendered as a loading state
    Pending,
    /// Was loaded, then a fetch failed and the cache was cleared
    Unavailable,
    Ready(T),
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Resource::Pending
    }
}

impl<T> Resource<T> {
    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Resource::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Resource::Pending)
    }
}

/// Fetches both feeds through a [`Fetcher`] and adapts them.
#[derive(Clone)]
pub struct FeedClient {
    fetcher: Arc<dyn Fetcher>,
    profile_url: Url,
    links_url: Url,
    links_schema: LinksSchema,
}

impl FeedClient {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        profile_url: Url,
        links_url: Url,
        links_schema: LinksSchema,
    ) -> Self {
        Self {
            fetcher,
            profile_url,
            links_url,
            links_schema,
        }
    }

    pub async fn fetch_profile(&self) -> Result<Snapshot<ProfileSnapshot>, FetchError> {
        tracing::debug!("Fetching profile via {}", self.fetcher.name());
        let body = self.fetcher.get_json(&self.profile_url).await?;
        let (record, profile) = parse_profile(&body)?;
        Ok(Snapshot::new(record, profile))
    }

    pub async fn fetch_links(&self) -> Result<Snapshot<LinksSnapshot>, FetchError> {
        tracing::debug!("Fetching links via {}", self.fetcher.name());
        let body = self.fetcher.get_json(&self.links_url).await?;
        let links = self.links_schema.parse(&body, &self.links_url)?;
        Ok(Snapshot::new(body, links))
    }
}
