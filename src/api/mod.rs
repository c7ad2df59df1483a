// SPDX-License-Identifier: MPL-2.0

//! Option-list endpoints consumed by the form.

mod ads;

pub use ads::{AdsClient, HtmlResponse, ItemsResponse};

use crate::widgets::cascade::{OptionId, OptionItem};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdsError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type AdsResult<T> = Result<T, AdsError>;

/// Node whose children are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentNode {
    /// Synthetic root; top-level categories or root locations.
    Root,
    Node(OptionId),
}

impl ParentNode {
    /// Value used in the endpoint path.
    pub fn raw(self) -> u64 {
        match self {
            ParentNode::Root => 0,
            ParentNode::Node(id) => id.get(),
        }
    }
}

impl fmt::Display for ParentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}

/// One GET the form needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRequest {
    CategoryChildren { parent: ParentNode },
    CategoryProperties { category: OptionId, ad: Option<u64> },
    Locations,
    Cities { location: OptionId },
    Neighbourhoods { city: OptionId },
}

impl FetchRequest {
    /// Endpoint path relative to the site root, for logging.
    pub fn path(&self) -> String {
        match self {
            FetchRequest::CategoryChildren { parent } => {
                format!("/ads/ajax/category_children/{parent}/")
            }
            FetchRequest::CategoryProperties { category, ad } => format!(
                "/ads/ajax/load-category-properties/?category_id={category}&ad_id={}",
                ad.map(|id| id.to_string()).unwrap_or_default()
            ),
            FetchRequest::Locations => "/ads/ajax/locations/".to_string(),
            FetchRequest::Cities { location } => format!("/ads/ajax/cities/{location}/"),
            FetchRequest::Neighbourhoods { city } => format!("/ads/ajax/neighbourhoods/{city}/"),
        }
    }
}

/// Decoded body of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Items(Vec<OptionItem>),
    Html(String),
}

/// Source of option lists and property markup.
///
/// [`AdsClient`] talks HTTP; tests plug in fixed data.
#[async_trait]
pub trait OptionSource: Send + Sync {
    async fn category_children(&self, parent: ParentNode) -> AdsResult<Vec<OptionItem>>;

    async fn category_properties(&self, category: OptionId, ad: Option<u64>) -> AdsResult<String>;

    async fn locations(&self) -> AdsResult<Vec<OptionItem>>;

    async fn cities(&self, location: OptionId) -> AdsResult<Vec<OptionItem>>;

    async fn neighbourhoods(&self, city: OptionId) -> AdsResult<Vec<OptionItem>>;

    /// Runs `request` against the matching endpoint.
    async fn fetch(&self, request: FetchRequest) -> AdsResult<Payload> {
        match request {
            FetchRequest::CategoryChildren { parent } => {
                self.category_children(parent).await.map(Payload::Items)
            }
            FetchRequest::CategoryProperties { category, ad } => {
                self.category_properties(category, ad).await.map(Payload::Html)
            }
            FetchRequest::Locations => self.locations().await.map(Payload::Items),
            FetchRequest::Cities { location } => self.cities(location).await.map(Payload::Items),
            FetchRequest::Neighbourhoods { city } => {
                self.neighbourhoods(city).await.map(Payload::Items)
            }
        }
    }
}
