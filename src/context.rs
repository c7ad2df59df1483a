// SPDX-License-Identifier: MPL-2.0

//! Saved selections embedded in the edit page.
//!
//! The server renders the ad's current category path and location nodes
//! into a `page-context` JSON script. It is read once at start-up and
//! handed to the form controller, which uses it to restore the saved
//! selections level by level.

use crate::widgets::cascade::OptionId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Element id of the embedded JSON script.
pub const PAGE_CONTEXT_ID: &str = "page-context";

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("page context is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no element with id {0:?} in page")]
    MissingElement(&'static str),
}

/// A node on a saved path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextNode {
    pub id: OptionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Saved location path; every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationHierarchy {
    #[serde(default)]
    pub location: Option<ContextNode>,
    #[serde(default)]
    pub city: Option<ContextNode>,
    #[serde(default)]
    pub neighbourhood: Option<ContextNode>,
}

/// Immutable snapshot of the ad's saved category and location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    /// Category path from the root to the saved leaf.
    #[serde(default)]
    pub category_hierarchy: Vec<ContextNode>,
    #[serde(default)]
    pub location_hierarchy: Option<LocationHierarchy>,
}

impl PageContext {
    /// Context of a blank (create) form.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ContextError> {
        let trimmed = json.trim();
        // An absent context renders as an empty script or `null`.
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Self::empty());
        }
        Ok(serde_json::from_str(trimmed)?)
    }

    /// Reads the context from the `page-context` script of a rendered page.
    pub fn from_html(page: &str) -> Result<Self, ContextError> {
        let json = element_text(page, PAGE_CONTEXT_ID)
            .ok_or(ContextError::MissingElement(PAGE_CONTEXT_ID))?;
        Self::from_json(json)
    }

    /// Candidates for any category level: the whole saved path.
    ///
    /// Every level tries the full path; only the id that belongs to that
    /// level can match its options.
    pub fn category_candidates(&self) -> Vec<OptionId> {
        self.category_hierarchy.iter().map(|node| node.id).collect()
    }

    /// Candidates for a location level (1 location, 2 city, 3 neighbourhood).
    pub fn location_candidates(&self, depth: usize) -> Vec<OptionId> {
        let Some(hierarchy) = &self.location_hierarchy else {
            return Vec::new();
        };
        let node = match depth {
            1 => &hierarchy.location,
            2 => &hierarchy.city,
            3 => &hierarchy.neighbourhood,
            _ => return Vec::new(),
        };
        node.iter().map(|node| node.id).collect()
    }
}

/// Text content of the element carrying `id="<id>"`.
fn element_text<'a>(page: &'a str, id: &str) -> Option<&'a str> {
    let marker = [format!("id=\"{id}\""), format!("id='{id}'")]
        .into_iter()
        .find_map(|marker| page.find(&marker))?;
    let open_end = marker + page[marker..].find('>')? + 1;
    let close = open_end + page[open_end..].find("</")?;
    Some(&page[open_end..close])
}
