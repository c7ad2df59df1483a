// SPDX-License-Identifier: MPL-2.0

//! Cascading selectors for hierarchical data entry.
//!
//! A chain is a stack of dependent selectors: choosing a value at one level
//! loads its children into a new selector one level deeper. Changing any
//! level discards everything beneath it before the children are fetched
//! again.
//!
//! # Example
//!
//! ```ignore
//! use crate::widgets::cascade::{CascadeMessage, ChainState, SectionId};
//!
//! let mut chain = ChainState::new();
//!
//! // Children of the chosen node arrived: show them one level down.
//! let level = chain.render(1, "Location", items);
//!
//! // Restore a saved choice and cascade from it.
//! let msg = level.preselect(SectionId::Location, &[saved_id]);
//!
//! match msg {
//!     CascadeMessage::Changed { level, .. } => {
//!         chain.prune(level + 1);
//!         // fetch children of msg.chosen() ...
//!     }
//! }
//! ```

mod item;
mod message;
mod state;
mod widget;

pub use item::{InvalidOptionId, OptionId, OptionItem};
pub use message::CascadeMessage;
pub use state::{ChainState, Level, LoadState, SectionId};
pub use widget::{CascadeSelect, escape};
