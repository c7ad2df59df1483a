// SPDX-License-Identifier: MPL-2.0

//! Messages emitted by cascading selectors.

use super::item::OptionId;
use super::state::SectionId;

/// Messages emitted by a rendered level.
///
/// These are wrapped by the form's message type and handled by the
/// controller's update function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeMessage {
    /// The selector at `level` changed to `value`.
    ///
    /// `value` is the raw selector value; the placeholder is `""`.
    Changed {
        /// Section the selector lives in.
        section: SectionId,
        /// Depth of the selector that changed.
        level: usize,
        /// Raw selected value.
        value: String,
    },
}

impl CascadeMessage {
    pub fn changed(section: SectionId, level: usize, value: impl Into<String>) -> Self {
        CascadeMessage::Changed {
            section,
            level,
            value: value.into(),
        }
    }

    /// Parsed id of the new value, if it names a node.
    pub fn chosen(&self) -> Option<OptionId> {
        match self {
            CascadeMessage::Changed { value, .. } => OptionId::parse(value),
        }
    }
}
