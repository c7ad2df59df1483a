// SPDX-License-Identifier: MPL-2.0

//! State management for cascading selectors.

use super::item::{OptionId, OptionItem};
use super::message::CascadeMessage;
use std::fmt;

/// The form sections that host a chain of selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    Category,
    Location,
}

impl SectionId {
    /// Element id of the section container.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Category => "category_section",
            SectionId::Location => "location_section",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "category_section" | "category" => Some(SectionId::Category),
            "location_section" | "location" => Some(SectionId::Location),
            _ => None,
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loading state of the deepest pending level in a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Waiting for the children of the selection at `level`.
    Loading { level: usize },
    /// The last fetch failed; the chain was left pruned.
    Error(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// One rendered selector at a given depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    /// Depth tag; the pruner matches on this.
    pub depth: usize,
    pub label: String,
    /// Options in server order, without the placeholder.
    pub options: Vec<OptionItem>,
    /// Current value; `None` is the placeholder.
    pub selected: Option<OptionId>,
}

impl Level {
    pub fn new(depth: usize, label: impl Into<String>, options: Vec<OptionItem>) -> Self {
        Self {
            depth,
            label: label.into(),
            options,
            selected: None,
        }
    }

    pub fn contains(&self, id: OptionId) -> bool {
        self.options.iter().any(|option| option.id == id)
    }

    /// Sets the selector to `id` if it is one of the options, otherwise to
    /// the placeholder. Returns the resulting selection.
    pub fn select(&mut self, id: Option<OptionId>) -> Option<OptionId> {
        let selected = id.filter(|id| self.contains(*id));
        self.selected = selected;
        selected
    }

    /// Selects the first candidate present among the options, or the
    /// placeholder if none is, and emits a change for this level either way.
    pub fn preselect(&mut self, section: SectionId, candidates: &[OptionId]) -> CascadeMessage {
        self.selected = candidates.iter().copied().find(|id| self.contains(*id));
        let value = self.selected.map(|id| id.to_string()).unwrap_or_default();
        tracing::debug!(
            section = %section,
            level = self.depth,
            value = %value,
            "preselected"
        );
        CascadeMessage::changed(section, self.depth, value)
    }
}

/// State for one chain of dependent selectors.
#[derive(Debug, Clone, Default)]
pub struct ChainState {
    /// Rendered levels, ordered by depth. At most one per depth.
    levels: Vec<Level>,
    /// Generation of the latest request issued for this chain.
    generation: u64,
    load: LoadState,
}

impl ChainState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, depth: usize) -> Option<&Level> {
        self.levels.iter().find(|level| level.depth == depth)
    }

    pub fn level_mut(&mut self, depth: usize) -> Option<&mut Level> {
        self.levels.iter_mut().find(|level| level.depth == depth)
    }

    pub fn deepest(&self) -> Option<&Level> {
        self.levels.last()
    }

    /// Ids selected from the top level down, stopping at the first placeholder.
    pub fn selection_path(&self) -> Vec<OptionId> {
        self.levels.iter().map_while(|level| level.selected).collect()
    }

    /// Removes every level whose depth is `from_level` or deeper.
    pub fn prune(&mut self, from_level: usize) {
        let before = self.levels.len();
        self.levels.retain(|level| level.depth < from_level);
        let removed = before - self.levels.len();
        if removed > 0 {
            tracing::debug!(from_level, removed, "pruned levels");
        }
    }

    /// Renders a level at `depth`, replacing whatever occupied it, and
    /// returns it for preselection.
    pub fn render(
        &mut self,
        depth: usize,
        label: impl Into<String>,
        options: Vec<OptionItem>,
    ) -> &mut Level {
        self.prune(depth);
        let level = Level::new(depth, label, options);
        tracing::debug!(
            level = depth,
            label = %level.label,
            options = level.options.len(),
            "rendered level"
        );
        self.levels.push(level);
        let last = self.levels.len() - 1;
        &mut self.levels[last]
    }

    /// Starts a new request generation and returns its token.
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn set_loading(&mut self, level: usize) {
        self.load = LoadState::Loading { level };
    }

    pub fn set_idle(&mut self) {
        self.load = LoadState::Idle;
    }

    pub fn set_error(&mut self, error: String) {
        self.load = LoadState::Error(error);
    }
}
