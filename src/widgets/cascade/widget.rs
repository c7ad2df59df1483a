// SPDX-License-Identifier: MPL-2.0

//! Markup rendering for a chain of selectors.

use super::state::{ChainState, Level, SectionId};
use std::fmt::Write;

/// Builder for a section's selector markup.
///
/// # Example
///
/// ```ignore
/// let html = CascadeSelect::new(SectionId::Category, &chain)
///     .placeholder("---------")
///     .to_html();
/// ```
pub struct CascadeSelect<'a> {
    section: SectionId,
    chain: &'a ChainState,
    placeholder: &'a str,
}

impl<'a> CascadeSelect<'a> {
    pub fn new(section: SectionId, chain: &'a ChainState) -> Self {
        Self {
            section,
            chain,
            placeholder: "---------",
        }
    }

    /// Sets the text of the "unselected" option.
    pub fn placeholder(mut self, text: &'a str) -> Self {
        self.placeholder = text;
        self
    }

    fn write_level(&self, out: &mut String, level: &Level) {
        let _ = write!(
            out,
            "<p data-level=\"{}\"><label>{}</label><select class=\"form-control\">",
            level.depth,
            escape(&level.label)
        );
        write_option(out, "", self.placeholder, false);
        for option in &level.options {
            write_option(
                out,
                &option.value(),
                &option.name,
                level.selected == Some(option.id),
            );
        }
        out.push_str("</select></p>");
    }

    /// Renders the section container with one paragraph per level.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "<div id=\"{}\">", self.section.as_str());
        for level in self.chain.levels() {
            self.write_level(&mut out, level);
        }
        out.push_str("</div>");
        out
    }
}

fn write_option(out: &mut String, value: &str, text: &str, selected: bool) {
    let _ = write!(
        out,
        "<option value=\"{}\"{}>{}</option>",
        escape(value),
        if selected { " selected" } else { "" },
        escape(text)
    );
}

/// Escapes text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
