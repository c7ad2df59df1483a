// SPDX-License-Identifier: MPL-2.0

//! The parts of the posting form the selectors write to.

use crate::widgets::cascade::{CascadeSelect, ChainState, OptionId, SectionId, escape};
use std::fmt::Write;

pub const CATEGORY_FIELD_ID: &str = "id_category";
pub const NEIGHBOURHOOD_FIELD_ID: &str = "id_neighbourhood";
pub const AD_ANCHOR_ID: &str = "id_ad";
pub const PROPERTY_CONTAINER_ID: &str = "property-container";

/// The `id_ad` element present on edit forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdAnchor {
    /// Value of `data-ad-id`, if set.
    pub ad_id: Option<u64>,
}

/// Both selector sections plus the hidden fields that are submitted.
#[derive(Debug, Clone, Default)]
pub struct FormDocument {
    category: ChainState,
    location: ChainState,
    /// Hidden `id_category`; holds the chosen leaf.
    pub category_field: Option<OptionId>,
    /// Hidden `id_neighbourhood`.
    pub neighbourhood_field: Option<OptionId>,
    pub ad_anchor: Option<AdAnchor>,
    /// Markup injected into `property-container`.
    pub property_html: String,
}

impl FormDocument {
    /// A create form: no `id_ad` element.
    pub fn new() -> Self {
        Self::default()
    }

    /// An edit form for the given ad.
    pub fn for_ad(ad_id: Option<u64>) -> Self {
        Self {
            ad_anchor: Some(AdAnchor { ad_id }),
            ..Self::default()
        }
    }

    pub fn chain(&self, section: SectionId) -> &ChainState {
        match section {
            SectionId::Category => &self.category,
            SectionId::Location => &self.location,
        }
    }

    pub fn chain_mut(&mut self, section: SectionId) -> &mut ChainState {
        match section {
            SectionId::Category => &mut self.category,
            SectionId::Location => &mut self.location,
        }
    }

    /// Renders both sections, the hidden fields and the property container.
    pub fn to_html(&self, placeholder: &str) -> String {
        let mut out = String::new();
        for section in [SectionId::Category, SectionId::Location] {
            out.push_str(
                &CascadeSelect::new(section, self.chain(section))
                    .placeholder(placeholder)
                    .to_html(),
            );
        }
        write_hidden(&mut out, CATEGORY_FIELD_ID, "category", self.category_field);
        write_hidden(
            &mut out,
            NEIGHBOURHOOD_FIELD_ID,
            "neighbourhood",
            self.neighbourhood_field,
        );
        if let Some(anchor) = self.ad_anchor {
            let _ = write!(
                out,
                "<span id=\"{}\" data-ad-id=\"{}\"></span>",
                AD_ANCHOR_ID,
                anchor.ad_id.map(|id| id.to_string()).unwrap_or_default()
            );
        }
        // Property markup comes from the server as-is.
        let _ = write!(
            out,
            "<div id=\"{}\">{}</div>",
            PROPERTY_CONTAINER_ID, self.property_html
        );
        out
    }
}

fn write_hidden(out: &mut String, id: &str, name: &str, value: Option<OptionId>) {
    let value = value.map(|id| id.to_string()).unwrap_or_default();
    let _ = write!(
        out,
        "<input type=\"hidden\" name=\"{}\" id=\"{}\" value=\"{}\">",
        escape(name),
        id,
        escape(&value)
    );
}
