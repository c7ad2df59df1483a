// SPDX-License-Identifier: MPL-2.0

//! Widgets for the ad posting form.

pub mod cascade;

pub use cascade::{
    CascadeMessage, CascadeSelect, ChainState, Level, LoadState, OptionId, OptionItem, SectionId,
};
