// SPDX-License-Identifier: MPL-2.0

//! Cascading category and location selectors for the ad posting form.
//!
//! Choosing a category reveals its subcategories, to any depth, until a
//! leaf is reached and its property form is loaded. Choosing a location
//! reveals its cities, then a city's neighbourhoods. On edit forms the
//! saved selections are restored from the page context.
//!
//! - [`driver::FormController`]: the state machine for both chains
//! - [`runtime::FormRuntime`]: runs the controller's fetches concurrently
//! - [`api::AdsClient`]: HTTP client for the option endpoints
//! - [`widgets::cascade`]: levels, pruning, preselection and markup

pub mod api;
pub mod config;
pub mod context;
pub mod driver;
pub mod form;
pub mod helpers;
pub mod runtime;
pub mod widgets;

pub use api::{AdsClient, AdsError, AdsResult, FetchRequest, OptionSource, ParentNode, Payload};
pub use config::Config;
pub use context::PageContext;
pub use driver::{FetchCommand, FormController, FormMessage};
pub use form::FormDocument;
pub use runtime::FormRuntime;
