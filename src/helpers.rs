// SPDX-License-Identifier: MPL-2.0

//! Async helper functions for the form binary.
//! These functions wire the HTTP client to the form controller.

use crate::api::{AdsClient, AdsError};
use crate::config::Config;
use crate::context::PageContext;
use crate::driver::FormController;
use crate::form::FormDocument;
use crate::runtime::FormRuntime;
use std::sync::Arc;

/// Helper to create a client from the config
pub fn create_client(config: &Config) -> Result<AdsClient, AdsError> {
    AdsClient::new(&config.base_url, config.request_timeout())
}

/// Build a runtime for a create form (`ad_id = None`) or an edit form
pub fn build_runtime(
    config: Config,
    context: PageContext,
    ad_id: Option<u64>,
) -> Result<FormRuntime<AdsClient>, AdsError> {
    let client = create_client(&config)?;
    let form = match ad_id {
        Some(id) => FormDocument::for_ad(Some(id)),
        None => FormDocument::new(),
    };
    let controller = FormController::new(config, context, form);
    Ok(FormRuntime::new(controller, Arc::new(client)))
}

/// Start both chains and wait until every saved selection is restored
pub async fn load_form(
    config: Config,
    context: PageContext,
    ad_id: Option<u64>,
) -> Result<FormRuntime<AdsClient>, AdsError> {
    let mut runtime = build_runtime(config, context, ad_id)?;
    runtime.start();
    runtime.run_until_idle().await;
    Ok(runtime)
}
