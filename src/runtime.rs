// SPDX-License-Identifier: MPL-2.0

//! Async executor for the form controller.
//!
//! Fetches run concurrently and their results are applied in completion
//! order, one at a time. The form stays usable while requests are in
//! flight: [`FormRuntime::select`] can be called between steps.

use crate::api::OptionSource;
use crate::driver::{FetchCommand, FormController, FormMessage};
use crate::form::FormDocument;
use crate::widgets::cascade::{CascadeMessage, SectionId};
use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;
use std::sync::Arc;

pub struct FormRuntime<S> {
    controller: FormController,
    source: Arc<S>,
    in_flight: FuturesUnordered<BoxFuture<'static, FormMessage>>,
}

impl<S: OptionSource + 'static> FormRuntime<S> {
    pub fn new(controller: FormController, source: Arc<S>) -> Self {
        Self {
            controller,
            source,
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn form(&self) -> &FormDocument {
        self.controller.form()
    }

    /// Number of fetches not yet applied.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Issues the initial requests of both chains.
    pub fn start(&mut self) {
        let commands = self.controller.start();
        self.spawn(commands);
    }

    /// Applies a user change to the selector at `level`.
    pub fn select(&mut self, section: SectionId, level: usize, value: &str) {
        let commands = self
            .controller
            .update(CascadeMessage::changed(section, level, value).into());
        self.spawn(commands);
    }

    /// Waits for the next fetch to finish and applies it.
    ///
    /// Returns `false` once nothing is in flight.
    pub async fn step(&mut self) -> bool {
        let Some(message) = self.in_flight.next().await else {
            return false;
        };
        let commands = self.controller.update(message);
        self.spawn(commands);
        true
    }

    /// Applies results until every chain is quiet.
    pub async fn run_until_idle(&mut self) {
        while self.step().await {}
    }

    fn spawn(&mut self, commands: Vec<FetchCommand>) {
        for command in commands {
            let source = Arc::clone(&self.source);
            self.in_flight.push(
                async move {
                    let result = source.fetch(command.request).await;
                    FormMessage::Loaded { command, result }
                }
                .boxed(),
            );
        }
    }
}
