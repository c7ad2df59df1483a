// SPDX-License-Identifier: MPL-2.0

//! Drives both selector chains of the posting form.
//!
//! The controller never performs I/O. [`FormController::update`] consumes a
//! message, applies every change it cascades into, and returns the fetches
//! that have to run next. Their results come back as
//! [`FormMessage::Loaded`].
//!
//! Chains:
//! 1. Category: recursive. An empty child list marks the chosen category
//!    as the leaf, which is persisted and gets its property form loaded.
//! 2. Location: Location → City → Neighbourhood.

use crate::api::{AdsError, FetchRequest, ParentNode, Payload};
use crate::config::Config;
use crate::context::PageContext;
use crate::form::FormDocument;
use crate::widgets::cascade::{CascadeMessage, OptionId, OptionItem, SectionId};

/// Depth of the neighbourhood selector in the location chain.
const NEIGHBOURHOOD_LEVEL: usize = 3;

/// A fetch the controller wants run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchCommand {
    pub section: SectionId,
    /// Level whose selection the fetch belongs to; children render one deeper.
    pub level: usize,
    /// Chain generation at the time of the request.
    pub token: u64,
    pub request: FetchRequest,
}

#[derive(Debug, Clone)]
pub enum FormMessage {
    /// A selector changed, by the user or by preselection.
    Cascade(CascadeMessage),
    /// A fetch finished.
    Loaded {
        command: FetchCommand,
        result: Result<Payload, AdsError>,
    },
}

impl From<CascadeMessage> for FormMessage {
    fn from(message: CascadeMessage) -> Self {
        FormMessage::Cascade(message)
    }
}

/// State machine for the category and location chains.
#[derive(Debug, Clone)]
pub struct FormController {
    config: Config,
    context: PageContext,
    form: FormDocument,
}

impl FormController {
    pub fn new(config: Config, context: PageContext, form: FormDocument) -> Self {
        Self {
            config,
            context,
            form,
        }
    }

    pub fn form(&self) -> &FormDocument {
        &self.form
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Requests the top-level categories and the root locations.
    pub fn start(&mut self) -> Vec<FetchCommand> {
        let mut commands = Vec::with_capacity(2);
        for section in [SectionId::Category, SectionId::Location] {
            self.clear_below(section, 0);
            commands.extend(self.request_children(section, ParentNode::Root, 0));
        }
        commands
    }

    /// Handles one level transition: sets the selector at `level` to
    /// `chosen`, prunes everything beneath it, clears the chain's persisted
    /// field and requests the children of `chosen`.
    ///
    /// Nothing is requested when `chosen` is `None` or not an option at
    /// `level`; the selector falls back to the placeholder. A `level` with
    /// no rendered selector is ignored. Re-selecting the current value goes
    /// through the same steps.
    pub fn advance(
        &mut self,
        section: SectionId,
        chosen: Option<OptionId>,
        level: usize,
    ) -> Option<FetchCommand> {
        let Some(selector) = self.form.chain_mut(section).level_mut(level) else {
            tracing::debug!(%section, level, "change on a removed level ignored");
            return None;
        };
        let chosen = selector.select(chosen);

        self.clear_below(section, level);

        let Some(chosen) = chosen else {
            self.form.chain_mut(section).set_idle();
            return None;
        };

        if section == SectionId::Location && level >= NEIGHBOURHOOD_LEVEL {
            self.form.neighbourhood_field = Some(chosen);
            return None;
        }

        self.request_children(section, ParentNode::Node(chosen), level)
    }

    /// Processes `message` and every change it cascades into.
    pub fn update(&mut self, message: FormMessage) -> Vec<FetchCommand> {
        let mut commands = Vec::new();
        let mut next = Some(message);

        while let Some(message) = next.take() {
            match message {
                FormMessage::Cascade(CascadeMessage::Changed {
                    section,
                    level,
                    value,
                }) => {
                    commands.extend(self.advance(section, OptionId::parse(&value), level));
                }
                FormMessage::Loaded { command, result } => {
                    next = self
                        .on_loaded(command, result, &mut commands)
                        .map(FormMessage::Cascade);
                }
            }
        }

        commands
    }

    fn clear_below(&mut self, section: SectionId, level: usize) {
        let chain = self.form.chain_mut(section);
        chain.prune(level + 1);
        // Any response still in flight for this chain is now stale.
        chain.next_generation();

        match section {
            SectionId::Category => {
                self.form.category_field = None;
                self.form.property_html.clear();
            }
            SectionId::Location => {
                self.form.neighbourhood_field = None;
            }
        }
    }

    fn request_children(
        &mut self,
        section: SectionId,
        parent: ParentNode,
        level: usize,
    ) -> Option<FetchCommand> {
        let request = match (section, parent) {
            (SectionId::Category, parent) => FetchRequest::CategoryChildren { parent },
            (SectionId::Location, ParentNode::Root) => FetchRequest::Locations,
            (SectionId::Location, ParentNode::Node(location)) if level == 1 => {
                FetchRequest::Cities { location }
            }
            (SectionId::Location, ParentNode::Node(city)) if level == 2 => {
                FetchRequest::Neighbourhoods { city }
            }
            (SectionId::Location, ParentNode::Node(_)) => return None,
        };
        Some(self.issue(section, level, request))
    }

    fn issue(&mut self, section: SectionId, level: usize, request: FetchRequest) -> FetchCommand {
        let chain = self.form.chain_mut(section);
        chain.set_loading(level);
        let command = FetchCommand {
            section,
            level,
            token: chain.generation(),
            request,
        };
        tracing::debug!(
            %section,
            level,
            token = command.token,
            url = %request.path(),
            "requesting"
        );
        command
    }

    fn on_loaded(
        &mut self,
        command: FetchCommand,
        result: Result<Payload, AdsError>,
        commands: &mut Vec<FetchCommand>,
    ) -> Option<CascadeMessage> {
        let section = command.section;
        let chain = self.form.chain_mut(section);

        if command.token != chain.generation() {
            if self.config.discard_stale_responses {
                tracing::debug!(
                    %section,
                    level = command.level,
                    token = command.token,
                    current = chain.generation(),
                    "dropping stale response"
                );
                return None;
            }
            tracing::debug!(%section, level = command.level, "applying stale response");
        }

        match result {
            Err(error) => {
                tracing::warn!(
                    %section,
                    level = command.level,
                    url = %command.request.path(),
                    %error,
                    "failed to load data"
                );
                chain.set_error(error.to_string());
                None
            }
            Ok(Payload::Html(html)) => {
                chain.set_idle();
                self.form.property_html = html;
                None
            }
            Ok(Payload::Items(items)) => {
                chain.set_idle();
                match section {
                    SectionId::Category => self.on_category_children(command, items, commands),
                    SectionId::Location => self.on_location_children(command, items),
                }
            }
        }
    }

    fn on_category_children(
        &mut self,
        command: FetchCommand,
        items: Vec<OptionItem>,
        commands: &mut Vec<FetchCommand>,
    ) -> Option<CascadeMessage> {
        if items.is_empty() {
            if let FetchRequest::CategoryChildren {
                parent: ParentNode::Node(leaf),
            } = command.request
            {
                self.on_leaf(leaf, command.level, commands);
            }
            return None;
        }

        let label = self.config.category_level_label(command.level);
        let candidates = self.context.category_candidates();
        self.render(SectionId::Category, command.level + 1, label, items, &candidates)
    }

    fn on_leaf(&mut self, leaf: OptionId, level: usize, commands: &mut Vec<FetchCommand>) {
        tracing::debug!(category = %leaf, "leaf category chosen");
        self.form.category_field = Some(leaf);

        if let Some(anchor) = self.form.ad_anchor {
            commands.push(self.issue(
                SectionId::Category,
                level,
                FetchRequest::CategoryProperties {
                    category: leaf,
                    ad: anchor.ad_id,
                },
            ));
        }
    }

    fn on_location_children(
        &mut self,
        command: FetchCommand,
        items: Vec<OptionItem>,
    ) -> Option<CascadeMessage> {
        let depth = command.level + 1;
        let label = self.config.location_level_label(depth)?.to_string();

        // An empty city list still gets a selector; an empty neighbourhood list does not.
        if items.is_empty() && depth == NEIGHBOURHOOD_LEVEL {
            return None;
        }

        let candidates = self.context.location_candidates(depth);
        self.render(SectionId::Location, depth, label, items, &candidates)
    }

    fn render(
        &mut self,
        section: SectionId,
        depth: usize,
        label: String,
        items: Vec<OptionItem>,
        candidates: &[OptionId],
    ) -> Option<CascadeMessage> {
        let level = self.form.chain_mut(section).render(depth, label, items);
        if candidates.is_empty() {
            return None;
        }
        Some(level.preselect(section, candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::cascade::LoadState;

    fn id(raw: u64) -> OptionId {
        OptionId::new(raw).unwrap()
    }

    fn items(ids: &[u64]) -> Vec<OptionItem> {
        ids.iter()
            .map(|id| OptionItem::new(*id, format!("Node {id}")).unwrap())
            .collect()
    }

    fn controller(context: PageContext, form: FormDocument) -> FormController {
        FormController::new(Config::default(), context, form)
    }

    fn load(ctl: &mut FormController, command: FetchCommand, ids: &[u64]) -> Vec<FetchCommand> {
        ctl.update(FormMessage::Loaded {
            command,
            result: Ok(Payload::Items(items(ids))),
        })
    }

    fn change(
        ctl: &mut FormController,
        section: SectionId,
        level: usize,
        value: &str,
    ) -> Vec<FetchCommand> {
        ctl.update(CascadeMessage::changed(section, level, value).into())
    }

    fn single(commands: Vec<FetchCommand>) -> FetchCommand {
        assert_eq!(commands.len(), 1, "expected one command, got {commands:?}");
        commands[0]
    }

    fn option_ids(ctl: &FormController, section: SectionId, depth: usize) -> Vec<u64> {
        ctl.form()
            .chain(section)
            .level(depth)
            .unwrap()
            .options
            .iter()
            .map(|o| o.id.get())
            .collect()
    }

    fn depths(ctl: &FormController, section: SectionId) -> Vec<usize> {
        ctl.form().chain(section).levels().iter().map(|l| l.depth).collect()
    }

    /// Starts the form and loads `roots` as the top-level categories.
    fn with_category_roots(ctl: &mut FormController, roots: &[u64]) -> Vec<FetchCommand> {
        let commands = ctl.start();
        load(ctl, commands[0], roots)
    }

    #[test]
    fn test_start_requests_both_roots() {
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        let commands = ctl.start();

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].section, SectionId::Category);
        assert_eq!(commands[0].level, 0);
        assert_eq!(
            commands[0].request,
            FetchRequest::CategoryChildren { parent: ParentNode::Root }
        );
        assert_eq!(commands[1].section, SectionId::Location);
        assert_eq!(commands[1].request, FetchRequest::Locations);
        assert!(ctl.form().chain(SectionId::Category).load_state().is_loading());
    }

    #[test]
    fn test_children_render_one_level_down_in_order() {
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        let after_roots = with_category_roots(&mut ctl, &[20, 10]);
        assert!(after_roots.is_empty());
        assert_eq!(option_ids(&ctl, SectionId::Category, 1), vec![20, 10]);

        let cmd = single(change(&mut ctl, SectionId::Category, 1, "20"));
        assert_eq!(
            cmd.request,
            FetchRequest::CategoryChildren { parent: ParentNode::Node(id(20)) }
        );
        assert!(load(&mut ctl, cmd, &[7, 3, 5]).is_empty());

        assert_eq!(depths(&ctl, SectionId::Category), vec![1, 2]);
        let level = ctl.form().chain(SectionId::Category).level(2).unwrap();
        assert_eq!(level.label, "Category: 1");
        assert_eq!(level.selected, None);
        assert_eq!(option_ids(&ctl, SectionId::Category, 2), vec![7, 3, 5]);
    }

    #[test]
    fn test_change_prunes_before_fetch_resolves() {
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        with_category_roots(&mut ctl, &[1, 2]);
        let cmd = single(change(&mut ctl, SectionId::Category, 1, "1"));
        load(&mut ctl, cmd, &[11, 12]);
        let cmd = single(change(&mut ctl, SectionId::Category, 2, "11"));
        load(&mut ctl, cmd, &[111]);
        assert_eq!(depths(&ctl, SectionId::Category), vec![1, 2, 3]);

        let pending = single(change(&mut ctl, SectionId::Category, 1, "2"));
        assert_eq!(depths(&ctl, SectionId::Category), vec![1]);
        assert_eq!(pending.level, 1);
    }

    #[test]
    fn test_reselecting_same_value_refetches() {
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        with_category_roots(&mut ctl, &[1, 2]);
        let first = single(change(&mut ctl, SectionId::Category, 1, "1"));
        load(&mut ctl, first, &[11]);

        let second = single(change(&mut ctl, SectionId::Category, 1, "1"));
        assert_eq!(second.request, first.request);
        assert!(second.token > first.token);
        assert_eq!(depths(&ctl, SectionId::Category), vec![1]);
    }

    #[test]
    fn test_leaf_persists_category_and_loads_properties() {
        let mut ctl = controller(PageContext::empty(), FormDocument::for_ad(Some(7)));
        with_category_roots(&mut ctl, &[1, 2]);
        let cmd = single(change(&mut ctl, SectionId::Category, 1, "2"));

        let props = single(load(&mut ctl, cmd, &[]));
        assert_eq!(depths(&ctl, SectionId::Category), vec![1]);
        assert_eq!(ctl.form().category_field, Some(id(2)));
        assert_eq!(
            props.request,
            FetchRequest::CategoryProperties { category: id(2), ad: Some(7) }
        );

        ctl.update(FormMessage::Loaded {
            command: props,
            result: Ok(Payload::Html("<p>Mileage</p>".to_string())),
        });
        assert_eq!(ctl.form().property_html, "<p>Mileage</p>");

        // Moving away from the leaf clears both.
        change(&mut ctl, SectionId::Category, 1, "1");
        assert_eq!(ctl.form().category_field, None);
        assert!(ctl.form().property_html.is_empty());
    }

    #[test]
    fn test_leaf_without_ad_anchor_skips_properties() {
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        with_category_roots(&mut ctl, &[1]);
        let cmd = single(change(&mut ctl, SectionId::Category, 1, "1"));

        assert!(load(&mut ctl, cmd, &[]).is_empty());
        assert_eq!(ctl.form().category_field, Some(id(1)));
    }

    #[test]
    fn test_placeholder_stops_the_chain() {
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        with_category_roots(&mut ctl, &[1]);
        let cmd = single(change(&mut ctl, SectionId::Category, 1, "1"));
        load(&mut ctl, cmd, &[]);
        assert_eq!(ctl.form().category_field, Some(id(1)));

        assert!(change(&mut ctl, SectionId::Category, 1, "").is_empty());
        assert_eq!(ctl.form().category_field, None);
        assert!(!ctl.form().chain(SectionId::Category).load_state().is_loading());
    }

    #[test]
    fn test_saved_category_path_expands() {
        let context =
            PageContext::from_json(r#"{"category_hierarchy": [{"id": 10}, {"id": 55}]}"#).unwrap();
        let mut ctl = controller(context, FormDocument::for_ad(Some(3)));

        let cmd = single(with_category_roots(&mut ctl, &[5, 10]));
        assert_eq!(
            cmd.request,
            FetchRequest::CategoryChildren { parent: ParentNode::Node(id(10)) }
        );

        let cmd = single(load(&mut ctl, cmd, &[54, 55]));
        assert_eq!(
            cmd.request,
            FetchRequest::CategoryChildren { parent: ParentNode::Node(id(55)) }
        );

        let props = single(load(&mut ctl, cmd, &[]));
        assert_eq!(
            props.request,
            FetchRequest::CategoryProperties { category: id(55), ad: Some(3) }
        );
        assert_eq!(ctl.form().chain(SectionId::Category).selection_path(), vec![id(10), id(55)]);
        assert_eq!(ctl.form().category_field, Some(id(55)));
    }

    #[test]
    fn test_unmatched_preselection_leaves_placeholder() {
        let context = PageContext::from_json(r#"{"category_hierarchy": [{"id": 99}]}"#).unwrap();
        let mut ctl = controller(context, FormDocument::new());

        assert!(with_category_roots(&mut ctl, &[1, 2]).is_empty());
        let chain = ctl.form().chain(SectionId::Category);
        assert_eq!(chain.level(1).unwrap().selected, None);
        // `start` is generation 1; the emitted placeholder change is generation 2.
        assert_eq!(chain.generation(), 2);
        assert_eq!(depths(&ctl, SectionId::Category), vec![1]);

        // Without candidates nothing is emitted and the generation stays put.
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        assert!(with_category_roots(&mut ctl, &[1, 2]).is_empty());
        assert_eq!(ctl.form().chain(SectionId::Category).generation(), 1);
    }

    #[test]
    fn test_advance_with_unknown_id_stops() {
        let mut ctl = controller(PageContext::empty(), FormDocument::for_ad(Some(3)));
        with_category_roots(&mut ctl, &[1, 2]);
        assert_eq!(change(&mut ctl, SectionId::Category, 1, "2").len(), 1);

        assert_eq!(ctl.advance(SectionId::Category, Some(id(999)), 1), None);
        let chain = ctl.form().chain(SectionId::Category);
        assert_eq!(chain.level(1).unwrap().selected, None);
        assert_eq!(depths(&ctl, SectionId::Category), vec![1]);
        assert_eq!(chain.load_state(), &LoadState::Idle);
        assert_eq!(ctl.form().category_field, None);

        // A level that was never rendered is ignored.
        assert_eq!(ctl.advance(SectionId::Category, Some(id(1)), 4), None);
        assert_eq!(depths(&ctl, SectionId::Category), vec![1]);
    }

    #[test]
    fn test_saved_location_expands_to_neighbourhood_placeholder() {
        let context = PageContext::from_json(
            r#"{"location_hierarchy": {"location": {"id": 1}, "city": {"id": 4}}}"#,
        )
        .unwrap();
        let mut ctl = controller(context, FormDocument::new());
        let locations = ctl.start()[1];

        let cities = single(load(&mut ctl, locations, &[1, 2]));
        assert_eq!(cities.request, FetchRequest::Cities { location: id(1) });
        let neighbourhoods = single(load(&mut ctl, cities, &[3, 4]));
        assert_eq!(neighbourhoods.request, FetchRequest::Neighbourhoods { city: id(4) });
        assert!(load(&mut ctl, neighbourhoods, &[8, 9]).is_empty());

        let chain = ctl.form().chain(SectionId::Location);
        let labels: Vec<&str> = chain.levels().iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Location", "City", "Neighbourhood"]);
        assert_eq!(chain.selection_path(), vec![id(1), id(4)]);
        assert_eq!(chain.level(3).unwrap().selected, None);
        assert_eq!(ctl.form().neighbourhood_field, None);
    }

    #[test]
    fn test_empty_cities_still_render() {
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        let locations = ctl.start()[1];
        load(&mut ctl, locations, &[1]);
        let cities = single(change(&mut ctl, SectionId::Location, 1, "1"));

        load(&mut ctl, cities, &[]);
        assert_eq!(depths(&ctl, SectionId::Location), vec![1, 2]);
        assert!(ctl.form().chain(SectionId::Location).level(2).unwrap().options.is_empty());
    }

    #[test]
    fn test_empty_neighbourhoods_do_not_render() {
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        let locations = ctl.start()[1];
        load(&mut ctl, locations, &[1]);
        let cities = single(change(&mut ctl, SectionId::Location, 1, "1"));
        load(&mut ctl, cities, &[4]);
        let neighbourhoods = single(change(&mut ctl, SectionId::Location, 2, "4"));

        load(&mut ctl, neighbourhoods, &[]);
        assert_eq!(depths(&ctl, SectionId::Location), vec![1, 2]);
    }

    #[test]
    fn test_neighbourhood_field_follows_selection_and_clears() {
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        let locations = ctl.start()[1];
        load(&mut ctl, locations, &[1]);
        let cities = single(change(&mut ctl, SectionId::Location, 1, "1"));
        load(&mut ctl, cities, &[4]);
        let neighbourhoods = single(change(&mut ctl, SectionId::Location, 2, "4"));
        load(&mut ctl, neighbourhoods, &[8, 9]);

        assert!(change(&mut ctl, SectionId::Location, 3, "9").is_empty());
        assert_eq!(ctl.form().neighbourhood_field, Some(id(9)));
        change(&mut ctl, SectionId::Location, 3, "");
        assert_eq!(ctl.form().neighbourhood_field, None);

        change(&mut ctl, SectionId::Location, 3, "8");
        change(&mut ctl, SectionId::Location, 2, "4");
        assert_eq!(ctl.form().neighbourhood_field, None);

        ctl.form.neighbourhood_field = Some(id(8));
        change(&mut ctl, SectionId::Location, 1, "");
        assert_eq!(ctl.form().neighbourhood_field, None);
        assert_eq!(depths(&ctl, SectionId::Location), vec![1]);
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        with_category_roots(&mut ctl, &[1, 2]);
        let slow = single(change(&mut ctl, SectionId::Category, 1, "1"));
        let fast = single(change(&mut ctl, SectionId::Category, 1, "2"));

        load(&mut ctl, fast, &[21, 22]);
        load(&mut ctl, slow, &[11, 12]);

        assert_eq!(option_ids(&ctl, SectionId::Category, 2), vec![21, 22]);
    }

    #[test]
    fn test_stale_response_applies_when_guard_disabled() {
        let config = Config {
            discard_stale_responses: false,
            ..Config::default()
        };
        let mut ctl = FormController::new(config, PageContext::empty(), FormDocument::new());
        with_category_roots(&mut ctl, &[1, 2]);
        let slow = single(change(&mut ctl, SectionId::Category, 1, "1"));
        let fast = single(change(&mut ctl, SectionId::Category, 1, "2"));

        load(&mut ctl, fast, &[21, 22]);
        load(&mut ctl, slow, &[11, 12]);

        assert_eq!(option_ids(&ctl, SectionId::Category, 2), vec![11, 12]);
    }

    #[test]
    fn test_failure_leaves_chain_pruned() {
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        with_category_roots(&mut ctl, &[1]);
        let cmd = single(change(&mut ctl, SectionId::Category, 1, "1"));
        load(&mut ctl, cmd, &[11]);
        let cmd = single(change(&mut ctl, SectionId::Category, 1, "1"));

        let commands = ctl.update(FormMessage::Loaded {
            command: cmd,
            result: Err(AdsError::InvalidResponse("expected value".to_string())),
        });

        assert!(commands.is_empty());
        assert_eq!(depths(&ctl, SectionId::Category), vec![1]);
        assert!(ctl.form().chain(SectionId::Category).load_state().error().is_some());
    }

    #[test]
    fn test_change_on_removed_level_is_ignored() {
        let mut ctl = controller(PageContext::empty(), FormDocument::new());
        with_category_roots(&mut ctl, &[1]);
        assert!(change(&mut ctl, SectionId::Category, 4, "1").is_empty());
        assert_eq!(depths(&ctl, SectionId::Category), vec![1]);
    }
}
