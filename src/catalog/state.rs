//! Catalog view state machine
//!
//! `ViewState` owns what the list view shows and decides, per event, whether
//! to reset or append and whether a fetch is needed. Fetching happens
//! outside: `begin` hands back a `FetchTicket`, and the caller reports the
//! outcome through `complete`.
//!
//! Every ticket carries the generation current when it was issued. A result
//! whose generation is no longer current is discarded, so a slow page
//! request cannot overwrite a category selected after it.

use pokedex_types::{Category, EntityRef};

use crate::error::Result;

/// User input driving the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    SelectCategory(Category),
    ClearCategory,
    LoadMore,
    ToggleFavoritesOnly,
}

/// How a fetched page merges into the loaded list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    Replace,
    Append,
}

/// A fetch the caller must perform, stamped with the generation it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub cursor: usize,
    pub page_size: usize,
    pub category: Option<Category>,
    pub mode: MergeMode,
}

/// Immediate effect of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// State changed and a fetch must run
    Fetch(FetchTicket),
    /// State changed; nothing to fetch
    Updated,
    /// Event not valid in the current state
    Ignored(&'static str),
}

/// Effect of reporting a fetch result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied { received: usize },
    /// Fetch failed; previous list restored
    Failed,
    /// A newer request superseded this one; nothing changed
    Stale,
}

/// Last settled state, restored when a fetch fails
#[derive(Debug, Clone)]
struct Settled {
    entities: Vec<EntityRef>,
    cursor: usize,
    category: Option<Category>,
    has_more: bool,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    loaded_entities: Vec<EntityRef>,
    cursor: usize,
    active_category: Option<Category>,
    favorites_only: bool,
    loading: bool,
    page_size: usize,
    generation: u64,
    has_more: bool,
    last_error: Option<String>,
    settled: Option<Settled>,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            loaded_entities: vec![],
            cursor: 0,
            active_category: None,
            favorites_only: false,
            loading: false,
            page_size,
            generation: 0,
            has_more: true,
            last_error: None,
            settled: None,
        }
    }

    /// The implicit first-page fetch issued when the view mounts
    pub fn begin_initial(&mut self) -> FetchTicket {
        self.reset_to(None)
    }

    pub fn begin(&mut self, event: ViewEvent) -> Transition {
        match event {
            ViewEvent::SelectCategory(category) => Transition::Fetch(self.reset_to(Some(category))),
            ViewEvent::ClearCategory => Transition::Fetch(self.reset_to(None)),
            ViewEvent::LoadMore => self.load_more(),
            ViewEvent::ToggleFavoritesOnly => {
                self.favorites_only = !self.favorites_only;
                Transition::Updated
            }
        }
    }

    /// Apply a fetch result if `ticket` is still the current request
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<Vec<EntityRef>>) -> Completion {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale catalog response"
            );
            return Completion::Stale;
        }

        self.loading = false;
        match result {
            Ok(refs) => {
                let received = refs.len();
                match ticket.mode {
                    MergeMode::Replace => self.loaded_entities = refs,
                    MergeMode::Append => self.loaded_entities.extend(refs),
                }
                self.has_more = ticket.category.is_none() && received >= ticket.page_size;
                self.last_error = None;
                self.settled = None;
                Completion::Applied { received }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    cursor = ticket.cursor,
                    category = ?ticket.category,
                    "Catalog fetch failed; keeping previous list"
                );
                if let Some(settled) = self.settled.take() {
                    self.loaded_entities = settled.entities;
                    self.cursor = settled.cursor;
                    self.active_category = settled.category;
                    self.has_more = settled.has_more;
                }
                self.last_error = Some(e.to_string());
                Completion::Failed
            }
        }
    }

    fn reset_to(&mut self, category: Option<Category>) -> FetchTicket {
        self.remember_settled();
        self.active_category = category;
        self.cursor = 0;
        self.loaded_entities.clear();
        self.has_more = true;
        self.issue(MergeMode::Replace)
    }

    fn load_more(&mut self) -> Transition {
        if self.active_category.is_some() {
            return Transition::Ignored("category listings are not paged");
        }
        if self.favorites_only {
            return Transition::Ignored("paging is disabled while showing favorites");
        }
        if self.loading {
            return Transition::Ignored("a fetch is already in flight");
        }
        if !self.has_more {
            return Transition::Ignored("end of catalog reached");
        }

        self.remember_settled();
        self.cursor += self.page_size;
        Transition::Fetch(self.issue(MergeMode::Append))
    }

    /// Snapshot only when nothing is pending, so a failure after several
    /// superseded requests still restores the last applied state
    fn remember_settled(&mut self) {
        if self.settled.is_none() {
            self.settled = Some(Settled {
                entities: self.loaded_entities.clone(),
                cursor: self.cursor,
                category: self.active_category,
                has_more: self.has_more,
            });
        }
    }

    fn issue(&mut self, mode: MergeMode) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket {
            generation: self.generation,
            cursor: self.cursor,
            page_size: self.page_size,
            category: self.active_category,
            mode,
        }
    }

    pub fn loaded_entities(&self) -> &[EntityRef] {
        &self.loaded_entities
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn active_category(&self) -> Option<Category> {
        self.active_category
    }

    pub fn favorites_only(&self) -> bool {
        self.favorites_only
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `LoadMore` can fetch another page
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;

    fn refs(ids: std::ops::RangeInclusive<u32>) -> Vec<EntityRef> {
        ids.map(|id| {
            EntityRef::new(
                format!("entity-{}", id),
                format!("https://pokeapi.co/api/v2/pokemon/{}/", id),
            )
        })
        .collect()
    }

    fn ticket_of(transition: Transition) -> FetchTicket {
        match transition {
            Transition::Fetch(ticket) => ticket,
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    fn loaded(page_size: usize) -> ViewState {
        let mut state = ViewState::new(page_size);
        let ticket = state.begin_initial();
        state.complete(ticket, Ok(refs(1..=page_size as u32)));
        state
    }

    #[test]
    fn test_initial_state() {
        let mut state = ViewState::new(20);
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.active_category(), None);
        assert!(!state.favorites_only());
        assert!(state.loaded_entities().is_empty());

        let ticket = state.begin_initial();
        assert_eq!(ticket.cursor, 0);
        assert_eq!(ticket.category, None);
        assert_eq!(ticket.mode, MergeMode::Replace);
        assert!(state.is_loading());
    }

    #[test]
    fn test_load_more_appends() {
        let mut state = loaded(20);
        let ticket = ticket_of(state.begin(ViewEvent::LoadMore));
        assert_eq!(ticket.cursor, 20);
        assert_eq!(ticket.mode, MergeMode::Append);

        let completion = state.complete(ticket, Ok(refs(21..=40)));
        assert_eq!(completion, Completion::Applied { received: 20 });
        assert_eq!(state.loaded_entities().len(), 40);
        assert_eq!(state.loaded_entities()[20].id(), Some(21));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_select_category_resets_cursor_and_replaces() {
        let mut state = loaded(20);
        let more = ticket_of(state.begin(ViewEvent::LoadMore));
        state.complete(more, Ok(refs(21..=40)));

        let ticket = ticket_of(state.begin(ViewEvent::SelectCategory(Category::Fire)));
        assert_eq!(state.cursor(), 0);
        assert!(state.loaded_entities().is_empty());
        assert_eq!(ticket.category, Some(Category::Fire));

        state.complete(ticket, Ok(refs(4..=6)));
        assert_eq!(state.loaded_entities().len(), 3);
        assert!(!state.has_more());
    }

    #[test]
    fn test_load_more_ignored_under_category_or_favorites() {
        let mut state = loaded(20);
        let ticket = ticket_of(state.begin(ViewEvent::SelectCategory(Category::Water)));
        state.complete(ticket, Ok(refs(7..=9)));
        assert!(matches!(state.begin(ViewEvent::LoadMore), Transition::Ignored(_)));

        let ticket = ticket_of(state.begin(ViewEvent::ClearCategory));
        state.complete(ticket, Ok(refs(1..=20)));
        assert_eq!(state.begin(ViewEvent::ToggleFavoritesOnly), Transition::Updated);
        assert!(matches!(state.begin(ViewEvent::LoadMore), Transition::Ignored(_)));
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_toggle_favorites_only_keeps_entities() {
        let mut state = loaded(5);
        let generation = state.generation();
        state.begin(ViewEvent::ToggleFavoritesOnly);
        assert!(state.favorites_only());
        assert_eq!(state.loaded_entities().len(), 5);
        assert_eq!(state.generation(), generation);
        state.begin(ViewEvent::ToggleFavoritesOnly);
        assert!(!state.favorites_only());
    }

    #[test]
    fn test_stale_page_discarded_after_category_switch() {
        let mut state = loaded(20);
        let page = ticket_of(state.begin(ViewEvent::LoadMore));
        let fire = ticket_of(state.begin(ViewEvent::SelectCategory(Category::Fire)));

        assert_eq!(state.complete(page, Ok(refs(21..=40))), Completion::Stale);
        assert!(state.loaded_entities().is_empty());
        assert!(state.is_loading());

        assert_eq!(
            state.complete(fire, Ok(refs(4..=6))),
            Completion::Applied { received: 3 }
        );
        assert_eq!(state.active_category(), Some(Category::Fire));
        assert_eq!(state.loaded_entities().len(), 3);
    }

    #[test]
    fn test_failed_page_restores_previous_list() {
        let mut state = loaded(20);
        let ticket = ticket_of(state.begin(ViewEvent::LoadMore));
        let completion = state.complete(ticket, Err(CatalogError::fetch("x", "503")));

        assert_eq!(completion, Completion::Failed);
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.loaded_entities().len(), 20);
        assert!(!state.is_loading());
        assert!(state.last_error().is_some());
    }

    #[test]
    fn test_failed_category_switch_restores_previous_category() {
        let mut state = loaded(20);
        let fire = ticket_of(state.begin(ViewEvent::SelectCategory(Category::Fire)));
        state.complete(fire, Ok(refs(4..=6)));

        let water = ticket_of(state.begin(ViewEvent::SelectCategory(Category::Water)));
        state.complete(water, Err(CatalogError::fetch("x", "timeout")));

        assert_eq!(state.active_category(), Some(Category::Fire));
        assert_eq!(state.loaded_entities().len(), 3);
    }

    #[test]
    fn test_success_clears_last_error() {
        let mut state = loaded(20);
        let ticket = ticket_of(state.begin(ViewEvent::LoadMore));
        state.complete(ticket, Err(CatalogError::fetch("x", "503")));
        let ticket = ticket_of(state.begin(ViewEvent::LoadMore));
        state.complete(ticket, Ok(refs(21..=40)));
        assert_eq!(state.last_error(), None);
        assert_eq!(state.cursor(), 20);
    }

    #[test]
    fn test_short_page_ends_paging() {
        let mut state = loaded(20);
        let ticket = ticket_of(state.begin(ViewEvent::LoadMore));
        state.complete(ticket, Ok(refs(21..=25)));
        assert!(!state.has_more());
        assert_eq!(
            state.begin(ViewEvent::LoadMore),
            Transition::Ignored("end of catalog reached")
        );
    }

    #[test]
    fn test_load_more_ignored_while_loading() {
        let mut state = ViewState::new(20);
        let _pending = state.begin_initial();
        assert_eq!(
            state.begin(ViewEvent::LoadMore),
            Transition::Ignored("a fetch is already in flight")
        );
    }
}
