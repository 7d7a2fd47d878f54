//! The single shared poem state.
//!
//! Writers go through [`PoemStore::update`], which holds the write lock for the
//! duration of one closure. Readers take a cloned [`StoreState`] snapshot and
//! derive views from it.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use crate::poem::Poem;
use crate::search::{parse_query, SearchQuery};
use crate::views::{self, Navigation, SortMode};

pub const NOT_FOUND_MESSAGE: &str = "Poem not found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    CollectionLoading,
    CollectionReady { count: usize },
    CollectionFailed,
    SelectionStarted { poem_id: String },
    SelectionResolved { poem_id: String },
    ContentLoaded { poem_id: String },
    DetailFailed,
    ViewOptionsChanged,
}

#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub poems: Vec<Poem>,
    pub preamble: Option<Poem>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub selected: Option<Poem>,
    pub is_poem_loading: bool,
    pub search: SearchQuery,
    pub sort: SortMode,
    /// Bumped on every committed mutation.
    pub revision: u64,
}

impl StoreState {
    pub fn navigation_order(&self) -> Vec<Poem> {
        views::sorted_for_navigation(&self.poems, self.preamble.as_ref())
    }

    pub fn navigation(&self) -> Navigation {
        let order = self.navigation_order();
        views::navigation(&order, self.selected.as_ref().map(|p| p.id.as_str()))
    }

    pub fn filtered(&self) -> Vec<Poem> {
        views::filtered_poems(&self.poems, self.preamble.as_ref(), &self.search, self.sort)
    }

    pub fn stanzas(&self) -> Vec<String> {
        self.selected
            .as_ref()
            .map(|poem| views::stanzas(&poem.content))
            .unwrap_or_default()
    }

    pub fn stats(&self) -> String {
        views::collection_stats(
            self.poems.len(),
            self.filtered().len(),
            &self.search,
            self.sort,
        )
    }

    /// Preamble slot first, then the list.
    pub fn lookup(&self, poem_id: &str) -> Option<Poem> {
        self.preamble
            .iter()
            .chain(self.poems.iter())
            .find(|poem| poem.id == poem_id)
            .map(Poem::summary)
    }
}

#[derive(Clone)]
pub struct PoemStore {
    state: Arc<RwLock<StoreState>>,
    subscribers: Arc<Mutex<Vec<Sender<StoreEvent>>>>,
}

impl Default for PoemStore {
    fn default() -> Self {
        Self::new(SortMode::default())
    }
}

impl PoemStore {
    pub fn new(sort: SortMode) -> Self {
        let state = StoreState {
            sort,
            ..StoreState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.read().clone()
    }

    pub fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&StoreState) -> T,
    {
        f(&self.state.read())
    }

    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Applies one mutation under the write lock, then notifies subscribers.
    pub fn update<F, T>(&self, event: StoreEvent, f: F) -> T
    where
        F: FnOnce(&mut StoreState) -> T,
    {
        let result = {
            let mut state = self.state.write();
            let result = f(&mut state);
            state.revision += 1;
            result
        };
        self.publish(event);
        result
    }

    fn publish(&self, event: StoreEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn has_poems(&self) -> bool {
        self.read(|state| !state.poems.is_empty())
    }

    pub fn begin_loading(&self) {
        self.update(StoreEvent::CollectionLoading, |state| {
            state.is_loading = true;
            state.error = None;
        });
    }

    /// Replaces the whole collection. A missing preamble keeps the previous one.
    pub fn finish_loading(&self, poems: Vec<Poem>, preamble: Option<Poem>) {
        let count = poems.len();
        self.update(StoreEvent::CollectionReady { count }, move |state| {
            state.poems = poems.into_iter().map(|poem| poem.summary()).collect();
            if let Some(preamble) = preamble {
                state.preamble = Some(preamble.summary());
            }
            state.is_loading = false;
        });
    }

    /// Leaves the current poems untouched.
    pub fn fail_loading(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(StoreEvent::CollectionFailed, move |state| {
            state.error = Some(message);
            state.is_loading = false;
        });
    }

    pub fn begin_selection(&self, poem_id: &str) {
        self.update(
            StoreEvent::SelectionStarted {
                poem_id: poem_id.to_string(),
            },
            |state| {
                state.is_poem_loading = true;
                state.error = None;
                state.selected = None;
            },
        );
    }

    /// Resolves `poem_id` against the loaded collection and selects it.
    pub fn resolve_selection(&self, poem_id: &str) -> Option<Poem> {
        self.update(
            StoreEvent::SelectionResolved {
                poem_id: poem_id.to_string(),
            },
            |state| {
                let found = state.lookup(poem_id);
                state.selected = found.clone();
                if found.is_none() {
                    state.error = Some(NOT_FOUND_MESSAGE.to_string());
                    state.is_poem_loading = false;
                }
                found
            },
        )
    }

    /// Stores fetched lines on the selected poem if it is still `poem_id`.
    ///
    /// A reply for a poem that is no longer selected changes nothing.
    pub fn merge_content(&self, poem_id: &str, lines: Vec<String>) -> bool {
        self.update(
            StoreEvent::ContentLoaded {
                poem_id: poem_id.to_string(),
            },
            move |state| match state.selected.as_mut() {
                Some(selected) if selected.id == poem_id => {
                    selected.content = lines;
                    state.is_poem_loading = false;
                    true
                }
                _ => false,
            },
        )
    }

    /// Records a detail failure for `poem_id`; ignored once the selection has moved on.
    pub fn fail_detail(&self, poem_id: &str, message: impl Into<String>) -> bool {
        let message = message.into();
        self.update(StoreEvent::DetailFailed, move |state| {
            let current = state
                .selected
                .as_ref()
                .is_some_and(|selected| selected.id == poem_id);
            if current {
                state.error = Some(message);
                state.is_poem_loading = false;
            }
            current
        })
    }

    pub fn clear_selection(&self) {
        self.update(StoreEvent::ViewOptionsChanged, |state| {
            state.selected = None;
            state.is_poem_loading = false;
        });
    }

    pub fn set_search_term(&self, input: &str) {
        let query = parse_query(input);
        tracing::trace!(search = query.raw(), "search term changed");
        self.update(StoreEvent::ViewOptionsChanged, move |state| {
            state.search = query;
        });
    }

    pub fn set_sort(&self, sort: SortMode) {
        self.update(StoreEvent::ViewOptionsChanged, |state| {
            state.sort = sort;
        });
    }
}
