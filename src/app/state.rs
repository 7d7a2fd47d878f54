use crate::app::route::Route;
use crate::favorites::Favorites;
use crate::poem::Poem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Screen-local state that does not belong in the shared poem store.
#[derive(Debug, Clone)]
pub struct AppState {
    pub route: Route,
    pub selected: usize,
    pub input_mode: InputMode,
    pub search_input: String,
    pub favorites_only: bool,
    pub detail_scroll: u16,
    pub idle: bool,
    status_message: Option<String>,
}

impl AppState {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            selected: 0,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            favorites_only: false,
            detail_scroll: 0,
            idle: false,
            status_message: None,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.input_mode == InputMode::Search
    }

    pub fn begin_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn push_search_char(&mut self, ch: char) {
        if self.search_input.chars().count() < 80 {
            self.search_input.push(ch);
            self.selected = 0;
        }
    }

    pub fn pop_search_char(&mut self) {
        self.search_input.pop();
        self.selected = 0;
    }

    pub fn finish_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.search_input.clear();
        self.selected = 0;
    }

    pub fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, len as isize - 1) as usize;
    }

    pub fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn scroll_detail(&mut self, delta: i32) {
        let next = self.detail_scroll as i32 + delta;
        self.detail_scroll = next.clamp(0, u16::MAX as i32) as u16;
    }

    /// The list as displayed: optionally narrowed to favorites.
    pub fn visible_poems(&self, filtered: Vec<Poem>, favorites: &Favorites) -> Vec<Poem> {
        if self.favorites_only {
            filtered
                .into_iter()
                .filter(|poem| favorites.contains(&poem.id))
                .collect()
        } else {
            filtered
        }
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status_message = message.map(Into::into);
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}
