use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::ListState;
use ratatui::Terminal;
use tokio::runtime::Handle;

use crate::config::themes::ThemeRegistry;
use crate::config::AppConfig;
use crate::favorites::Favorites;
use crate::idle::IdleSignal;
use crate::notion::Connect;
use crate::service::PoetryService;
use crate::store::StoreEvent;
use crate::ui::{self, Screen};

mod actions;
pub mod route;
pub mod state;

pub use actions::Action;
pub use route::Route;
pub use state::{AppState, InputMode};

use self::actions::action_for_key;

pub struct App<C> {
    config: Arc<AppConfig>,
    runtime: Handle,
    service: PoetryService<C>,
    favorites: Favorites,
    state: AppState,
    list_state: ListState,
    idle: IdleSignal,
    store_events: Receiver<StoreEvent>,
    should_quit: bool,
    tick_rate: Duration,
}

impl<C: Connect> App<C> {
    pub fn new(
        config: Arc<AppConfig>,
        runtime: Handle,
        service: PoetryService<C>,
        mut favorites: Favorites,
        initial: Route,
    ) -> Self {
        favorites.load();
        let store_events = service.store().subscribe();
        let idle = IdleSignal::new(&config.idle, Instant::now());
        let mut app = Self {
            config,
            runtime,
            service,
            favorites,
            state: AppState::new(Route::Collection),
            list_state: ListState::default(),
            idle,
            store_events,
            should_quit: false,
            tick_rate: Duration::from_millis(250),
        };
        if initial != Route::Collection {
            // the detail route fetches the collection itself when it is empty
            app.navigate(initial);
        } else {
            app.service.spawn_fetch_poems(&app.runtime);
        }
        app
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let palette = ThemeRegistry::default().palette(&self.config.theme);
        let mut last_tick = Instant::now();
        loop {
            let snapshot = self.service.store().snapshot();
            let visible = self
                .state
                .visible_poems(snapshot.filtered(), &self.favorites);
            self.state.clamp_selection(visible.len());
            if visible.is_empty() {
                self.list_state.select(None);
            } else {
                self.list_state.select(Some(self.state.selected));
            }
            terminal
                .draw(|frame| {
                    let screen = Screen {
                        store: &snapshot,
                        app: &self.state,
                        favorites: &self.favorites,
                        visible: &visible,
                        palette,
                    };
                    ui::draw_app(frame, &screen, &mut self.list_state);
                })
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(0));

            if event::poll(timeout).context("polling for terminal events")? {
                match event::read().context("reading terminal event")? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(_) => self.idle.record_input(Instant::now()),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                self.on_tick();
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    fn on_tick(&mut self) {
        if self.idle.tick(Instant::now()) {
            self.state.idle = self.idle.is_idle();
        }
        for event in self.store_events.try_iter() {
            match event {
                StoreEvent::CollectionFailed | StoreEvent::DetailFailed => {
                    tracing::debug!(?event, "store reported a failure");
                }
                StoreEvent::ContentLoaded { .. } => self.state.detail_scroll = 0,
                _ => {}
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.idle.record_input(Instant::now());

        if self.state.is_searching() {
            self.handle_search_key(key);
            return;
        }

        if let Some(action) = action_for_key(&self.state.route, key) {
            self.handle_action(action);
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.cancel_search(),
            KeyCode::Enter => self.state.finish_search(),
            KeyCode::Backspace => self.state.pop_search_char(),
            KeyCode::Char(ch)
                if !key.modifiers.intersects(
                    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                ) =>
            {
                self.state.push_search_char(ch)
            }
            _ => return,
        }
        self.service
            .store()
            .set_search_term(&self.state.search_input);
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::SelectNext | Action::SelectPrevious => {
                let delta = if action == Action::SelectNext { 1 } else { -1 };
                if self.state.route == Route::Collection {
                    let len = self.visible_len();
                    self.state.move_selection(delta, len);
                } else {
                    self.state.scroll_detail(delta as i32);
                }
            }
            Action::Open => {
                if let Some(poem) = self.highlighted_poem_id() {
                    self.navigate(Route::poem(poem));
                }
            }
            Action::OpenPreamble => {
                let preamble = self
                    .service
                    .store()
                    .read(|state| state.preamble.as_ref().map(|p| p.id.clone()));
                match preamble {
                    Some(id) => self.navigate(Route::poem(id)),
                    None => self.state.set_status_message(Some("No preamble poem loaded")),
                }
            }
            Action::Back => self.navigate(Route::Collection),
            Action::PreviousPoem | Action::NextPoem => {
                let nav = self.service.store().read(|state| state.navigation());
                let target = if action == Action::NextPoem {
                    nav.next
                } else {
                    nav.prev
                };
                if let Some(poem) = target {
                    self.navigate(Route::poem(poem.id));
                }
            }
            Action::StartSearch => self.state.begin_search(),
            Action::CycleSort => {
                let next = self.service.store().read(|state| state.sort.cycle());
                self.service.store().set_sort(next);
                self.state.selected = 0;
                self.state
                    .set_status_message(Some(format!("Sorted by {next}")));
            }
            Action::ToggleFavorite => self.handle_toggle_favorite(),
            Action::ToggleFavoritesOnly => {
                self.state.favorites_only = !self.state.favorites_only;
                self.state.selected = 0;
            }
            Action::ToggleReadingMode => {
                let on = self.favorites.toggle_reading_mode();
                self.state.set_status_message(Some(if on {
                    "Reading mode on"
                } else {
                    "Reading mode off"
                }));
            }
            Action::Reload => {
                self.service.spawn_fetch_poems(&self.runtime);
                if let Some(id) = self.state.route.poem_id() {
                    self.service.spawn_load_poem(&self.runtime, id.to_string());
                }
                self.state.set_status_message(Some("Reloading…"));
            }
        }
    }

    /// Switches screens; entering a poem starts loading its text in the background.
    pub fn navigate(&mut self, route: Route) {
        tracing::debug!(%route, "navigating");
        self.state.detail_scroll = 0;
        self.state.set_status_message(None::<String>);
        match &route {
            Route::Poem { id } => {
                self.service.spawn_load_poem(&self.runtime, id.clone());
            }
            Route::Collection => {
                self.service.store().clear_selection();
                if !self.service.store().has_poems() {
                    self.service.spawn_fetch_poems(&self.runtime);
                }
            }
        }
        self.state.route = route;
    }

    fn handle_toggle_favorite(&mut self) {
        let target = match &self.state.route {
            Route::Poem { id } => Some(id.clone()),
            Route::Collection => self.highlighted_poem_id(),
        };
        let Some(id) = target else {
            return;
        };
        let added = self.favorites.toggle(&id);
        self.state.set_status_message(Some(if added {
            "Added to favorites"
        } else {
            "Removed from favorites"
        }));
    }

    fn visible(&self) -> Vec<crate::poem::Poem> {
        let filtered = self.service.store().read(|state| state.filtered());
        self.state.visible_poems(filtered, &self.favorites)
    }

    fn visible_len(&self) -> usize {
        self.visible().len()
    }

    fn highlighted_poem_id(&self) -> Option<String> {
        self.visible()
            .get(self.state.selected)
            .map(|poem| poem.id.clone())
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("restoring screen state")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::testing::{ScriptedApi, ScriptedConnector};
    use crate::storage::MemoryStore;
    use crate::store::PoemStore;

    fn app_with(runtime: &tokio::runtime::Runtime) -> App<ScriptedConnector> {
        let api = ScriptedApi::default()
            .with_page("p1", "Harbor", "2024-01-15", &["gulls"])
            .with_page("p2", "Lost", "2024-03-10", &["began"])
            .with_page("p3", "Winter", "2023-12-01", &["snow"]);
        let config = Arc::new(AppConfig::default());
        let store = PoemStore::new(config.default_sort);
        let service = PoetryService::new(ScriptedConnector(Some(api)), store, &config);
        // load synchronously so the test does not race the spawned fetch
        runtime.block_on(service.fetch_poems());
        let favorites = Favorites::new(Arc::new(MemoryStore::default()));
        App::new(
            config,
            runtime.handle().clone(),
            service,
            favorites,
            Route::Collection,
        )
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("runtime")
    }

    #[test]
    fn open_and_back_switch_routes() {
        let rt = runtime();
        let mut app = app_with(&rt);
        app.handle_action(Action::Open);
        assert_eq!(app.state().route, Route::poem("p1"));
        app.handle_action(Action::Back);
        assert_eq!(app.state().route, Route::Collection);
    }

    #[test]
    fn favorite_toggle_targets_highlighted_poem() {
        let rt = runtime();
        let mut app = app_with(&rt);
        app.handle_action(Action::SelectNext);
        app.handle_action(Action::ToggleFavorite);
        assert!(app.favorites.contains("p3"));
        app.handle_action(Action::ToggleFavoritesOnly);
        assert_eq!(app.highlighted_poem_id().as_deref(), Some("p3"));
    }

    #[test]
    fn search_keys_update_the_store() {
        let rt = runtime();
        let mut app = app_with(&rt);
        app.handle_key(KeyEvent::new(KeyCode::Char('/'), KeyModifiers::NONE));
        for ch in "win".chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
        assert_eq!(app.visible_len(), 1);
        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(app.visible_len(), 2);
    }
}
