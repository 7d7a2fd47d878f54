use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::route::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    Open,
    OpenPreamble,
    Back,
    PreviousPoem,
    NextPoem,
    StartSearch,
    CycleSort,
    ToggleFavorite,
    ToggleFavoritesOnly,
    ToggleReadingMode,
    Reload,
}

/// Maps a key press in normal mode to an action for the current screen.
pub fn action_for_key(route: &Route, key: KeyEvent) -> Option<Action> {
    let plain = !key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER);
    let global = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::Reload)
        }
        KeyCode::Char('q') if plain => Some(Action::Quit),
        KeyCode::Char('f') if plain => Some(Action::ToggleFavorite),
        KeyCode::Char('m') if plain => Some(Action::ToggleReadingMode),
        _ => None,
    };
    if global.is_some() {
        return global;
    }
    match route {
        Route::Collection => match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrevious),
            KeyCode::Enter => Some(Action::Open),
            KeyCode::Char('p') if plain => Some(Action::OpenPreamble),
            KeyCode::Char('/') if plain => Some(Action::StartSearch),
            KeyCode::Char('s') if plain => Some(Action::CycleSort),
            KeyCode::Char('v') if plain => Some(Action::ToggleFavoritesOnly),
            _ => None,
        },
        Route::Poem { .. } => match key.code {
            KeyCode::Esc | KeyCode::Backspace => Some(Action::Back),
            KeyCode::Char('b') if plain => Some(Action::Back),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::PreviousPoem),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::NextPoem),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrevious),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn same_key_means_different_things_per_screen() {
        let detail = Route::poem("x");
        assert_eq!(action_for_key(&Route::Collection, key(KeyCode::Enter)), Some(Action::Open));
        assert_eq!(action_for_key(&detail, key(KeyCode::Enter)), None);
        assert_eq!(action_for_key(&detail, key(KeyCode::Char('l'))), Some(Action::NextPoem));
        assert_eq!(action_for_key(&Route::Collection, key(KeyCode::Char('l'))), None);
    }

    #[test]
    fn control_chords_are_not_plain_keys() {
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(action_for_key(&Route::Collection, ctrl_r), Some(Action::Reload));
        let ctrl_f = KeyEvent::new(KeyCode::Char('f'), KeyModifiers::CONTROL);
        assert_eq!(action_for_key(&Route::Collection, ctrl_f), None);
    }
}
