//! Input handling and widget state for the TUI.
//!
//! The [`App`] holds only what the terminal needs on top of the coordinator's
//! [`View`]: list cursors, the open picker, and popup flags. Every key press
//! is interpreted against the view currently on screen.

use crate::config::Keybindings;
use crate::state::JumpTarget;
use crate::view::{EpisodesContent, EpisodesView, ShowsView, View};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

use super::types::{Action, Picker};

/// Application state for the TUI.
pub struct App {
    /// Whether the app should quit
    pub should_quit: bool,
    /// Whether search bar is focused
    pub search_focused: bool,
    /// List state for shows
    pub show_list_state: ListState,
    /// List state for episodes
    pub episode_list_state: ListState,
    /// Open picker, if any
    pub picker: Option<Picker>,
    /// List state of the open picker
    pub picker_state: ListState,
    /// Whether help modal is shown
    pub show_help: bool,
    /// Message shown in a popup until the next key press
    pub status_message: Option<String>,
    /// Custom keybindings
    pub keybindings: Keybindings,
}

impl App {
    /// Create a new App with default state.
    pub fn new(keybindings: Keybindings) -> Self {
        let mut show_list_state = ListState::default();
        show_list_state.select(Some(0));
        let mut episode_list_state = ListState::default();
        episode_list_state.select(Some(0));

        Self {
            should_quit: false,
            search_focused: false,
            show_list_state,
            episode_list_state,
            picker: None,
            picker_state: ListState::default(),
            show_help: false,
            status_message: None,
            keybindings,
        }
    }

    /// Set a status message.
    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    /// Clear status message.
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Move the episode cursor back to the first card.
    pub fn reset_episode_cursor(&mut self) {
        self.episode_list_state.select(Some(0));
        *self.episode_list_state.offset_mut() = 0;
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input(&mut self, key: KeyEvent, view: &View<'_>) -> Action {
        // Global quit with Ctrl+C or Ctrl+Q
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Action::Quit;
                }
                _ => {}
            }
        }

        if self.status_message.is_some() {
            self.clear_status();
            return Action::None;
        }

        // Handle help modal
        if self.show_help {
            if key.code == KeyCode::Esc
                || self.keybindings.matches(&self.keybindings.help, &key)
                || self.keybindings.matches(&self.keybindings.quit, &key)
            {
                self.show_help = false;
            }
            return Action::None;
        }

        if self.search_focused {
            return self.handle_search_bar_input(key, view);
        }

        if self.picker.is_some() {
            return self.handle_picker_input(key, view);
        }

        // Toggle help
        if self.keybindings.matches(&self.keybindings.help, &key) {
            self.show_help = true;
            return Action::None;
        }

        match view {
            View::Loading { .. } => self.handle_quit(key),
            View::Failed { .. } => {
                if self.keybindings.matches(&self.keybindings.retry, &key) {
                    Action::Retry
                } else {
                    self.handle_quit(key)
                }
            }
            View::Shows(shows) => self.handle_show_list_input(key, shows),
            View::Episodes(episodes) => self.handle_episode_list_input(key, episodes),
        }
    }

    fn handle_quit(&mut self, key: KeyEvent) -> Action {
        if self.keybindings.matches(&self.keybindings.quit, &key) {
            self.should_quit = true;
            Action::Quit
        } else {
            Action::None
        }
    }

    fn handle_search_bar_input(&mut self, key: KeyEvent, view: &View<'_>) -> Action {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.search_focused = false;
                Action::None
            }
            KeyCode::Char(c) => {
                let mut query = view.query().to_string();
                query.push(c);
                self.reset_cursors();
                Action::Search(query)
            }
            KeyCode::Backspace => {
                let mut query = view.query().to_string();
                if query.pop().is_none() {
                    return Action::None;
                }
                self.reset_cursors();
                Action::Search(query)
            }
            _ => Action::None,
        }
    }

    fn handle_show_list_input(&mut self, key: KeyEvent, view: &ShowsView<'_>) -> Action {
        let len = view.cards.len();

        if self.keybindings.matches(&self.keybindings.up, &key) {
            move_up(&mut self.show_list_state);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.down, &key) {
            move_down(&mut self.show_list_state, len);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.select, &key) {
            match self.show_list_state.selected().and_then(|i| view.cards.get(i)) {
                Some(show) => {
                    self.reset_episode_cursor();
                    Action::SelectShow(show.id)
                }
                None => Action::None,
            }
        } else if self.keybindings.matches(&self.keybindings.search, &key) {
            self.search_focused = true;
            Action::None
        } else if self.keybindings.matches(&self.keybindings.clear_search, &key) {
            self.clear_search(view.query)
        } else if self.keybindings.matches(&self.keybindings.show_picker, &key) {
            self.open_picker(Picker::Shows);
            Action::None
        } else {
            self.handle_quit(key)
        }
    }

    fn handle_episode_list_input(&mut self, key: KeyEvent, view: &EpisodesView<'_>) -> Action {
        let cards = view.cards();

        if self.keybindings.matches(&self.keybindings.up, &key) {
            move_up(&mut self.episode_list_state);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.down, &key) {
            move_down(&mut self.episode_list_state, cards.len());
            Action::None
        } else if self.keybindings.matches(&self.keybindings.select, &key)
            || self.keybindings.matches(&self.keybindings.watch, &key)
        {
            match self.episode_list_state.selected().and_then(|i| cards.get(i)) {
                Some(episode) => Action::Watch(episode.code()),
                None => Action::None,
            }
        } else if self.keybindings.matches(&self.keybindings.back, &key) {
            self.picker = None;
            // The shows listing comes back unfiltered, in the order of `view.shows`.
            let index = view.shows.iter().position(|s| s.id == view.show_id);
            self.show_list_state.select(Some(index.unwrap_or(0)));
            Action::BackToShows
        } else if self.keybindings.matches(&self.keybindings.search, &key) {
            self.search_focused = true;
            Action::None
        } else if self.keybindings.matches(&self.keybindings.clear_search, &key) {
            self.clear_search(view.query)
        } else if self.keybindings.matches(&self.keybindings.episode_jump, &key) {
            if matches!(view.content, EpisodesContent::Loaded { .. }) {
                self.open_picker(Picker::Episodes);
            }
            Action::None
        } else if self.keybindings.matches(&self.keybindings.show_picker, &key) {
            self.open_picker(Picker::Shows);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.retry, &key) {
            if matches!(view.content, EpisodesContent::Failed(_)) {
                Action::Retry
            } else {
                Action::None
            }
        } else {
            self.handle_quit(key)
        }
    }

    fn handle_picker_input(&mut self, key: KeyEvent, view: &View<'_>) -> Action {
        let Some(picker) = self.picker else {
            return Action::None;
        };
        let len = picker_len(picker, view);

        if key.code == KeyCode::Esc || self.keybindings.matches(&self.keybindings.back, &key) {
            self.picker = None;
            Action::None
        } else if self.keybindings.matches(&self.keybindings.up, &key) {
            move_up(&mut self.picker_state);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.down, &key) {
            move_down(&mut self.picker_state, len);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.select, &key) {
            let Some(i) = self.picker_state.selected().filter(|i| *i < len) else {
                return Action::None;
            };
            self.picker = None;
            self.pick(picker, i, view)
        } else {
            Action::None
        }
    }

    fn pick(&mut self, picker: Picker, index: usize, view: &View<'_>) -> Action {
        match (picker, view) {
            (Picker::Shows, View::Shows(shows)) => match shows.options().get(index) {
                Some(option) => {
                    self.reset_episode_cursor();
                    Action::SelectShow(option.id)
                }
                None => Action::None,
            },
            (Picker::Shows, View::Episodes(episodes)) => match episodes.show_options().get(index) {
                Some(option) => {
                    self.reset_episode_cursor();
                    Action::SelectShow(option.id)
                }
                None => Action::None,
            },
            (Picker::Episodes, View::Episodes(episodes)) => {
                let Some(option) = episodes.options().into_iter().nth(index) else {
                    return Action::None;
                };
                match option.target {
                    JumpTarget::All => self.reset_episode_cursor(),
                    // Option 0 is "All episodes", so cards are shifted by one.
                    JumpTarget::Episode(_) => self.episode_list_state.select(Some(index - 1)),
                }
                Action::Jump(option.target)
            }
            _ => Action::None,
        }
    }

    fn open_picker(&mut self, picker: Picker) {
        self.picker = Some(picker);
        self.picker_state.select(Some(0));
        *self.picker_state.offset_mut() = 0;
    }

    fn clear_search(&mut self, query: &str) -> Action {
        if query.is_empty() {
            return Action::None;
        }
        self.reset_cursors();
        Action::ClearSearch
    }

    fn reset_cursors(&mut self) {
        self.show_list_state.select(Some(0));
        self.reset_episode_cursor();
    }
}

fn picker_len(picker: Picker, view: &View<'_>) -> usize {
    match (picker, view) {
        (Picker::Shows, View::Shows(shows)) => shows.cards.len(),
        (Picker::Shows, View::Episodes(episodes)) => episodes.shows.len(),
        (Picker::Episodes, View::Episodes(episodes)) => episodes.cards().len() + 1,
        _ => 0,
    }
}

fn move_up(state: &mut ListState) {
    let i = state.selected().unwrap_or(0);
    if i > 0 {
        state.select(Some(i - 1));
    }
}

fn move_down(state: &mut ListState, len: usize) {
    let i = state.selected().unwrap_or(0);
    if i < len.saturating_sub(1) {
        state.select(Some(i + 1));
    }
}
