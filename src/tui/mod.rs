//! Terminal User Interface for tv-browser using ratatui.
//!
//! This module draws [`View`](crate::view::View) snapshots and turns key
//! presses into [`Action`]s for the coordinator.

mod render;
mod state;
mod types;

pub use render::draw;
pub use state::App;
pub use types::{Action, Picker};

use crossterm::event::{self, Event};
use std::io;
use std::time::Duration;

/// Poll for keyboard events with a timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
