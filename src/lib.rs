//! A terminal browser for TV show catalogs written in Rust.
//!
//! tv-browser loads the show catalog from the TVMaze API (or a directory of
//! JSON files), lets the user filter it live, and fetches the episodes of a
//! selected show on demand. Episode lists are cached per show for the whole
//! session, and a superseded episode request never reaches the screen.
//!
//! # Features
//!
//! - Browse every show with rating, genres, status, and summary
//! - Filter shows and episodes as you type
//! - Jump to an episode by its `S01E01` code
//! - Open an episode's page in the browser
//!
//! # Usage
//!
//! ```bash
//! # Browse the public TVMaze catalog
//! cargo run
//!
//! # Browse a local copy of the catalog
//! cargo run -- --data-dir ./catalog
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod filter;
pub mod state;
pub mod tui;
pub mod types;
pub mod view;
