//! Search functionality for file-name indexes.
//!
//! This module provides:
//! - The main `FileSearchEngine` API
//! - Search routines over a catalogue snapshot and over a live walk

mod engine;
mod manager;


pub use engine::{quick_search, search_catalogue};
pub use manager::FileSearchEngine;
