//! Concurrent fan-out search across RSS/Atom feeds.
//!
//! One worker per feed runs the matcher registered for the feed's type and
//! streams its matches to a single sink. See [`search::run`].

pub mod config;
pub mod feed;
pub mod search;
pub mod util;
