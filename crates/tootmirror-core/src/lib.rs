//! Tootmirror Core Library
//!
//! Mirrors posts from a Mastodon account onto Twitter: eligibility
//! filtering, weighted-length truncation, URL appending and the
//! bookkeeping that lets deletions follow their originals.

pub mod config;
pub mod destination;
pub mod error;
pub mod logging;
pub mod mirror;
pub mod orchestrator;
pub mod policy;
pub mod post;
pub mod records;
pub mod source;
pub mod text;
