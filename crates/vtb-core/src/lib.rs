//! Core domain + application logic for the verification Telegram bot.
//!
//! This crate is intentionally framework-agnostic. Telegram / Firestore live
//! behind ports (traits) implemented in adapter crates.

pub mod admin;
pub mod codes;
pub mod config;
pub mod dialog;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod store;
pub mod verify;

pub use errors::{Error, Result};
