//! Core domain + application logic for DeskBot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the desktop
//! (screen, clipboard, notifications) live behind ports (traits) implemented in
//! adapter crates.

pub mod clipboard;
pub mod commands;
pub mod config;
pub mod connectivity;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod screenshot;

pub use errors::{Error, Result};
