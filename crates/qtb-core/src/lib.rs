//! Core domain + application logic for the Quran Telegram Bot.
//!
//! This crate is intentionally framework-agnostic. Telegram, the text/audio
//! content providers and the registry document store live behind ports
//! (traits) implemented in adapter crates.

pub mod admin;
pub mod commands;
pub mod config;
pub mod content;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod gate;
pub mod i18n;
pub mod localization;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod registry;
pub mod service;
pub mod update;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
