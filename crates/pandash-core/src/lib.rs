//! # Pandash Core Library
//!
//! Client-side synchronization layer for the pan transfer/share control panel.
//!
//! The backend owns the task queues, throttling and file storage. This crate
//! owns everything a dashboard needs to stay in step with it:
//!
//! - A page-lifetime [`bus::EventBus`] decoupling the tab controllers
//! - A REST [`api::ApiClient`] speaking the `{success, data, error}` envelope
//! - Account-scoped tab controllers under [`dashboard`]
//! - A cancellable auto-refresh timer and a search debouncer under [`refresh`]
//! - Local [`settings`] validation and the [`knowledge`] table query model
//!
//! ## Module Overview
//!
//! - [`api`]: REST client and wire types
//! - [`bus`]: Publish/subscribe event registry
//! - [`config`]: Configuration management
//! - [`dashboard`]: Host panel and per-tab controllers
//! - [`error`]: Error types
//! - [`knowledge`]: Knowledge table filters, columns and cell formatting
//! - [`refresh`]: Epoch tickets, refresh timer and debouncer
//! - [`session`]: Persisted API key and selected account
//! - [`settings`]: Backend settings model and validation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod bus;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod knowledge;
pub mod refresh;
pub mod session;
pub mod settings;

pub use error::{Error, Result};

/// Default base URL of the backend.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// HTTP header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Default queue auto-refresh interval in milliseconds.
pub const DEFAULT_AUTO_REFRESH_MS: u64 = 5000;

/// Delay between the last search keystroke and the search request, in milliseconds.
pub const SEARCH_DEBOUNCE_MS: u64 = 500;

/// Maximum number of queue rows rendered per queue.
pub const QUEUE_ROW_LIMIT: usize = 50;

/// Default knowledge table page size.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
