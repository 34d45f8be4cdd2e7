//! Lombarter
//!
//! Persistence layer for users and orders: pluggable datastores with
//! transactions and pagination, a cache-aside user service and update
//! notifications.

use shadow_rs::shadow;
shadow!(build);

pub mod cache;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod retry;
pub mod services;
pub mod state;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
