//! snaplink - URL shortener with per-click analytics
//!
//! Authenticated users create short codes for long URLs, anonymous visitors
//! are redirected through them, and owners read click statistics.
//!
//! # Architecture
//! - `storage`: `LinkStore` seam and the SeaORM backend
//! - `services`: link registry, redirector and analytics aggregator
//! - `analytics`: user-agent classification and click aggregation
//! - `api`: HTTP handlers, bearer-token middleware, JWT validation
//! - `config`: configuration loaded once and passed explicitly
//! - `runtime`: server bootstrap and one-shot CLI commands
//! - `system`: logging initialisation

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
