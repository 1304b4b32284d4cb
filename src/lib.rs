//! PostPulse - reading analytics and cache service for a blog
//!
//! Collects reading beacons and share events for blog posts, keeps per-post
//! counters in a relational database and serves them through a read-through
//! cache with explicit invalidation and warm-up.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `engagement`: Beacon validation, traffic filtering and counter updates
//! - `cache`: Pluggable object cache (memory / redis / null) and the cache service
//! - `storage`: SeaORM storage backend and data access
//! - `api`: HTTP services and middleware
//! - `interfaces`: Command-line interface
//! - `config`: Static configuration and site settings
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod engagement;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod storage;
pub mod system;
