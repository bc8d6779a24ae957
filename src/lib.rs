//! # shelffeed 📚
//!
//! Activity-feed engine for a social reading tracker backed by a
//! WordPress/BuddyPress REST API.
//!
//! ## Overview
//!
//! The backend hands out a flat, paginated, server-ordered list of
//! heterogeneous activity records: posts, comments, and other noise
//! intermixed, with ids and booleans that arrive as numbers *or* strings.
//! shelffeed turns that into the object graph a feed screen renders:
//! comment trees reassembled from implicit foreign keys, pages merged
//! without duplicates, and blocked/muted authors filtered out.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Feed worker                          │
//! │   Single writer per feed session; commands in, events out   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │   Controller    │ │       API       │ │      Cache      │
//! │                 │ │                 │ │                 │
//! │ • Page cursor   │ │ • BuddyPress    │ │ • Offline reads │
//! │ • Dedup store   │ │ • Moderation    │ │ • Age sweep     │
//! │ • Reconstruct   │ │ • FeedApi trait │ │ • SQLite        │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │
//!          ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐
//! │ Thread builder  │ │ Tolerant decode │
//! │ forest + filter │ │ lenient fields  │
//! └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] — `FeedApi` contract and the BuddyPress REST client
//! - [`config`] — Configuration management
//! - [`db`] — `SQLite` offline cache for fetched records
//! - [`decode`] — Tolerant decoding of loosely-typed payloads
//! - [`feed`] — Paginated feed controller and session state
//! - [`models`] — Canonical activity record
//! - [`moderation`] — Blocked/muted lists and the visibility predicate
//! - [`thread`] — Thread reconstruction (flat store → forest)
//! - [`worker`] — Channel-driven feed worker task
//!
//! ## Example
//!
//! ```no_run
//! use shelffeed::{BuddyPressClient, FeedController};
//!
//! # async fn run() -> Result<(), shelffeed::FeedError> {
//! let api = BuddyPressClient::new("https://reads.example.com", "token");
//! let mut feed = FeedController::new(api, 20);
//! feed.load_first_page().await?;
//! for post in feed.forest() {
//!     println!("{} ({} replies)", post.preview(60), post.children.len());
//! }
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/shelffeed/0.2.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod config;
pub mod db;
pub mod decode;
pub mod error;
pub mod feed;
pub mod models;
pub mod moderation;
pub mod paths;
pub mod thread;
pub mod worker;

// Re-export main types for convenience
pub use api::{BuddyPressClient, FeedApi};
pub use config::FeedConfig;
pub use db::ActivityCache;
pub use decode::{DecodeError, decode_activity, decode_page};
pub use error::FeedError;
pub use feed::{FeedController, FeedSession, PageOutcome};
pub use models::{ActivityKind, ActivityRecord};
pub use moderation::ModerationState;
pub use thread::reconstruct;
pub use worker::{FeedCommand, FeedEvent, FeedHandle, spawn_worker};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
