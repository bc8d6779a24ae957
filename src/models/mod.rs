//! Data models for the feed engine

mod activity;

pub use activity::{ActivityKind, ActivityRecord};
