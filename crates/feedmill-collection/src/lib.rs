//! Client-side tracking of background feed-collection jobs.
//!
//! The backend owns the collection pipeline and exposes a small job API
//! (trigger + status). This crate wraps it for UI consumption: a
//! [`CollectionTracker`] triggers a run, polls its status on a fixed
//! interval, normalizes the backend's status vocabulary into
//! [`CollectionStatus`], and publishes every change to subscribers.

pub mod client;
pub mod error;
pub mod normalize;
pub mod notify;
pub mod tracker;
pub mod types;

pub use client::CollectionClient;
pub use error::CollectionError;
pub use normalize::normalize;
pub use notify::{ChannelNotifier, LogNotifier, Notification, NotificationLevel, Notifier};
pub use tracker::{CollectionTracker, DEFAULT_POLL_INTERVAL};
pub use types::{
    BackendJobData, CollectionResult, CollectionState, CollectionStatus, JobProgress,
    TriggerResponse,
};
