//! Dashboard controller module
//!
//! This module coordinates the installed-app enumerator, the remote service,
//! and the similarity matcher, driven by the application's lifecycle.
//!
//! # Overview
//!
//! The dashboard is the screen boundary of the application:
//! - **Runs the detection pass** once per session when the screen is mounted
//! - **Records background transitions** in the persisted store
//! - **Listens for platform broadcasts** while mounted
//! - **Absorbs every error** and turns it into an advisory [`Notice`]
//!
//! # Event Flow
//!
//! ```text
//! LifecycleEvent → Dashboard → AppEnumerator ─┐
//!                      │       RemoteService ─┴→ SimilarityMatcher
//!                      │                               ↓
//!                      └──── Notifier ←──────── RemoteService::report
//! ```
//!
//! # Detection Gate
//!
//! A [`DetectionLatch`] is fired before each pass. A second mount with the
//! same session token finds it fired and does nothing; a new token gets a new
//! latch.

pub mod dashboard;

pub use dashboard::{
    AppStatus, Collaborators, Dashboard, DetectionLatch, DetectionOutcome, LifecycleEvent,
    Notice, NoticeLevel, Notifier, ReportStatus, TracingNotifier,
};
