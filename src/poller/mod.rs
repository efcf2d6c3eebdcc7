//! Polling client for the user record store.
//!
//! This module handles:
//! - The pure cycle-to-actions schedule
//! - The HTTP client and its `UserApi` seam
//! - The polling session (counters, tick loop, cancellation)
//! - Mock client for testing

pub mod client;
pub mod mock;
pub mod schedule;
pub mod session;

pub use client::{UserApi, UserApiClient};
pub use mock::MockUserApi;
pub use schedule::{plan_tick, Action, TickPlan};
pub use session::PollSession;
