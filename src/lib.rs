//! Fleet console - operator console for a pool of remote inference servers
//!
//! This library provides the client-side view model of the fleet (a polled
//! registry snapshot), the operator actions that mutate it, and the
//! document-archive views served by the same backend.

pub mod api;
pub mod archive;
pub mod boundary;
pub mod cards;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod dispatch;
pub mod logging;
pub mod metrics;
pub mod modal;
pub mod polling;
pub mod registry;
