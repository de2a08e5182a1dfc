//! Client library for the selfmap self-analysis API.
//!
//! - [`domain`]: payload types, view state, the analysis result poller and
//!   the ports remote operations go through.
//! - [`outbound`]: reqwest adapters implementing those ports.
//! - [`config`]: environment-driven settings.

pub mod config;
pub mod domain;
pub mod outbound;
