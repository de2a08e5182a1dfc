//! Reqwest adapters for the selfmap HTTP API.
//!
//! One [`HttpApiClient`] implements every port. Transport concerns (base URL,
//! bearer token, per-request deadlines, trace header, status mapping) live in
//! `client`; each port file only knows its endpoints and payloads.

mod account;
mod analysis;
mod chat;
mod client;
mod dto;
mod episodes;
mod questionnaire;

pub use client::{HttpApiClient, HttpClientConfig};
