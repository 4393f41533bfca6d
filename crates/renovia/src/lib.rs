//! Housing renovation expertise and subsidy management service.
//!
//! Agents record property inspections ("expertises") and subsidy applications ("PDA",
//! plans d'aide); administrators manage accounts. Everything is exposed as a JSON API
//! built by [`app::api_router`].

pub mod access;
pub mod accounts;
pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod records;
pub mod report;
pub mod store;
pub mod telemetry;
