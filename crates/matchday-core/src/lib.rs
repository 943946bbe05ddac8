//! Core types and trait definitions for the Matchday league service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::LeagueStore`]; the HTTP layer talks to
//! them through [`resolver::PeriodResolver`] and the same trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod error;
pub mod league;
pub mod period;
pub mod resolver;
pub mod store;

pub use error::{Classify, Error, ErrorKind, Result};
