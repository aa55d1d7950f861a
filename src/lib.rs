//! Core of the tournament management system: bracket progression, the MVP
//! leaderboard, and the persistence and import plumbing they sit on.
//!
//! This crate owns no HTTP surface. The web layer calls into it in-process:
//! [`bracket::advance_bracket`] once per finalized match,
//! [`ranking::compute_ranking`] on every leaderboard read, and
//! [`ingest::record_match_stats`] / [`ingest::import_provider_stats`] when
//! results are entered or pulled from the game provider.

/// Utilities for interacting with the game API.
pub mod api;
/// Single-elimination bracket advancement.
pub mod bracket;
/// Traits and types used for interacting with the database.
pub mod database;
/// Statistics entry and import, shared by manual and provider paths.
pub mod ingest;
/// Contains functions for logging.
pub mod log;
/// The MVP leaderboard projection.
pub mod ranking;

pub use api::{GameApi, RiotApi};
pub use database::PgDatabase;

/// A thread-safe Error type used across the crate.
pub type CoreError = anyhow::Error;
