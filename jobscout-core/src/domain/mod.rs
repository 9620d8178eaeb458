//! Core domain types
//!
//! This module contains the core domain structures used across Jobscout crates.
//! A `Task` is the local unit of work; a `Job` is the remote unit tracked by
//! the scraping API; `JobListing` is one parsed result row.

pub mod job;
pub mod listing;
pub mod task;
