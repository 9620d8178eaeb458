//! Jobscout Core
//!
//! Core types shared by the Jobscout client and runner.
//!
//! This crate contains:
//! - Domain types: Tasks, remote jobs, job listings
//! - Payload: The scraping payload template and its per-task copies
//! - DTOs: Wire shapes of the remote scraping API responses

pub mod domain;
pub mod dto;
pub mod payload;
