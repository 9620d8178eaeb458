//! Data transfer objects
//!
//! Wire shapes of the remote scraping API. Only the fields the client reads
//! are modeled; everything else in the responses is ignored.

pub mod job;
