//! Capacity- and score-constrained deferred-acceptance matching.
//!
//! Applicants propose to slots in preference order; a slot keeps applicants
//! that meet its minimum score while seats last, and once full it trades its
//! weakest occupant for any stronger proposer.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod matching;
pub mod telemetry;
