//! Resume screening: score resumes against a job description, rank them, and
//! explain what each one is missing.
//!
//! The scoring core lives in [`scoring`] and [`advice`]; the remaining modules
//! cover file parsing, role profiles, configuration and report output for the
//! `rr` binary.

pub mod advice;
pub mod cli;
pub mod config;
pub mod parser;
pub mod profiles;
pub mod ranking;
pub mod report;
pub mod scoring;
pub mod storage;
#[cfg(test)]
mod tests;
