//! Gapscan: digital readiness gap analysis
//!
//! An exploratory pipeline over community technology survey data: load
//! and clean the responses, derive binary readiness labels, check the
//! features for collinearity, train multi-output random forests, and
//! report how predicted readiness is distributed across demographic
//! groups.

pub mod cli;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use error::AnalysisError;
