//! Configuration module for briefcraft
//!
//! This module defines the application configuration and the search options.

pub mod app_config;
pub mod paths;
mod search_config;

pub use search_config::{
    SearchConfig, SearchDepth, SearchScope, DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT,
};
