//! Core domain types and analytics.

pub mod analysis;
pub mod config;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod ohlcv;
pub mod portfolio;
pub mod recommendation;
pub mod returns;
pub mod risk;
pub mod stats;
pub mod universe;
