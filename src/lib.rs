//! portfolio-analyzer: return, risk, indicator and recommendation analytics
//! for a basket of assets.
//!
//! Hexagonal architecture: pure analytics in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], command-line wiring in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
