//! Phishguard - phishing URL detection.
//!
//! The pipeline has three stages:
//!
//! 1. **Feature extraction** ([`features`]): a URL string becomes a fixed
//!    30-wide vector of ternary signals. Signals that need the outside world
//!    go through injected capabilities and degrade to indeterminate when a
//!    lookup fails.
//! 2. **Training** ([`model`]): a labeled signal table is split 80/20
//!    (stratified, seeded), fit with a gradient-boosted tree ensemble, and
//!    persisted as a versioned JSON artifact with its evaluation and
//!    feature-importance ranking inside.
//! 3. **Serving** ([`predictor`], [`serve`]): the artifact is loaded once at
//!    startup - with no fallback on failure - and scored behind an HTTP API.

pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod model;
pub mod predictor;
pub mod serve;

pub use error::{PhishguardError, Result};
