//! Feature extraction: URL string to a fixed 30-wide ternary vector.
//!
//! The layout module is the single source of truth for feature names and
//! order; the extractor fills a [`FeatureVector`] in that order from four
//! signal families (lexical, protocol/host, remote metadata, page content).
//! External dependencies enter only through the [`lookup`] capabilities.

pub mod content;
pub mod extractor;
pub mod layout;
pub mod lexical;
pub mod lookup;
pub mod parse;
pub mod remote;
pub mod vector;

pub use extractor::UrlFeatureExtractor;
pub use layout::{layout_hash, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use lookup::{DnsIntel, DomainIntel, FetchedPage, HttpPageFetcher, OfflineLookups, PageFetcher};
pub use vector::{FeatureVector, Signal, INDETERMINATE};
