//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Models are trained against a specific layout. The vector carries the
//! version and layout hash so a model trained on a different ordering is
//! rejected at load time instead of silently scoring garbage.
//!
//! ## Signal conventions
//!
//! Every signal is ternary: 1 = legitimate-leaning, -1 = phishing-leaning,
//! 0 = indeterminate. A failed external lookup always yields 0, never an
//! error. A handful of signals are strictly binary {-1, 1} because they are
//! computable from the URL string alone.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version.
/// MUST be incremented when the layout changes.
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in the exact order they appear in the vector.
/// This is the SINGLE SOURCE OF TRUTH for feature layout, and matches the
/// column order of the training table.
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Lexical (0-6) ===
    "UsingIP",            // 0: hostname is a literal IP address (-1) vs a name (1)
    "LongURL",            // 1: length < 54 (1), 54..=75 (0), > 75 (-1)
    "ShortURL",           // 2: host is a known URL-shortening service (-1)
    "SymbolAt",           // 3: '@' present anywhere in the URL (-1)
    "RedirectingSlashes", // 4: "//" appearing past the scheme prefix (-1)
    "PrefixSuffix",       // 5: '-' in the registered domain label (-1)
    "SubDomains",         // 6: host dots: 1 (1), 2 (0), 3+ (-1)

    // === Protocol/host (7-9) ===
    "Https",              // 7: https scheme (1) vs anything else (-1)
    "NonStdPort",         // 8: explicit port other than 80/443 (-1)
    "HttpsDomainToken",   // 9: the token "https" embedded inside the host (-1)

    // === Remote metadata (10-18) ===
    "DomainRegLen",       // 10: registration period > 12 months (1), else (-1)
    "AgeOfDomain",        // 11: domain age >= 6 months (1), else (-1)
    "DnsRecord",          // 12: DNS record resolvable (1), none (-1)
    "WebsiteTraffic",     // 13: rank < 100_000 (1), ranked worse (0), unranked (-1)
    "PageRank",           // 14: page rank > 0.2 (1), else (-1)
    "GoogleIndex",        // 15: indexed by search engines (1), not (-1)
    "LinksPointingToPage",// 16: inbound links: 3+ (1), 1..=2 (0), none (-1)
    "AbnormalUrl",        // 17: whois identity matches the hostname (1), mismatch (-1)
    "StatsReport",        // 18: host/IP on a phishing block list (-1), clean (1)

    // === Content (19-29) ===
    "Favicon",            // 19: favicon served from the same domain (1), external (-1)
    "RequestUrl",         // 20: external media resources: < 22% (1), 22..=61% (0), more (-1)
    "AnchorUrl",          // 21: suspicious anchors: < 31% (1), 31..=67% (0), more (-1)
    "LinksInScriptTags",  // 22: external link/script refs: < 17% (1), 17..=81% (0), more (-1)
    "ServerFormHandler",  // 23: form action empty/about:blank (-1), off-domain (0), same-domain (1)
    "InfoEmail",          // 24: mailto: or mail() in the body (-1)
    "WebsiteForwarding",  // 25: redirects followed: <= 1 (1), 2..=4 (0), more (-1)
    "StatusBarCust",      // 26: onmouseover status-bar tampering script (-1)
    "DisableRightClick",  // 27: right-click suppression (event.button == 2) (-1)
    "UsingPopupWindow",   // 28: prompt()/popup window usage (-1)
    "IframeRedirection",  // 29: invisible iframe embedding (-1)
];

/// Total number of features.
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 30;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout.
/// Used to detect layout mismatches between extractor and model artifact.
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash (inputs are const, so this is stable across calls).
pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a feature layout doesn't match the expected one.
#[derive(Debug, Clone)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.expected_version,
            self.expected_hash,
            self.actual_version,
            self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate that incoming data matches the current layout.
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few).
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index.
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 30);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_feature_names_unique() {
        for (i, a) in FEATURE_LAYOUT.iter().enumerate() {
            for b in &FEATURE_LAYOUT[i + 1..] {
                assert_ne!(a, b, "duplicate feature name: {}", a);
            }
        }
    }

    #[test]
    fn test_layout_hash_consistency() {
        let hash1 = compute_layout_hash();
        let hash2 = compute_layout_hash();
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_layout_hash_non_zero() {
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_layout_success() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
    }

    #[test]
    fn test_validate_layout_version_mismatch() {
        assert!(validate_layout(FEATURE_VERSION + 1, layout_hash()).is_err());
    }

    #[test]
    fn test_validate_layout_hash_mismatch() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash() ^ 1).is_err());
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("UsingIP"), Some(0));
        assert_eq!(feature_index("Https"), Some(7));
        assert_eq!(feature_index("IframeRedirection"), Some(29));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(feature_name(0), Some("UsingIP"));
        assert_eq!(feature_name(29), Some("IframeRedirection"));
        assert_eq!(feature_name(100), None);
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_count, FEATURE_COUNT);
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
    }
}
