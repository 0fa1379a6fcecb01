//! Remote-metadata signals.
//!
//! Each signal consults one [`DomainIntel`] lookup and degrades to the
//! neutral value when the lookup cannot answer. No signal here ever fails
//! the extraction.

use super::lookup::DomainIntel;
use super::vector::{Signal, INDETERMINATE};

/// Registration period longer than a year. Throwaway phishing domains are
/// registered for the minimum term.
pub fn domain_reg_len(intel: &dyn DomainIntel, host: &str) -> Signal {
    match intel.registration_months(host) {
        Some(months) if months > 12 => 1,
        Some(_) => -1,
        None => INDETERMINATE,
    }
}

/// Domain age of at least six months.
pub fn age_of_domain(intel: &dyn DomainIntel, host: &str) -> Signal {
    match intel.domain_age_months(host) {
        Some(months) if months >= 6 => 1,
        Some(_) => -1,
        None => INDETERMINATE,
    }
}

/// DNS record exists for the host.
pub fn dns_record(intel: &dyn DomainIntel, host: &str) -> Signal {
    match intel.has_dns_record(host) {
        Some(true) => 1,
        Some(false) => -1,
        None => INDETERMINATE,
    }
}

/// Traffic rank bucketing. An unranked domain is itself a signal; only a
/// failed lookup is indeterminate.
pub fn website_traffic(intel: &dyn DomainIntel, host: &str) -> Signal {
    match intel.traffic_rank(host) {
        Some(Some(rank)) if rank < 100_000 => 1,
        Some(Some(_)) => 0,
        Some(None) => -1,
        None => INDETERMINATE,
    }
}

/// Page rank above 0.2.
pub fn page_rank(intel: &dyn DomainIntel, host: &str) -> Signal {
    match intel.page_rank(host) {
        Some(rank) if rank > 0.2 => 1,
        Some(_) => -1,
        None => INDETERMINATE,
    }
}

/// Present in a search-engine index.
pub fn google_index(intel: &dyn DomainIntel, url: &str) -> Signal {
    match intel.is_indexed(url) {
        Some(true) => 1,
        Some(false) => -1,
        None => INDETERMINATE,
    }
}

/// Inbound link count bucketing.
pub fn links_pointing_to_page(intel: &dyn DomainIntel, url: &str) -> Signal {
    match intel.inbound_links(url) {
        Some(0) => -1,
        Some(1..=2) => 0,
        Some(_) => 1,
        None => INDETERMINATE,
    }
}

/// Registrar identity consistent with the hostname.
pub fn abnormal_url(intel: &dyn DomainIntel, host: &str) -> Signal {
    match intel.whois_matches_host(host) {
        Some(true) => 1,
        Some(false) => -1,
        None => INDETERMINATE,
    }
}

/// Host or IP present in a phishing block list.
pub fn stats_report(intel: &dyn DomainIntel, host: &str) -> Signal {
    match intel.in_phishing_feed(host) {
        Some(true) => -1,
        Some(false) => 1,
        None => INDETERMINATE,
    }
}
