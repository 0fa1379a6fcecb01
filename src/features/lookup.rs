//! Capability-injected external lookups.
//!
//! The remote-metadata and content-based signal families depend on the
//! outside world. Those dependencies enter the extractor through the two
//! traits below, so the signal logic stays pure and testable: production
//! wires in the HTTP-backed implementations, tests wire in fixtures, and an
//! offline deployment wires in [`OfflineLookups`].
//!
//! Failure contract: every method returns `Option`; `None` means "could not
//! be evaluated" and the consuming signal degrades to the neutral value.
//! Implementations must bound their own latency - a timeout is a `None`,
//! never an error and never a hang.

use std::time::Duration;

use super::parse::ParsedUrl;

/// Third-party metadata about a domain. Each lookup is independently
/// fallible; implementations must not let one failing source poison another.
pub trait DomainIntel: Send + Sync {
    /// Registration period remaining, in months, from registrar data.
    fn registration_months(&self, host: &str) -> Option<u32>;

    /// Age of the domain in months.
    fn domain_age_months(&self, host: &str) -> Option<u32>;

    /// Whether the host currently resolves in DNS.
    fn has_dns_record(&self, host: &str) -> Option<bool>;

    /// Global traffic rank; `Some(None)` means looked up but unranked.
    fn traffic_rank(&self, host: &str) -> Option<Option<u64>>;

    /// Page rank score in [0, 1].
    fn page_rank(&self, host: &str) -> Option<f32>;

    /// Whether the URL is present in a search engine index.
    fn is_indexed(&self, url: &str) -> Option<bool>;

    /// Number of external links pointing at the page.
    fn inbound_links(&self, url: &str) -> Option<u32>;

    /// Whether registrar identity data is consistent with the hostname.
    fn whois_matches_host(&self, host: &str) -> Option<bool>;

    /// Whether the host or its IP appears in a phishing block list.
    fn in_phishing_feed(&self, host: &str) -> Option<bool>;
}

/// A fetched page body plus how it was reached.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Response body, decoded as text.
    pub body: String,
    /// Number of redirects followed before the final response.
    pub redirects: u32,
}

/// Fetches the page a URL points at. Content-based signals parse the body.
pub trait PageFetcher: Send + Sync {
    /// Fetch the page; `None` on timeout, network error, or non-success.
    fn fetch(&self, url: &str) -> Option<FetchedPage>;
}

// ============================================================================
// HTTP-BACKED FETCHER
// ============================================================================

/// Page fetcher over blocking HTTP with a hard per-request timeout.
pub struct HttpPageFetcher {
    agent: ureq::Agent,
    max_redirects: u32,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Self {
        // Redirects are followed manually in fetch_counting so the hop
        // count stays observable; the agent itself must not follow any.
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .redirects(0)
            .build();
        Self {
            agent,
            max_redirects: 8,
        }
    }

    /// Follow redirects one hop at a time so the hop count is observable.
    /// ureq's built-in redirect handling hides the chain length.
    fn fetch_counting(&self, url: &str) -> Option<FetchedPage> {
        let mut current = url.to_string();
        let mut redirects = 0u32;

        loop {
            let response = self
                .agent
                .request("GET", &current)
                .set("User-Agent", concat!("phishguard/", env!("CARGO_PKG_VERSION")))
                .call();

            let response = match response {
                Ok(r) => r,
                Err(ureq::Error::Status(code, r)) if (300..400).contains(&code) => r,
                Err(_) => return None,
            };

            if (300..400).contains(&response.status()) {
                let location = response.header("Location")?.to_string();
                redirects += 1;
                if redirects > self.max_redirects {
                    return None;
                }
                current = resolve_location(&current, &location);
                continue;
            }

            let body = response.into_string().ok()?;
            return Some(FetchedPage { body, redirects });
        }
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch(&self, url: &str) -> Option<FetchedPage> {
        self.fetch_counting(url)
    }
}

/// Resolve a redirect `Location` against the URL that produced it.
/// Absolute-path locations replace the path on the current origin;
/// bare-relative ones resolve against the current path's directory.
fn resolve_location(current: &str, location: &str) -> String {
    if location.starts_with("http://") || location.starts_with("https://") {
        return location.to_string();
    }

    let parsed = ParsedUrl::parse(current);
    let scheme = if parsed.scheme.is_empty() {
        "http"
    } else {
        &parsed.scheme
    };

    if location.starts_with("//") {
        return format!("{}:{}", scheme, location);
    }

    let origin = match parsed.port {
        Some(port) => format!("{}://{}:{}", scheme, parsed.host, port),
        None => format!("{}://{}", scheme, parsed.host),
    };

    if location.starts_with('/') {
        format!("{}{}", origin, location)
    } else {
        let dir = parsed.path.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
        format!("{}{}/{}", origin, dir, location)
    }
}

// ============================================================================
// DNS-BACKED INTEL
// ============================================================================

/// Domain intel backed by the system resolver. Answers the DNS question
/// directly; the registrar/traffic/index questions need third-party data
/// services and stay unanswered here, so their signals degrade to neutral.
/// Deployments with those services wire in their own [`DomainIntel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsIntel;

impl DomainIntel for DnsIntel {
    fn registration_months(&self, _host: &str) -> Option<u32> {
        None
    }
    fn domain_age_months(&self, _host: &str) -> Option<u32> {
        None
    }
    fn has_dns_record(&self, host: &str) -> Option<bool> {
        if host.is_empty() {
            return None;
        }
        use std::net::ToSocketAddrs;
        // Resolver errors and NXDOMAIN are indistinguishable here; both mean
        // the host does not usably resolve.
        match (host, 80u16).to_socket_addrs() {
            Ok(mut addrs) => Some(addrs.next().is_some()),
            Err(_) => Some(false),
        }
    }
    fn traffic_rank(&self, _host: &str) -> Option<Option<u64>> {
        None
    }
    fn page_rank(&self, _host: &str) -> Option<f32> {
        None
    }
    fn is_indexed(&self, _url: &str) -> Option<bool> {
        None
    }
    fn inbound_links(&self, _url: &str) -> Option<u32> {
        None
    }
    fn whois_matches_host(&self, _host: &str) -> Option<bool> {
        None
    }
    fn in_phishing_feed(&self, _host: &str) -> Option<bool> {
        None
    }
}

// ============================================================================
// OFFLINE IMPLEMENTATIONS
// ============================================================================

/// Lookup provider for deployments without external services. Every signal
/// that depends on it reports indeterminate, which the model was trained to
/// tolerate.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLookups;

impl DomainIntel for OfflineLookups {
    fn registration_months(&self, _host: &str) -> Option<u32> {
        None
    }
    fn domain_age_months(&self, _host: &str) -> Option<u32> {
        None
    }
    fn has_dns_record(&self, _host: &str) -> Option<bool> {
        None
    }
    fn traffic_rank(&self, _host: &str) -> Option<Option<u64>> {
        None
    }
    fn page_rank(&self, _host: &str) -> Option<f32> {
        None
    }
    fn is_indexed(&self, _url: &str) -> Option<bool> {
        None
    }
    fn inbound_links(&self, _url: &str) -> Option<u32> {
        None
    }
    fn whois_matches_host(&self, _host: &str) -> Option<bool> {
        None
    }
    fn in_phishing_feed(&self, _host: &str) -> Option<bool> {
        None
    }
}

impl PageFetcher for OfflineLookups {
    fn fetch(&self, _url: &str) -> Option<FetchedPage> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_location_replaces_url() {
        assert_eq!(
            resolve_location("http://a.com/p", "https://b.com/x"),
            "https://b.com/x"
        );
    }

    #[test]
    fn path_location_resolves_against_origin() {
        assert_eq!(
            resolve_location("http://a.com/deep/page", "/next"),
            "http://a.com/next"
        );
        assert_eq!(
            resolve_location("https://a.com:8443/p?q=1", "/login"),
            "https://a.com:8443/login"
        );
    }

    #[test]
    fn relative_location_resolves_against_directory() {
        assert_eq!(
            resolve_location("http://a.com/deep/page", "next"),
            "http://a.com/deep/next"
        );
        assert_eq!(resolve_location("http://a.com/", "next"), "http://a.com/next");
    }

    #[test]
    fn protocol_relative_location_keeps_scheme() {
        assert_eq!(
            resolve_location("https://a.com/p", "//b.com/q"),
            "https://b.com/q"
        );
    }
}
