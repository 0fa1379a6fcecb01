//! Lexical and protocol/host signals.
//!
//! Everything here is a pure function of the URL string - no network, no
//! clock, no state. These ten signals are the deterministic core of the
//! extractor and the only ones exercised when lookups are offline.

use once_cell::sync::Lazy;
use regex::Regex;

use super::parse::ParsedUrl;
use super::vector::Signal;

/// Hosts operated by URL-shortening services. Matched against the host with
/// any "www." prefix removed.
const SHORTENER_HOSTS: &[&str] = &[
    "bit.ly", "goo.gl", "tinyurl.com", "t.co", "ow.ly", "is.gd", "buff.ly",
    "adf.ly", "bit.do", "cutt.ly", "rb.gy", "shorte.st", "tr.im", "x.co",
    "tiny.cc", "lnkd.in", "db.tt", "qr.ae", "cur.lv", "u.to", "j.mp",
    "bc.vc", "po.st", "v.gd", "s.id",
];

static HTTPS_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?").expect("static regex"));

/// Hostname is a literal IP address instead of a name.
pub fn using_ip(url: &ParsedUrl) -> Signal {
    if url.host_is_ip() { -1 } else { 1 }
}

/// URL length bucketed short/medium/long.
pub fn long_url(url: &ParsedUrl) -> Signal {
    match url.raw.len() {
        0..=53 => 1,
        54..=75 => 0,
        _ => -1,
    }
}

/// URL-shortening service host.
pub fn short_url(url: &ParsedUrl) -> Signal {
    let host = url.host_without_www();
    if SHORTENER_HOSTS.iter().any(|&s| host == s) {
        -1
    } else {
        1
    }
}

/// '@' anywhere in the URL (browsers discard everything before it).
pub fn symbol_at(url: &ParsedUrl) -> Signal {
    if url.raw.contains('@') { -1 } else { 1 }
}

/// "//" appearing past the scheme prefix, used to smuggle a redirect target.
pub fn redirecting_slashes(url: &ParsedUrl) -> Signal {
    // The legitimate "//" of "scheme://" ends by index 7 ("https://").
    match url.raw.rfind("//") {
        Some(pos) if pos > 7 => -1,
        _ => 1,
    }
}

/// '-' inside the registered domain label (paypal-secure.com trick).
pub fn prefix_suffix(url: &ParsedUrl) -> Signal {
    if url.domain_label().contains('-') { -1 } else { 1 }
}

/// Subdomain depth, bucketed by dot count after stripping "www.".
pub fn sub_domains(url: &ParsedUrl) -> Signal {
    if url.host.is_empty() || url.host_is_ip() {
        return -1;
    }
    match url.host_without_www().matches('.').count() {
        0 | 1 => 1,
        2 => 0,
        _ => -1,
    }
}

/// HTTPS scheme.
pub fn https(url: &ParsedUrl) -> Signal {
    if url.scheme == "https" { 1 } else { -1 }
}

/// Explicit non-standard port.
pub fn non_std_port(url: &ParsedUrl) -> Signal {
    match url.port {
        Some(80) | Some(443) | None => 1,
        Some(_) => -1,
    }
}

/// The token "http"/"https" embedded inside the host itself
/// ("https-secure-login.example.com").
pub fn https_domain_token(url: &ParsedUrl) -> Signal {
    if HTTPS_TOKEN_RE.is_match(&url.host) { -1 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(raw: &str) -> ParsedUrl {
        ParsedUrl::parse(raw)
    }

    #[test]
    fn using_ip_toggles() {
        assert_eq!(using_ip(&parsed("http://192.168.0.1/login")), -1);
        assert_eq!(using_ip(&parsed("http://example.com/login")), 1);
    }

    #[test]
    fn long_url_buckets() {
        assert_eq!(long_url(&parsed("http://a.com")), 1);
        let medium = format!("http://example.com/{}", "a".repeat(40));
        assert_eq!(long_url(&parsed(&medium)), 0);
        let long = format!("http://example.com/{}", "a".repeat(80));
        assert_eq!(long_url(&parsed(&long)), -1);
    }

    #[test]
    fn short_url_matches_shorteners() {
        assert_eq!(short_url(&parsed("http://bit.ly/xyz")), -1);
        assert_eq!(short_url(&parsed("http://www.tinyurl.com/xyz")), -1);
        assert_eq!(short_url(&parsed("http://bitly.example.com/xyz")), 1);
        assert_eq!(short_url(&parsed("http://example.com/bit.ly")), 1);
    }

    #[test]
    fn symbol_at_toggles() {
        assert_eq!(symbol_at(&parsed("http://user@evil.com")), -1);
        assert_eq!(symbol_at(&parsed("http://example.com")), 1);
    }

    #[test]
    fn redirecting_slashes_toggles() {
        assert_eq!(redirecting_slashes(&parsed("http://example.com//http://evil.com")), -1);
        assert_eq!(redirecting_slashes(&parsed("https://example.com/path")), 1);
        assert_eq!(redirecting_slashes(&parsed("http://example.com")), 1);
    }

    #[test]
    fn prefix_suffix_checks_domain_label_only() {
        assert_eq!(prefix_suffix(&parsed("http://paypal-secure.com/login")), -1);
        assert_eq!(prefix_suffix(&parsed("http://example.com/some-path")), 1);
    }

    #[test]
    fn sub_domains_buckets() {
        assert_eq!(sub_domains(&parsed("http://example.com")), 1);
        assert_eq!(sub_domains(&parsed("http://www.example.com")), 1);
        assert_eq!(sub_domains(&parsed("http://mail.example.com")), 0);
        assert_eq!(sub_domains(&parsed("http://a.mail.example.com")), -1);
    }

    #[test]
    fn https_toggles() {
        assert_eq!(https(&parsed("https://example.com")), 1);
        assert_eq!(https(&parsed("http://example.com")), -1);
        assert_eq!(https(&parsed("example.com")), -1);
    }

    #[test]
    fn non_std_port_toggles() {
        assert_eq!(non_std_port(&parsed("http://example.com:8080/")), -1);
        assert_eq!(non_std_port(&parsed("http://example.com:80/")), 1);
        assert_eq!(non_std_port(&parsed("https://example.com:443/")), 1);
        assert_eq!(non_std_port(&parsed("http://example.com/")), 1);
    }

    #[test]
    fn https_domain_token_toggles() {
        assert_eq!(https_domain_token(&parsed("http://https-login.example.com")), -1);
        assert_eq!(https_domain_token(&parsed("https://example.com")), 1);
    }
}
