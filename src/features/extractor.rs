//! URL feature extractor.
//!
//! Composes the lexical, protocol/host, remote-metadata and content-based
//! signal families into one 30-wide ternary vector in layout order.
//!
//! Totality contract: `extract` never fails. Lexical signals are pure string
//! functions; every signal that needs the outside world goes through the
//! injected capabilities and degrades to indeterminate when they cannot
//! answer. The page is fetched at most once per extraction and shared by all
//! content signals.

use std::sync::Arc;

use super::content;
use super::layout::FEATURE_COUNT;
use super::lexical;
use super::lookup::{DomainIntel, PageFetcher};
use super::parse::ParsedUrl;
use super::remote;
use super::vector::{FeatureVector, Signal};

pub struct UrlFeatureExtractor {
    intel: Arc<dyn DomainIntel>,
    fetcher: Arc<dyn PageFetcher>,
}

impl UrlFeatureExtractor {
    pub fn new(intel: Arc<dyn DomainIntel>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { intel, fetcher }
    }

    /// Extract all 30 signals for a URL. Total for any input string.
    pub fn extract(&self, url: &str) -> FeatureVector {
        let parsed = ParsedUrl::parse(url);
        let host = parsed.host_without_www().to_string();

        // One fetch shared by the whole content family.
        let page = self.fetcher.fetch(&parsed.raw);
        let page = page.as_ref();

        let intel = self.intel.as_ref();

        let values: [Signal; FEATURE_COUNT] = [
            // Lexical
            lexical::using_ip(&parsed),
            lexical::long_url(&parsed),
            lexical::short_url(&parsed),
            lexical::symbol_at(&parsed),
            lexical::redirecting_slashes(&parsed),
            lexical::prefix_suffix(&parsed),
            lexical::sub_domains(&parsed),
            // Protocol/host
            lexical::https(&parsed),
            lexical::non_std_port(&parsed),
            lexical::https_domain_token(&parsed),
            // Remote metadata
            remote::domain_reg_len(intel, &host),
            remote::age_of_domain(intel, &host),
            remote::dns_record(intel, &host),
            remote::website_traffic(intel, &host),
            remote::page_rank(intel, &host),
            remote::google_index(intel, &parsed.raw),
            remote::links_pointing_to_page(intel, &parsed.raw),
            remote::abnormal_url(intel, &host),
            remote::stats_report(intel, &host),
            // Content
            content::favicon(page, &host),
            content::request_url(page, &host),
            content::anchor_url(page, &host),
            content::links_in_script_tags(page, &host),
            content::server_form_handler(page, &host),
            content::info_email(page),
            content::website_forwarding(page),
            content::status_bar_cust(page),
            content::disable_right_click(page),
            content::using_popup_window(page),
            content::iframe_redirection(page),
        ];

        FeatureVector::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::lookup::{FetchedPage, OfflineLookups};
    use crate::features::vector::is_valid_signal;

    struct FixedPage(String);

    impl PageFetcher for FixedPage {
        fn fetch(&self, _url: &str) -> Option<FetchedPage> {
            Some(FetchedPage {
                body: self.0.clone(),
                redirects: 0,
            })
        }
    }

    fn offline_extractor() -> UrlFeatureExtractor {
        UrlFeatureExtractor::new(Arc::new(OfflineLookups), Arc::new(OfflineLookups))
    }

    #[test]
    fn extract_is_total_and_in_range() {
        let extractor = offline_extractor();
        for url in [
            "https://www.example.com/login",
            "http://192.168.1.1:8080//redirect",
            "",
            "not a url at all",
            "bit.ly/x",
        ] {
            let vector = extractor.extract(url);
            assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
            assert!(vector.as_slice().iter().all(|&v| is_valid_signal(v)));
        }
    }

    #[test]
    fn extract_is_deterministic_offline() {
        let extractor = offline_extractor();
        let a = extractor.extract("https://www.example.com/login");
        let b = extractor.extract("https://www.example.com/login");
        assert_eq!(a, b);
    }

    #[test]
    fn lexical_signals_land_in_layout_order() {
        let extractor = offline_extractor();
        let vector = extractor.extract("http://user@https-login.paypal-secure.com:8081//next");

        assert_eq!(vector.get_by_name("SymbolAt"), Some(-1));
        assert_eq!(vector.get_by_name("PrefixSuffix"), Some(-1));
        assert_eq!(vector.get_by_name("Https"), Some(-1));
        assert_eq!(vector.get_by_name("NonStdPort"), Some(-1));
        assert_eq!(vector.get_by_name("HttpsDomainToken"), Some(-1));
    }

    #[test]
    fn remote_signals_neutral_when_offline() {
        let extractor = offline_extractor();
        let vector = extractor.extract("https://example.com/");
        for name in [
            "DomainRegLen",
            "AgeOfDomain",
            "DnsRecord",
            "WebsiteTraffic",
            "PageRank",
            "GoogleIndex",
            "LinksPointingToPage",
            "AbnormalUrl",
            "StatsReport",
        ] {
            assert_eq!(vector.get_by_name(name), Some(0), "{} should be neutral", name);
        }
    }

    #[test]
    fn content_signals_use_fetched_page() {
        let body = r#"<iframe src="http://evil.com"></iframe><a href="mailto:x@y.z">m</a>"#;
        let extractor = UrlFeatureExtractor::new(
            Arc::new(OfflineLookups),
            Arc::new(FixedPage(body.to_string())),
        );
        let vector = extractor.extract("https://example.com/");

        assert_eq!(vector.get_by_name("IframeRedirection"), Some(-1));
        assert_eq!(vector.get_by_name("InfoEmail"), Some(-1));
        assert_eq!(vector.get_by_name("WebsiteForwarding"), Some(1));
        assert_eq!(vector.get_by_name("StatusBarCust"), Some(1));
    }
}
