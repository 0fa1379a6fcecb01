//! Content-based signals.
//!
//! These parse the fetched page body with targeted regex scans. When no page
//! could be fetched every signal here is indeterminate; individual scans
//! never fail on malformed HTML because the patterns match what they match
//! and nothing more.

use once_cell::sync::Lazy;
use regex::Regex;

use super::lookup::FetchedPage;
use super::parse::ParsedUrl;
use super::vector::{Signal, INDETERMINATE};

static FAVICON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<link[^>]*rel\s*=\s*["'][^"']*icon[^"']*["'][^>]*href\s*=\s*["']([^"']+)["']"#)
        .expect("static regex")
});

static MEDIA_SRC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<(?:img|audio|embed|video|source|iframe)[^>]*src\s*=\s*["']([^"']+)["']"#)
        .expect("static regex")
});

static ANCHOR_HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a[^>]*href\s*=\s*["']([^"']*)["']"#).expect("static regex")
});

static LINK_SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<(?:link[^>]*href|script[^>]*src)\s*=\s*["']([^"']+)["']"#)
        .expect("static regex")
});

static FORM_ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<form[^>]*action\s*=\s*["']([^"']*)["']"#).expect("static regex")
});

static MAILTO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)mailto:|\bmail\(\)").expect("static regex"));

static STATUS_BAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)onmouseover\s*=\s*[^>]*window\.status").expect("static regex")
});

static RIGHT_CLICK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)event\.button\s*={1,3}\s*2|oncontextmenu\s*=\s*["']?\s*return false"#)
        .expect("static regex")
});

static POPUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bprompt\s*\(|window\.open\s*\(").expect("static regex"));

static IFRAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<iframe\b|frameborder").expect("static regex"));

/// Whether a referenced URL leaves the page's domain. Relative references,
/// fragments and same-host absolutes are internal.
fn is_external(reference: &str, page_host: &str) -> bool {
    let trimmed = reference.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return false;
    }
    // Protocol-relative ("//cdn.evil.com/x") carries a host and must be
    // checked before the single-slash relative case swallows it.
    let with_host = if let Some(rest) = trimmed.strip_prefix("//") {
        rest
    } else if trimmed.contains("://") {
        trimmed
    } else {
        // "/a", "./a", "../a", "img/logo.png" - all stay on the page's host.
        return false;
    };
    let parsed = ParsedUrl::parse(with_host);
    !parsed.host.is_empty() && parsed.host_without_www() != page_host
}

fn external_ratio(refs: &[&str], page_host: &str) -> Option<f32> {
    if refs.is_empty() {
        return None;
    }
    let external = refs.iter().filter(|r| is_external(r, page_host)).count();
    Some(external as f32 * 100.0 / refs.len() as f32)
}

/// Favicon served from the page's own domain.
pub fn favicon(page: Option<&FetchedPage>, page_host: &str) -> Signal {
    let Some(page) = page else { return INDETERMINATE };
    match FAVICON_RE.captures(&page.body) {
        Some(caps) => {
            if is_external(caps.get(1).map(|m| m.as_str()).unwrap_or(""), page_host) {
                -1
            } else {
                1
            }
        }
        None => 1,
    }
}

/// Share of media resources loaded from other domains.
pub fn request_url(page: Option<&FetchedPage>, page_host: &str) -> Signal {
    let Some(page) = page else { return INDETERMINATE };
    let refs: Vec<&str> = MEDIA_SRC_RE
        .captures_iter(&page.body)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    match external_ratio(&refs, page_host) {
        Some(pct) if pct < 22.0 => 1,
        Some(pct) if pct <= 61.0 => 0,
        Some(_) => -1,
        None => 1,
    }
}

/// Share of anchors that go nowhere or off-domain.
pub fn anchor_url(page: Option<&FetchedPage>, page_host: &str) -> Signal {
    let Some(page) = page else { return INDETERMINATE };
    let hrefs: Vec<&str> = ANCHOR_HREF_RE
        .captures_iter(&page.body)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if hrefs.is_empty() {
        return 1;
    }
    let suspicious = hrefs
        .iter()
        .filter(|h| {
            let h = h.trim();
            h.is_empty()
                || h == "#"
                || h.to_ascii_lowercase().starts_with("javascript:")
                || h.to_ascii_lowercase().starts_with("mailto:")
                || is_external(h, page_host)
        })
        .count();
    let pct = suspicious as f32 * 100.0 / hrefs.len() as f32;
    if pct < 31.0 {
        1
    } else if pct <= 67.0 {
        0
    } else {
        -1
    }
}

/// Share of `<link>`/`<script>` references pointing off-domain.
pub fn links_in_script_tags(page: Option<&FetchedPage>, page_host: &str) -> Signal {
    let Some(page) = page else { return INDETERMINATE };
    let refs: Vec<&str> = LINK_SCRIPT_RE
        .captures_iter(&page.body)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    match external_ratio(&refs, page_host) {
        Some(pct) if pct < 17.0 => 1,
        Some(pct) if pct <= 81.0 => 0,
        Some(_) => -1,
        None => 1,
    }
}

/// Where form submissions go: nowhere (-1), off-domain (0), same domain (1).
pub fn server_form_handler(page: Option<&FetchedPage>, page_host: &str) -> Signal {
    let Some(page) = page else { return INDETERMINATE };
    let mut worst: Signal = 1;
    for caps in FORM_ACTION_RE.captures_iter(&page.body) {
        let action = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        let signal = if action.is_empty() || action.eq_ignore_ascii_case("about:blank") {
            -1
        } else if is_external(action, page_host) {
            0
        } else {
            1
        };
        worst = worst.min(signal);
    }
    worst
}

/// mailto: links or server-side mail() in the body.
pub fn info_email(page: Option<&FetchedPage>) -> Signal {
    let Some(page) = page else { return INDETERMINATE };
    if MAILTO_RE.is_match(&page.body) {
        -1
    } else {
        1
    }
}

/// Redirect chain length observed while fetching.
pub fn website_forwarding(page: Option<&FetchedPage>) -> Signal {
    let Some(page) = page else { return INDETERMINATE };
    match page.redirects {
        0 | 1 => 1,
        2..=4 => 0,
        _ => -1,
    }
}

/// Scripts rewriting the status bar on hover.
pub fn status_bar_cust(page: Option<&FetchedPage>) -> Signal {
    let Some(page) = page else { return INDETERMINATE };
    if STATUS_BAR_RE.is_match(&page.body) {
        -1
    } else {
        1
    }
}

/// Right-click suppression.
pub fn disable_right_click(page: Option<&FetchedPage>) -> Signal {
    let Some(page) = page else { return INDETERMINATE };
    if RIGHT_CLICK_RE.is_match(&page.body) {
        -1
    } else {
        1
    }
}

/// Popup or prompt usage.
pub fn using_popup_window(page: Option<&FetchedPage>) -> Signal {
    let Some(page) = page else { return INDETERMINATE };
    if POPUP_RE.is_match(&page.body) {
        -1
    } else {
        1
    }
}

/// Iframe embedding.
pub fn iframe_redirection(page: Option<&FetchedPage>) -> Signal {
    let Some(page) = page else { return INDETERMINATE };
    if IFRAME_RE.is_match(&page.body) {
        -1
    } else {
        1
    }
}
