//! Navigation interception policy.
//!
//! Pure decisions over already-resolved URL parts; the web crate extracts
//! these from the anchor and the current location and performs the actual
//! fetch/swap.

pub const TRANSITION_MS: i32 = 150;

/// Final path extensions that always take a full page load.
pub const SKIP_EXTENSIONS: &[&str] = &[
    "xml", "pdf", "svg", "png", "jpg", "jpeg", "gif", "zip", "tar", "gz", "json",
];

/// Head elements reconciled after every soft navigation, one selector at a
/// time: the old node is removed and the fetched one cloned in.
pub const HEAD_SELECTORS: &[&str] = &[
    "meta[name=\"description\"]",
    "link[rel=\"canonical\"]",
    "meta[property=\"og:title\"]",
    "meta[property=\"og:description\"]",
    "meta[property=\"og:type\"]",
    "meta[property=\"og:locale\"]",
    "meta[property=\"og:url\"]",
    "meta[property=\"og:image\"]",
    "meta[name=\"twitter:card\"]",
    "meta[name=\"twitter:title\"]",
    "meta[name=\"twitter:description\"]",
    "meta[name=\"twitter:image\"]",
    "script[type=\"application/ld+json\"]",
];

pub const MAIN_SELECTOR: &str = "main.main";
pub const NAV_LINKS_SELECTOR: &str = ".nav__links a";
pub const ACTIVE_CLASS: &str = "active";

/// Dispatched on the document after every completed soft navigation.
pub const NAVIGATE_EVENT: &str = "spa:navigate";

/// Resolved pieces of a candidate link destination.
#[derive(Clone, Copy, Debug)]
pub struct LinkCandidate<'a> {
    pub origin: &'a str,
    pub pathname: &'a str,
    pub hash: &'a str,
    pub target_blank: bool,
    pub download: bool,
}

/// Whether a click on this link should be intercepted and soft-navigated.
pub fn should_intercept(link: &LinkCandidate, page_origin: &str, page_pathname: &str) -> bool {
    if link.target_blank || link.download {
        return false;
    }
    if link.origin != page_origin {
        return false;
    }
    if has_skipped_extension(link.pathname) {
        return false;
    }
    // Hash link within the current page: let the browser handle it.
    if link.pathname == page_pathname && !link.hash.is_empty() {
        return false;
    }
    true
}

pub fn has_skipped_extension(pathname: &str) -> bool {
    let lower = pathname.to_ascii_lowercase();
    lower
        .rsplit_once('.')
        .is_some_and(|(_, ext)| SKIP_EXTENSIONS.contains(&ext))
}

/// Fragment responses must be HTML; anything else falls back to a full load.
pub fn is_html_content_type(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.to_ascii_lowercase().contains("text/html"))
}
