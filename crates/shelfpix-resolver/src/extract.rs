//! Ordered extraction heuristics over fetched page markup.
//!
//! Strategies are tried in fixed priority order with early exit on the first
//! match: structured metadata first, then a marketplace-specific raw-text
//! scan, then a last-resort width heuristic over `<img>` tags. Each strategy
//! is a pure function of the document, so ordering and tie-break policy stay
//! explicit and independently testable.

use std::sync::LazyLock;

use regex::Regex;

use crate::client::PageDocument;

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));
static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("valid regex"));

/// Product-page URL shapes for the marketplace fallback tier.
static MARKETPLACE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)amazon\.[a-z.]+/.*(/dp/|/gp/product/|/product/)").expect("valid regex")
});

/// Direct og:image pattern over raw text. The marketplace tier bypasses tag
/// scanning because the relevant data can sit inside embedded script
/// payloads.
static RAW_OG_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta property="og:image" content="([^"]+)""#).expect("valid regex")
});

/// Embedded JSON fragment carrying the marketplace media-CDN image.
static LARGE_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""large":"(https://m\.media-amazon\.com/images/I/[^"]+)""#).expect("valid regex")
});

/// Minimum declared `width` for an `<img>` to count as a primary content
/// image rather than an icon or ad.
const MIN_CONTENT_IMAGE_WIDTH: i64 = 300;

type Strategy = fn(&PageDocument) -> Option<String>;

/// Priority order is a reliability tier: most structured source first.
const STRATEGIES: &[Strategy] = &[meta_image_tags, marketplace_embed, first_wide_image];

/// Runs the strategy chain against a fetched document and returns the first
/// absolute image URL any strategy yields.
///
/// `None` is the valid not-found outcome, distinct from a fetch failure.
#[must_use]
pub fn extract_image_url(doc: &PageDocument) -> Option<String> {
    STRATEGIES.iter().find_map(|strategy| strategy(doc))
}

/// Tier 1: Open-Graph image tag, then Twitter-card image tag.
///
/// Query strings are stripped before resolution: they usually encode
/// transient sizing or caching tokens that do not affect image identity.
fn meta_image_tags(doc: &PageDocument) -> Option<String> {
    let raw = find_meta_content(&doc.html, "property", "og:image")
        .or_else(|| find_meta_content(&doc.html, "name", "twitter:image"))?;
    absolutize(doc.base_url.as_str(), strip_query(&raw))
}

/// Tier 2: marketplace product pages sometimes omit clean metadata tags while
/// still embedding the image reference in inline script data, so re-scan the
/// raw markup text directly.
fn marketplace_embed(doc: &PageDocument) -> Option<String> {
    if !MARKETPLACE_URL_RE.is_match(doc.base_url.as_str()) {
        return None;
    }

    RAW_OG_IMAGE_RE
        .captures(&doc.html)
        .or_else(|| LARGE_IMAGE_RE.captures(&doc.html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Tier 3: first `<img>` in document order whose declared width exceeds the
/// content threshold. Tags without a width attribute count as width 0.
fn first_wide_image(doc: &PageDocument) -> Option<String> {
    for m in IMG_TAG_RE.find_iter(&doc.html) {
        let tag = m.as_str();
        let width = extract_attr(tag, "width")
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        if width <= MIN_CONTENT_IMAGE_WIDTH {
            continue;
        }
        if let Some(url) = extract_attr(tag, "src")
            .and_then(|src| absolutize(doc.base_url.as_str(), &src))
        {
            return Some(url);
        }
    }
    None
}

fn find_meta_content(html: &str, key_attr: &str, key_value: &str) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let key = extract_attr(tag, key_attr)?;
        if key.eq_ignore_ascii_case(key_value) {
            extract_attr(tag, "content")
        } else {
            None
        }
    })
}

fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    let pattern = format!(r#"(?is)\b{}\s*=\s*["']([^"']+)["']"#, regex::escape(attr));
    let re = Regex::new(&pattern).expect("valid attr regex");
    re.captures(tag)
        .and_then(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
}

fn strip_query(value: &str) -> &str {
    match value.split_once('?') {
        Some((head, _)) => head,
        None => value,
    }
}

/// Resolves protocol-relative (`//host/p`) and root-relative (`/p`) forms
/// against the final request URL. Candidates that still fail to resolve are
/// skipped.
fn absolutize(base_url: &str, candidate: &str) -> Option<String> {
    let candidate = candidate.replace("&amp;", "&");
    let base = reqwest::Url::parse(base_url).ok()?;
    base.join(&candidate).ok().map(|u| u.to_string())
}
