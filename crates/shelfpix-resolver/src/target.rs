use reqwest::Url;

use crate::error::ResolverError;

/// Canonical product-page template for identifier-based lookups. The
/// identifier is interpolated into a fixed origin, so it cannot redirect the
/// fetch to a different host.
const PRODUCT_PAGE_ORIGIN: &str = "https://www.amazon.com/dp/";

/// Reference to the page a resolution should run against: either a raw URL
/// supplied by the caller, or an opaque product identifier (ASIN).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    Url(String),
    Asin(String),
}

impl FetchTarget {
    /// Resolves the target to a single absolute `http`/`https` URL.
    ///
    /// This is the sole SSRF guard: anything that does not parse as an
    /// absolute URL with an allowed scheme is rejected here, before any
    /// network I/O.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::InvalidTarget`] for malformed URLs,
    /// disallowed schemes (`file:`, `data:`, `javascript:`, ...), or a blank
    /// product identifier.
    pub fn resolve(&self) -> Result<Url, ResolverError> {
        match self {
            FetchTarget::Url(raw) => {
                let url = Url::parse(raw).map_err(|e| ResolverError::InvalidTarget {
                    target: raw.clone(),
                    reason: e.to_string(),
                })?;
                match url.scheme() {
                    "http" | "https" => Ok(url),
                    other => Err(ResolverError::InvalidTarget {
                        target: raw.clone(),
                        reason: format!("scheme \"{other}\" is not allowed"),
                    }),
                }
            }
            FetchTarget::Asin(asin) => {
                let asin = asin.trim();
                if asin.is_empty() {
                    return Err(ResolverError::InvalidTarget {
                        target: String::new(),
                        reason: "product identifier is empty".to_string(),
                    });
                }
                let raw = format!("{PRODUCT_PAGE_ORIGIN}{asin}");
                Url::parse(&raw).map_err(|e| ResolverError::InvalidTarget {
                    target: asin.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
