//! URL handling for request identity and asset resolution.

use url::Url;

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

fn check_scheme(url: Url) -> Result<Url, UrlError> {
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}

/// Canonicalize a URL string so equal requests share a cache identity.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host (done by the parser for http/https)
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = check_scheme(Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?)?;
    parsed.set_fragment(None);

    Ok(parsed)
}

/// Resolve an asset path against the worker origin.
///
/// Relative paths (`./`, `./app.js`, `icons/a.png`) and absolute paths
/// (`/manifest.json`) resolve like links on a page served from `origin`.
/// Absolute URLs are taken as-is.
pub fn resolve_asset(origin: &Url, path: &str) -> Result<Url, UrlError> {
    let trimmed = path.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut resolved = check_scheme(origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?)?;
    resolved.set_fragment(None);

    Ok(resolved)
}
