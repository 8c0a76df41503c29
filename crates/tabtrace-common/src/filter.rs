//! Noise-filtering policy for captured network traffic.
//!
//! The decision is made once, when the request starts, and is never
//! recomputed for that request.

use url::Url;

/// Methods that mutate server state are always logged.
const MUTATING_METHODS: &[&str] = &["POST", "PUT", "PATCH", "DELETE"];

/// Same-origin requests for these path suffixes are asset fetches, not
/// application traffic.
const STATIC_EXTENSIONS: &[&str] = &[
    ".js", ".mjs", ".jsx", ".ts", ".tsx", ".css", ".scss", ".sass", ".png", ".jpg", ".jpeg",
    ".gif", ".svg", ".ico", ".webp", ".woff", ".woff2", ".ttf", ".otf", ".eot", ".map",
];

/// Vite HMR and pre-bundled module paths.
const DEV_SERVER_FRAGMENTS: &[&str] = &["/@vite/", "/node_modules/.vite/"];

/// Decides whether a request is material enough to persist.
///
/// `status` is only known at response time, so the request-start call always
/// passes `None` and the status clause never fires there. The network capture
/// applies the status ≥ 400 check itself when the response for a suppressed
/// request arrives, writing a degraded failure block without revisiting this
/// decision. `page_url` is the URL of the page issuing the request, used for
/// the cross-origin check.
pub fn should_log(method: &str, url: &str, status: Option<i64>, page_url: Option<&str>) -> bool {
    if MUTATING_METHODS.contains(&method.to_ascii_uppercase().as_str()) {
        return true;
    }

    if let Some(status) = status
        && status >= 400
    {
        return true;
    }

    // Fail open: a URL we cannot parse is a URL we cannot classify.
    let Ok(request_url) = Url::parse(url) else {
        return true;
    };

    let page_origin = page_url
        .filter(|u| *u != "about:blank")
        .and_then(|u| Url::parse(u).ok())
        .map(|u| u.origin());

    // Cross-origin traffic is likely an API call.
    if let Some(page_origin) = page_origin
        && request_url.origin() != page_origin
    {
        return true;
    }

    let path = request_url.path().to_ascii_lowercase();
    if STATIC_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return false;
    }
    if DEV_SERVER_FRAGMENTS.iter().any(|frag| path.contains(frag)) {
        return false;
    }

    // Everything else: documents, API endpoints, websockets handshakes.
    true
}
