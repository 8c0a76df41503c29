//! End-to-end checks of the filtering policy against realistic dev sessions.

use tabtrace_common::filter::should_log;

const DASHBOARD: Option<&str> = Some("https://app.local/dashboard");

#[test]
fn bundle_fetch_from_own_origin_is_filtered() {
    assert!(!should_log("GET", "https://app.local/bundle.js", None, DASHBOARD));
}

#[test]
fn external_api_call_is_logged() {
    assert!(should_log("GET", "https://api.external.com/users", None, DASHBOARD));
}

#[test]
fn json_post_to_own_origin_is_logged() {
    assert!(should_log("POST", "https://app.local/save", None, DASHBOARD));
}

#[test]
fn decision_ignores_query_strings() {
    assert!(!should_log(
        "GET",
        "https://app.local/bundle.js?v=abc123",
        None,
        DASHBOARD
    ));
    assert!(should_log(
        "GET",
        "https://app.local/api/search?q=js",
        None,
        DASHBOARD
    ));
}

#[test]
fn page_without_url_still_filters_static_paths() {
    assert!(!should_log("GET", "https://app.local/app.css", None, None));
    assert!(should_log("GET", "https://app.local/api/users", None, None));
}
