//! Unit tests for [`RequestParts`].

use rstest::rstest;

use super::*;

#[rstest]
fn header_lookup_is_case_insensitive() {
    let parts = RequestParts::new("GET", "/").with_header("Content-Type", "application/json");
    assert_eq!(parts.header("content-type"), Some("application/json"));
    assert_eq!(parts.header("CONTENT-TYPE"), Some("application/json"));
    assert!(parts.headers().contains_key("content-type"));
}

#[rstest]
fn empty_header_counts_as_absent() {
    let parts = RequestParts::new("GET", "/").with_header("x-request-id", "");
    assert_eq!(parts.header("x-request-id"), None);
}

#[rstest]
#[case(RequestParts::new("GET", "/").with_header("x-request-id", "hdr").with_id("fw"), Some("hdr"))]
#[case(RequestParts::new("GET", "/").with_id("fw"), Some("fw"))]
#[case(RequestParts::new("GET", "/").with_header("x-request-id", "").with_id("fw"), Some("fw"))]
#[case(RequestParts::new("GET", "/"), None)]
fn request_id_precedence(#[case] parts: RequestParts, #[case] expected: Option<&str>) {
    assert_eq!(parts.request_id(), expected);
}

#[rstest]
#[case(RequestParts::new("GET", "/").with_header("x-forwarded-for", "1.1.1.1, 2.2.2.2").with_ip("9.9.9.9"), "1.1.1.1")]
#[case(RequestParts::new("GET", "/").with_ip("9.9.9.9"), "9.9.9.9")]
#[case(RequestParts::new("GET", "/"), UNKNOWN)]
fn client_ip_precedence(#[case] parts: RequestParts, #[case] expected: &str) {
    assert_eq!(parts.client_ip(), expected);
}

#[rstest]
fn url_is_preferred_over_path() {
    let parts = RequestParts::new("GET", "/users");
    assert_eq!(parts.url_or_path(), "/users");
    let parts = parts.with_url("/users?page=2");
    assert_eq!(parts.url_or_path(), "/users?page=2");
    assert_eq!(parts.path(), "/users");
}

#[rstest]
fn user_agent_defaults_to_unknown() {
    assert_eq!(RequestParts::new("GET", "/").user_agent(), UNKNOWN);
    let parts = RequestParts::new("GET", "/").with_header("User-Agent", "curl/8.0");
    assert_eq!(parts.user_agent(), "curl/8.0");
}

#[rstest]
fn insert_header_replaces_value() {
    let mut parts = RequestParts::new("POST", "/items").with_header("X-Api-Key", "old");
    parts.insert_header("x-api-key", "new");
    assert_eq!(parts.header("X-API-KEY"), Some("new"));
    assert_eq!(parts.headers().len(), 1);
}

#[rstest]
fn authenticated_user_is_carried() {
    let parts = RequestParts::new("GET", "/");
    assert_eq!(parts.user(), None);

    let parts = parts.with_user(
        AuthenticatedUser::new("u-7")
            .with_roles(["editor"])
            .with_permissions(["posts:write"]),
    );
    let user = parts.user().expect("user attached");
    assert_eq!(user.id(), "u-7");
    assert!(user.has_role("editor"));
    assert!(!user.has_role("admin"));
    assert!(user.has_permission("posts:write"));
}
