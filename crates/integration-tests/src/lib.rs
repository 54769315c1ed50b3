//! End-to-end tests for the Harbor storefront.
//!
//! The tests drive a running storefront over HTTP with a cookie-keeping
//! client, the way a browser with htmx would.
//!
//! # Running Tests
//!
//! ```bash
//! # Session table, then the storefront against a staging API
//! cargo run -p harbor-cli -- migrate
//! cargo run -p harbor-storefront
//!
//! # In another shell
//! cargo test -p harbor-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_TEST_URL` - Storefront under test (default: <http://localhost:3000>)
//! - `HARBOR_TEST_VARIANT_ID` - An in-stock variant to put in the cart
//! - `HARBOR_TEST_PROVINCE`, `HARBOR_TEST_DISTRICT`, `HARBOR_TEST_WARD` - A
//!   deliverable location, as region codes

use reqwest::{Client, redirect};

/// Storefront base URL, without a trailing slash.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_TEST_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Read a required test fixture from the environment.
///
/// # Panics
///
/// Panics with the variable name when it is not set.
#[must_use]
pub fn fixture(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| panic!("{key} must be set for this test"))
}

/// A client that keeps the session cookie and does not follow redirects,
/// so tests can assert on `Location`.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Form body for one checkout field edit.
#[must_use]
pub fn field_edit<'a>(field: &'a str, value: &'a str) -> [(&'a str, &'a str); 2] {
    [("field", field), ("value", value)]
}
