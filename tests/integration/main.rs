//! Integration tests
//!
//! The upstream quote API is mocked with wiremock; the router is driven
//! through axum-test.

mod api_test;
mod e2e_test;
mod support;
