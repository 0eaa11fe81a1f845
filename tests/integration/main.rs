//! Integration tests

mod api_test;
mod e2e_test;
mod flow_test;
mod support;
