//! API integration tests
//!
//! Integration tests for all API endpoints

mod activity_test;
mod tasks_test;
