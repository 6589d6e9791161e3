//! Integration tests against the full router over an in-memory store

pub mod api;
