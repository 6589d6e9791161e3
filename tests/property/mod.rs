//! Property-based tests

mod conflict_proptest;
mod title_proptest;
