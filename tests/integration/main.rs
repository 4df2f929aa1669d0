//! Integration tests

mod cache_test;
mod e2e_test;
mod source_test;
