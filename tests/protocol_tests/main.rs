//! Protocol test suite

#[path = "../common/mod.rs"]
mod common;
