#![allow(dead_code)]

pub mod fake_provider;
pub mod harness;

pub use fake_provider::{FakeProvider, ProviderOp};
pub use harness::{Harness, seed_local, test_config};
