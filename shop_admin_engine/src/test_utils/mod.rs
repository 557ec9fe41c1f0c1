//! Utilities for standing up throwaway test databases and seeding them with orders, users,
//! products and notifications. Compiled unconditionally so downstream crates' tests can use them;
//! nothing in here is reachable from production code paths.

pub mod prepare_env;
pub mod seed;

pub use prepare_env::{prepare_test_env, random_db_path};
