//! Database initialization and schema

pub mod init;

pub use init::{create_profiles_table, init_database};
