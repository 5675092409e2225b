//! Database access for medidir-pd

pub mod profiles;
