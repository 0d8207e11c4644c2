//! Command implementations that are not plain repository calls.

pub mod init;
