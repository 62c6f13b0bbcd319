//! Command implementations for the capstan CLI.

pub mod apply;
pub mod delete;
pub mod get;
pub mod install;
pub mod project;
pub mod version;
