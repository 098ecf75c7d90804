//! macOS native application bundle.

pub mod app;
