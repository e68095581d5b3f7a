//! Shared runtime plumbing for the scanner workspace.

pub mod logger;
