//! Food label scanning demo.
//!
//! A scan session simulates capturing or uploading a product photo and
//! shows a canned health assessment, keeping the last ten results in a
//! local history. Separately, a small HTTP proxy relays analyze requests to
//! a workflow-automation webhook.

pub mod cli;
pub mod config;
pub mod error;
pub mod proxy;
pub mod report;
pub mod scan;
pub mod server;
pub mod session;
pub mod store;
