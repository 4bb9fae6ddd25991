//! Web front end for bedchat: session registry and HTTP API.
//!
//! The `bedchat` binary in this crate adds the CLI on top.

pub mod http;
pub mod state;
