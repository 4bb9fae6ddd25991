//! Per-session conversation handling for bedchat.
//!
//! `ConversationBuffer` holds the turns, `TurnAdapter` owns a buffer and runs
//! each user message through the remote model, and `ErrorTurnFormatter`
//! decides how failures read to the end user.

pub mod adapter;
pub mod buffer;
pub mod format;
