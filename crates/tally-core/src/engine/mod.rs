//! Dialogue Engine - conversational state machine
//!
//! Given the open sessions, the classified intent and the raw message, decides
//! the next state, writes records through the [`RecordStore`](crate::records::RecordStore)
//! and produces the response.
//!
//! # Module Structure
//!
//! - `config`: `EngineConfig`, `TurnRequest`, `TurnResponse`
//! - `core`: `DialogueEngine` struct and builder methods
//! - `process`: `handle_turn` and session/intent precedence
//! - `add_flow`: guided add-expense steps
//! - `edit_flow`: field selection and value application
//! - `smart`: date-phrase lookup and pending confirmations
//! - `listing`: recent expenses and numbered commands
//! - `insights`: analysis and advice answers
//!
//! # Turn precedence
//!
//! 1. An open pending confirmation gets the first look at the message
//! 2. An open add/edit flow continues unless the message is cancel or an escape-hatch question
//! 3. Otherwise the classified intent is dispatched
//!
//! Turns of the same `(user, conversation)` are serialized by a per-conversation lock.

mod add_flow;
mod config;
mod core;
mod edit_flow;
mod helpers;
mod insights;
mod listing;
mod process;
mod smart;
mod types;


pub use config::{EngineConfig, TurnRequest, TurnResponse, DEFAULT_CONVERSATION_ID};
pub use core::DialogueEngine;
