//! Tally LLM - Text generation collaborator
//!
//! This crate provides the free-form text generation used for category
//! suggestions and spending advice:
//! - Generator: `TextGenerator` trait and the offline `DisabledGenerator`
//! - OpenAI: any OpenAI-compatible chat completions endpoint

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod generator;
pub mod openai;

pub use error::{Error, Result};
pub use generator::{DisabledGenerator, TextGenerator};
pub use openai::{OpenAiCompatibleConfig, OpenAiCompatibleGenerator};
