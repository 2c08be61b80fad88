//! bilingo: bilingual reading and listening material from arbitrary text.
//!
//! Source text is cut into bounded chunks along paragraph and sentence
//! boundaries ([`text`]), translated into syntagma pairs by an LLM
//! ([`translate`]), rendered as SSML ([`ssml`]) and synthesized in
//! provider-sized pieces split on voice turns ([`tts`]).

pub mod bilingual;
pub mod config;
pub mod error;
pub mod lemma;
pub mod ssml;
pub mod text;
pub mod translate;
pub mod tts;

pub use error::{Error, Result};
