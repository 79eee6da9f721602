//! Exact-length counting, enumeration and uniform sampling of the strings a
//! context-free grammar derives.

pub mod configuration;
pub mod error;
pub mod flags;
pub mod grammar;
pub mod log;
pub mod sample;
pub mod sampling;

pub(crate) use crate::log::log;

pub use error::{SamplingError, SamplingResult};
pub use grammar::{parse_grammar, Grammar, GrammarBuilder, LoadedGrammar, Symbol, Terminal};
pub use sample::TokenString;
pub use sampling::Session;
