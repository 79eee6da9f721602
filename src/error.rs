use crate::grammar::Symbol;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplingError {
    #[error("symbol {0} is not defined in the grammar")]
    UnknownSymbol(Symbol),

    #[error("rank {rank} is out of range for a definition of {count} strings")]
    RankOutOfRange { rank: u128, count: u128 },

    #[error("symbol {symbol} derives no strings of length {length}")]
    NoStringsOfLength { symbol: Symbol, length: usize },

    #[error("malformed rule in {symbol}: {reason}")]
    MalformedRule { symbol: Symbol, reason: String },

    #[error("non-terminal {symbol} is stored at position {position} of the grammar")]
    MisplacedNonTerminal { symbol: Symbol, position: usize },

    #[error("grammar has more than {limit} {kind} symbols")]
    SymbolSpaceExhausted { kind: &'static str, limit: usize },
}

pub type SamplingResult<T> = Result<T, SamplingError>;
