use std::collections::HashMap;
use std::fmt::Display;

use crate::error::{SamplingError, SamplingResult};

/// 8-bit grammar token. The top bit tags non-terminals, the low bits are an
/// index into the grammar's non-terminal list or terminal table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u8);

impl Symbol {
    pub const NON_TERMINAL_TAG: u8 = 0x80;
    pub const INDEX_MASK: u8 = 0x7f;
    /// Number of symbols available to each kind.
    pub const CAPACITY: usize = 0x80;

    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn terminal(index: usize) -> Option<Self> {
        (index < Self::CAPACITY).then(|| Symbol(index as u8))
    }

    pub fn non_terminal(index: usize) -> Option<Self> {
        (index < Self::CAPACITY).then(|| Symbol(Self::NON_TERMINAL_TAG | index as u8))
    }

    pub fn is_terminal(self) -> bool {
        self.0 & Self::NON_TERMINAL_TAG == 0
    }

    pub fn is_non_terminal(self) -> bool {
        !self.is_terminal()
    }

    pub fn index(self) -> usize {
        (self.0 & Self::INDEX_MASK) as usize
    }

    /// Position in the grammar's non-terminal list, if this is a non-terminal.
    pub fn non_terminal_index(self) -> Option<usize> {
        self.is_non_terminal().then(|| self.index())
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

pub type Rule = Vec<Symbol>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Terminal {
    pub length: usize,
    pub text: Option<Vec<u8>>,
}

impl Terminal {
    pub fn literal<T: Into<Vec<u8>>>(text: T) -> Self {
        let text = text.into();
        Terminal {
            length: text.len(),
            text: Some(text),
        }
    }

    /// Terminal of known length without display text.
    pub fn opaque(length: usize) -> Self {
        Terminal { length, text: None }
    }
}

#[derive(Clone, Debug)]
pub struct NonTerminal {
    pub id: Symbol,
    pub name: String,
    pub alternatives: Vec<Rule>,
}

#[derive(Clone, Debug, Default)]
pub struct TerminalTable {
    entries: HashMap<Symbol, Terminal>,
}

impl TerminalTable {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, symbol: Symbol, terminal: Terminal) -> Option<Terminal> {
        self.entries.insert(symbol, terminal)
    }

    pub fn get(&self, symbol: Symbol) -> Option<&Terminal> {
        self.entries.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable grammar consumed by sampling sessions.
#[derive(Clone, Debug)]
pub struct Grammar {
    non_terminals: Vec<NonTerminal>,
    terminals: TerminalTable,
}

impl Grammar {
    /// Checks the indexing invariant and that every rule is non-empty and
    /// only mentions known symbols.
    pub fn new(non_terminals: Vec<NonTerminal>, terminals: TerminalTable) -> SamplingResult<Self> {
        if non_terminals.len() > Symbol::CAPACITY {
            return Err(SamplingError::SymbolSpaceExhausted {
                kind: "non-terminal",
                limit: Symbol::CAPACITY,
            });
        }

        for (position, nt) in non_terminals.iter().enumerate() {
            if nt.id.non_terminal_index() != Some(position) {
                return Err(SamplingError::MisplacedNonTerminal {
                    symbol: nt.id,
                    position,
                });
            }
        }

        if let Some((&symbol, _)) = terminals.entries.iter().find(|(s, _)| s.is_non_terminal()) {
            return Err(SamplingError::MalformedRule {
                symbol,
                reason: "non-terminal symbol stored in terminal table".to_string(),
            });
        }

        let grammar = Grammar {
            non_terminals,
            terminals,
        };

        for nt in &grammar.non_terminals {
            if nt.alternatives.is_empty() {
                return Err(SamplingError::MalformedRule {
                    symbol: nt.id,
                    reason: format!("`{}` has no alternatives", nt.name),
                });
            }

            for (variant, rule) in nt.alternatives.iter().enumerate() {
                if rule.is_empty() {
                    return Err(SamplingError::MalformedRule {
                        symbol: nt.id,
                        reason: format!("alternative {variant} of `{}` is empty", nt.name),
                    });
                }

                if let Some(&unknown) = rule.iter().find(|&&s| !grammar.contains(s)) {
                    return Err(SamplingError::UnknownSymbol(unknown));
                }
            }
        }

        Ok(grammar)
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        match symbol.non_terminal_index() {
            Some(idx) => idx < self.non_terminals.len(),
            None => self.terminals.get(symbol).is_some(),
        }
    }

    pub fn non_terminal(&self, symbol: Symbol) -> Option<&NonTerminal> {
        self.non_terminals.get(symbol.non_terminal_index()?)
    }

    pub fn terminal(&self, symbol: Symbol) -> Option<&Terminal> {
        if symbol.is_terminal() {
            self.terminals.get(symbol)
        } else {
            None
        }
    }

    pub fn non_terminals(&self) -> &[NonTerminal] {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &TerminalTable {
        &self.terminals
    }

    pub fn symbol_by_name(&self, name: &str) -> Option<Symbol> {
        self.non_terminals
            .iter()
            .find(|nt| nt.name == name)
            .map(|nt| nt.id)
    }

    /// Human readable name of a symbol, used in diagnostics.
    pub fn describe(&self, symbol: Symbol) -> String {
        if let Some(nt) = self.non_terminal(symbol) {
            return format!("<{}>", nt.name);
        }

        match self.terminal(symbol) {
            Some(Terminal { text: Some(text), .. }) => {
                format!("{:?}", String::from_utf8_lossy(text))
            }
            Some(Terminal { length, text: None }) => format!("bytes({length})"),
            None => symbol.to_string(),
        }
    }
}

/// Assigns symbol indices in creation order so the grammar invariant holds by
/// construction. Equal literal terminals share one symbol.
#[derive(Default)]
pub struct GrammarBuilder {
    names: HashMap<String, Symbol>,
    non_terminals: Vec<NonTerminal>,
    terminal_keys: HashMap<Terminal, Symbol>,
    terminals: TerminalTable,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the symbol of the named non-terminal, declaring it if needed.
    pub fn non_terminal(&mut self, name: &str) -> SamplingResult<Symbol> {
        if let Some(&symbol) = self.names.get(name) {
            return Ok(symbol);
        }

        let symbol = Symbol::non_terminal(self.non_terminals.len()).ok_or(
            SamplingError::SymbolSpaceExhausted {
                kind: "non-terminal",
                limit: Symbol::CAPACITY,
            },
        )?;

        self.names.insert(name.to_string(), symbol);
        self.non_terminals.push(NonTerminal {
            id: symbol,
            name: name.to_string(),
            alternatives: vec![],
        });
        Ok(symbol)
    }

    pub fn terminal(&mut self, terminal: Terminal) -> SamplingResult<Symbol> {
        if let Some(&symbol) = self.terminal_keys.get(&terminal) {
            return Ok(symbol);
        }

        let symbol =
            Symbol::terminal(self.terminals.len()).ok_or(SamplingError::SymbolSpaceExhausted {
                kind: "terminal",
                limit: Symbol::CAPACITY,
            })?;

        self.terminal_keys.insert(terminal.clone(), symbol);
        self.terminals.insert(symbol, terminal);
        Ok(symbol)
    }

    pub fn literal(&mut self, text: &str) -> SamplingResult<Symbol> {
        self.terminal(Terminal::literal(text))
    }

    pub fn rule(&mut self, lhs: Symbol, rhs: Rule) -> SamplingResult<&mut Self> {
        let nt = lhs
            .non_terminal_index()
            .and_then(|idx| self.non_terminals.get_mut(idx))
            .ok_or(SamplingError::UnknownSymbol(lhs))?;

        nt.alternatives.push(rhs);
        Ok(self)
    }

    pub fn build(self) -> SamplingResult<Grammar> {
        Grammar::new(self.non_terminals, self.terminals)
    }
}
