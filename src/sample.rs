use itertools::Itertools;

use crate::grammar::{Grammar, Symbol, Terminal};

/// Byte written for each position of a terminal that has no display text.
pub const OPAQUE_FILL: u8 = b'?';

/// Finite sequence of terminal tokens, owned by whoever asked for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TokenString {
    tokens: Vec<Symbol>,
}

impl TokenString {
    pub fn single(token: Symbol) -> Self {
        TokenString {
            tokens: vec![token],
        }
    }

    pub fn tokens(&self) -> &[Symbol] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn concat(&self, other: &TokenString) -> TokenString {
        let mut tokens = Vec::with_capacity(self.len() + other.len());
        tokens.extend_from_slice(&self.tokens);
        tokens.extend_from_slice(&other.tokens);
        TokenString { tokens }
    }

    pub fn push(&mut self, token: Symbol) {
        self.tokens.push(token)
    }

    /// Sum of the literal lengths of the tokens.
    pub fn literal_len(&self, grammar: &Grammar) -> usize {
        self.tokens
            .iter()
            .filter_map(|&t| grammar.terminal(t))
            .map(|t| t.length)
            .sum()
    }

    /// write the literal text of every token to buffer
    pub fn fold(&self, grammar: &Grammar, buffer: &mut Vec<u8>) {
        for &token in &self.tokens {
            match grammar.terminal(token) {
                Some(Terminal {
                    text: Some(text), ..
                }) => {
                    buffer.extend_from_slice(text);
                }
                Some(Terminal { length, text: None }) => {
                    buffer.extend(std::iter::repeat(OPAQUE_FILL).take(*length));
                }
                None => {
                    // not a terminal of this grammar, keep the raw token so nothing is lost
                    buffer.push(token.raw());
                }
            }
        }
    }

    pub fn render(&self, grammar: &Grammar) -> Vec<u8> {
        let mut folded = vec![];
        self.fold(grammar, &mut folded);
        folded
    }

    pub fn render_lossy(&self, grammar: &Grammar) -> String {
        String::from_utf8_lossy(&self.render(grammar)).into_owned()
    }

    /// Tokens as raw hex values, the way the token alphabet is written down.
    pub fn hex(&self) -> String {
        self.tokens.iter().map(|t| t.to_string()).join(" ")
    }

    /// Tokens described one by one, separated by spaces.
    pub fn describe(&self, grammar: &Grammar) -> String {
        self.tokens.iter().map(|&t| grammar.describe(t)).join(" ")
    }
}

impl From<Vec<Symbol>> for TokenString {
    fn from(tokens: Vec<Symbol>) -> Self {
        TokenString { tokens }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;

    #[test]
    fn renders_literals_and_opaque_terminals() {
        let mut b = GrammarBuilder::new();
        let root = b.non_terminal("root").unwrap();
        let hello = b.literal("hello").unwrap();
        let blob = b.terminal(Terminal::opaque(3)).unwrap();
        b.rule(root, vec![hello, blob]).unwrap();
        let g = b.build().unwrap();

        let s = TokenString::from(vec![hello, blob, hello]);
        assert_eq!(s.render(&g), b"hello???hello");
        assert_eq!(s.literal_len(&g), 13);
        assert_eq!(s.len(), 3);
        assert_eq!(s.describe(&g), "\"hello\" bytes(3) \"hello\"");
    }

    #[test]
    fn concat_keeps_order() {
        let a = Symbol::terminal(1).unwrap();
        let b = Symbol::terminal(2).unwrap();
        let joined = TokenString::single(a).concat(&TokenString::single(b));
        assert_eq!(joined.tokens(), &[a, b]);
        assert_eq!(joined.hex(), "0x01 0x02");
    }
}
