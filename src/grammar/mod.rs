pub mod generation;
mod model;
mod parse;
mod validate_grammar;

use anyhow::Context;

use parse::grammar_parser::grammar;

pub use model::{Grammar, GrammarBuilder, NonTerminal, Rule, Symbol, Terminal, TerminalTable};
pub use parse::{RawGrammar, Token};

use crate::flags::{Flags, KNOWN_FLAGS};

pub use generation::{Generator, TreeNode};

/// Start symbol used when neither the grammar header nor the caller names one.
pub const DEFAULT_START: &str = "root";

#[derive(Clone, Debug)]
pub struct LoadedGrammar {
    pub grammar: Grammar,
    pub start: Symbol,
    pub options: Flags,
}

/// Parses, validates and indexes a grammar file. `start` overrides the
/// `start` option of the file header.
pub fn parse_grammar(content: &str, start: Option<&str>) -> Result<LoadedGrammar, anyhow::Error> {
    let parsed = grammar(content)?;

    for key in parsed.options.unknown_keys(KNOWN_FLAGS) {
        crate::log!("ignoring unknown grammar option `{key}`");
    }

    let start = start
        .map(str::to_string)
        .or_else(|| parsed.options.get("start"))
        .unwrap_or_else(|| DEFAULT_START.to_string());

    validate_grammar::validate_raw_grammar(&parsed, &start)?;

    let grammar = index_grammar(&parsed).context("assigning grammar symbols")?;

    validate_grammar::check_productive(&grammar)?;

    let start = grammar
        .symbol_by_name(&start)
        .with_context(|| format!("start symbol `{start}` vanished while indexing"))?;

    crate::log!(
        "loaded grammar with {} non-terminals and {} terminals",
        grammar.non_terminals().len(),
        grammar.terminals().len()
    );

    Ok(LoadedGrammar {
        grammar,
        start,
        options: parsed.options,
    })
}

/// Non-terminals are numbered in order of definition, terminals in order of
/// first use.
fn index_grammar(raw: &RawGrammar) -> Result<Grammar, anyhow::Error> {
    let mut builder = GrammarBuilder::new();

    for production in &raw.productions {
        builder.non_terminal(&production.lhs)?;
    }

    for production in &raw.productions {
        let lhs = builder.non_terminal(&production.lhs)?;

        for rhs in &production.rhs {
            let rule = rhs
                .iter()
                .map(|token| match token {
                    Token::Identifier(name) => builder.non_terminal(name),
                    Token::String(s) => builder.literal(s),
                    Token::Hex(bytes) => builder.terminal(Terminal::literal(bytes.clone())),
                    Token::Bytes(length) => builder.terminal(Terminal::opaque(*length)),
                })
                .collect::<Result<Rule, _>>()?;

            builder.rule(lhs, rule)?;
        }
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTENCES: &str = r#"
        start = "start"
        start       -> sentence ;
        sentence    -> noun_phrase verb ;
        noun_phrase -> article noun ;
        verb        -> "stands" | "walks" | "jumps" ;
        article     -> "a" | "the" ;
        noun        -> "horse" | "dog" | "hamster" ;
    "#;

    #[test]
    fn indexes_in_definition_order() {
        let loaded = parse_grammar(SENTENCES, None).unwrap();
        let g = &loaded.grammar;

        assert_eq!(loaded.start.raw(), 0x80);
        assert_eq!(g.symbol_by_name("sentence").unwrap().raw(), 0x81);
        assert_eq!(g.symbol_by_name("noun").unwrap().raw(), 0x85);
        assert_eq!(g.terminals().len(), 8);

        let verb = g.non_terminal(g.symbol_by_name("verb").unwrap()).unwrap();
        let lengths: Vec<_> = verb
            .alternatives
            .iter()
            .map(|rule| g.terminal(rule[0]).unwrap().length)
            .collect();
        assert_eq!(lengths, vec![6, 5, 5]);
    }

    #[test]
    fn start_override_wins_over_header() {
        let loaded = parse_grammar(SENTENCES, Some("verb")).unwrap();
        assert_eq!(Some(loaded.start), loaded.grammar.symbol_by_name("verb"));
    }

    #[test]
    fn default_start_is_root() {
        let err = parse_grammar("sentence -> \"x\" ;", None).unwrap_err();
        assert!(format!("{err:?}").contains("`root`"));

        let loaded = parse_grammar("root -> \"x\" 0x41 bytes(2) Nothing ;", None).unwrap();
        assert_eq!(loaded.grammar.terminals().len(), 4);
    }

    #[test]
    fn unknown_options_are_kept_but_reported() {
        let loaded = parse_grammar("colour = \"red\" root -> \"x\" ;", None).unwrap();
        assert_eq!(loaded.options.get("colour"), Some("red".to_string()));
        assert_eq!(loaded.options.unknown_keys(KNOWN_FLAGS), vec!["colour"]);
    }

    #[test]
    fn rejects_non_productive_grammar() {
        let err = parse_grammar("root -> root \"x\" ;", None).unwrap_err();
        assert!(format!("{err:?}").contains("never derives a finite string"));
    }
}
