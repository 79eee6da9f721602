//! Exact-length counting, enumeration and uniform sampling.
//!
//! A [`Session`] memoizes, for every `(symbol, length)` it is asked about,
//! how many terminal strings of exactly that length the symbol derives,
//! together with enough structure to list them all or to pick the `n`-th one
//! without listing the others.

mod cache;
mod counting;
mod definition;
mod enumeration;
mod unranking;

use std::time::Instant;

use crate::error::{SamplingError, SamplingResult};
use crate::grammar::{Grammar, Symbol};

use self::cache::Caches;

pub use cache::CacheStats;
pub use definition::{Definition, DefinitionId, RuleDefinition, RuleDefinitionId, RuleNode};

/// Query context: borrows an immutable grammar and owns both caches for as
/// long as it lives. Ids handed out by a session are only meaningful to it.
pub struct Session<'g> {
    grammar: &'g Grammar,
    caches: Caches,
    created: Instant,
}

impl<'g> Session<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Session {
            grammar,
            caches: Caches::new(),
            created: Instant::now(),
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn definition_of(&mut self, symbol: Symbol, length: usize) -> SamplingResult<DefinitionId> {
        if !self.grammar.contains(symbol) {
            return Err(SamplingError::UnknownSymbol(symbol));
        }

        Ok(self.define(symbol, length))
    }

    pub fn definition(&self, id: DefinitionId) -> &Definition {
        &self.caches[id]
    }

    pub fn rule_definition(&self, id: RuleDefinitionId) -> &RuleDefinition {
        &self.caches[id]
    }

    pub fn count_of(&self, id: DefinitionId) -> u128 {
        self.caches[id].count
    }

    pub fn count(&mut self, symbol: Symbol, length: usize) -> SamplingResult<u128> {
        let id = self.definition_of(symbol, length)?;
        Ok(self.count_of(id))
    }

    /// Counts for every length in `lengths`, in the order given.
    pub fn length_spectrum<I>(&mut self, symbol: Symbol, lengths: I) -> SamplingResult<Vec<(usize, u128)>>
    where
        I: IntoIterator<Item = usize>,
    {
        lengths
            .into_iter()
            .map(|length| Ok((length, self.count(symbol, length)?)))
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        self.caches.stats()
    }
}

impl<'g> Drop for Session<'g> {
    fn drop(&mut self) {
        let stats = self.caches.stats();

        crate::log!(
            "session closed after {}: {} definitions, {} rule definitions, {} cycle cuts",
            crate::log::format_elapsed(self.created.elapsed()),
            stats.definitions,
            stats.rule_definitions,
            stats.cycle_cuts
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;

    fn toy() -> (Grammar, Symbol, Symbol) {
        let mut b = GrammarBuilder::new();
        let root = b.non_terminal("root").unwrap();
        let digit = b.non_terminal("digit").unwrap();
        let zero = b.literal("0").unwrap();
        let one = b.literal("1").unwrap();
        b.rule(root, vec![digit]).unwrap();
        b.rule(root, vec![digit, root]).unwrap();
        b.rule(digit, vec![zero]).unwrap();
        b.rule(digit, vec![one]).unwrap();
        (b.build().unwrap(), root, digit)
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        let (g, _, _) = toy();
        let mut session = Session::new(&g);

        let stray = Symbol::non_terminal(50).unwrap();
        assert_eq!(
            session.definition_of(stray, 1),
            Err(SamplingError::UnknownSymbol(stray))
        );
    }

    #[test]
    fn binary_strings_double_with_length() {
        let (g, root, _) = toy();
        let mut session = Session::new(&g);

        let spectrum = session.length_spectrum(root, 0..=6).unwrap();
        assert_eq!(
            spectrum,
            vec![(0, 0), (1, 2), (2, 4), (3, 8), (4, 16), (5, 32), (6, 64)]
        );
    }

    #[test]
    fn repeated_queries_return_the_same_definition() {
        let (g, root, digit) = toy();
        let mut session = Session::new(&g);

        let first = session.definition_of(root, 5).unwrap();
        let stats = session.stats();
        let second = session.definition_of(root, 5).unwrap();

        assert_eq!(first, second);
        assert_eq!(stats, session.stats());
        assert_eq!(session.definition(first).symbol, root);
        assert_eq!(session.count(digit, 1).unwrap(), 2);
    }

    #[test]
    fn warm_and_fresh_sessions_agree() {
        let (g, root, _) = toy();
        let mut warm = Session::new(&g);
        for length in 0..8 {
            warm.count(root, length).unwrap();
        }

        for length in (0..8).rev() {
            let mut fresh = Session::new(&g);
            let fresh_def = fresh.definition_of(root, length).unwrap();
            let warm_def = warm.definition_of(root, length).unwrap();

            assert_eq!(fresh.count_of(fresh_def), warm.count_of(warm_def));
            assert_eq!(fresh.all_strings(fresh_def), warm.all_strings(warm_def));
        }
    }
}
