use rand::Rng;

use crate::error::{SamplingError, SamplingResult};
use crate::grammar::Symbol;
use crate::sample::TokenString;

use super::definition::{DefinitionId, RuleNode};
use super::Session;

impl<'g> Session<'g> {
    /// The string of rank `rank` among the strings counted by `id`, built
    /// without enumerating the others. Requires `rank < count_of(id)`.
    pub fn string_at(&self, id: DefinitionId, rank: u128) -> SamplingResult<TokenString> {
        let definition = &self.caches[id];

        if rank >= definition.count {
            return Err(SamplingError::RankOutOfRange {
                rank,
                count: definition.count,
            });
        }

        if definition.symbol.is_terminal() {
            return Ok(TokenString::single(definition.symbol));
        }

        let mut offset = rank;
        for &rule in &definition.rules {
            for node in &self.caches[rule].nodes {
                if offset < node.count {
                    return self.node_string_at(node, offset);
                }
                offset -= node.count;
            }
        }

        // only reachable when the count saturated
        Err(SamplingError::RankOutOfRange {
            rank,
            count: definition.count,
        })
    }

    /// Tail node `t` of count `c` owns a block of `head.count * c` ranks;
    /// inside it rank `r` is head `r / c` followed by tail string `r % c`.
    fn node_string_at(&self, node: &RuleNode, rank: u128) -> SamplingResult<TokenString> {
        let Some(tail) = node.tail else {
            return self.string_at(node.head, rank);
        };

        let head_count = self.caches[node.head].count;

        let mut offset = rank;
        for tail_node in &self.caches[tail].nodes {
            let block = head_count.saturating_mul(tail_node.count);

            if offset < block {
                let head_index = offset / tail_node.count;
                let tail_index = offset % tail_node.count;

                let head = self.string_at(node.head, head_index)?;
                let rest = self.node_string_at(tail_node, tail_index)?;
                return Ok(head.concat(&rest));
            }
            offset -= block;
        }

        Err(SamplingError::RankOutOfRange {
            rank,
            count: node.count,
        })
    }

    /// Uniformly random string of exactly `length` derived from `symbol`.
    pub fn sample_uniform<R: Rng + ?Sized>(
        &mut self,
        symbol: Symbol,
        length: usize,
        rng: &mut R,
    ) -> SamplingResult<TokenString> {
        let id = self.definition_of(symbol, length)?;
        let count = self.count_of(id);

        if count == 0 {
            return Err(SamplingError::NoStringsOfLength { symbol, length });
        }

        let rank = rng.gen_range(0..count);
        self.string_at(id, rank)
    }

    /// `n` independent uniform samples.
    pub fn sample_many<R: Rng + ?Sized>(
        &mut self,
        symbol: Symbol,
        length: usize,
        n: usize,
        rng: &mut R,
    ) -> SamplingResult<Vec<TokenString>> {
        (0..n)
            .map(|_| self.sample_uniform(symbol, length, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::error::SamplingError;
    use crate::grammar::{Grammar, GrammarBuilder, Symbol};
    use crate::sampling::Session;

    /// root -> pair pair ; pair -> "x" | "yy" | "x" "y"
    fn pairs() -> (Grammar, Symbol) {
        let mut b = GrammarBuilder::new();
        let root = b.non_terminal("root").unwrap();
        let pair = b.non_terminal("pair").unwrap();
        let x = b.literal("x").unwrap();
        let y = b.literal("y").unwrap();
        let yy = b.literal("yy").unwrap();
        b.rule(root, vec![pair, pair]).unwrap();
        b.rule(pair, vec![x]).unwrap();
        b.rule(pair, vec![yy]).unwrap();
        b.rule(pair, vec![x, y]).unwrap();
        (b.build().unwrap(), root)
    }

    #[test]
    fn ranks_follow_enumeration_order() {
        let (g, root) = pairs();
        let mut session = Session::new(&g);

        for length in 0..6 {
            let def = session.definition_of(root, length).unwrap();
            let all = session.all_strings(def);
            assert_eq!(all.len() as u128, session.count_of(def));

            for (rank, expected) in all.iter().enumerate() {
                assert_eq!(&session.string_at(def, rank as u128).unwrap(), expected);
            }
        }
    }

    #[test]
    fn rank_past_count_is_rejected() {
        let (g, root) = pairs();
        let mut session = Session::new(&g);
        let def = session.definition_of(root, 3).unwrap();
        let count = session.count_of(def);

        assert_eq!(
            session.string_at(def, count),
            Err(SamplingError::RankOutOfRange { rank: count, count })
        );
    }

    #[test]
    fn sampling_an_empty_length_fails() {
        let (g, root) = pairs();
        let mut session = Session::new(&g);
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(
            session.sample_uniform(root, 1, &mut rng),
            Err(SamplingError::NoStringsOfLength {
                symbol: root,
                length: 1
            })
        );
    }

    #[test]
    fn samples_have_requested_length() {
        let (g, root) = pairs();
        let mut session = Session::new(&g);
        let mut rng = StdRng::seed_from_u64(11);

        let samples = session.sample_many(root, 4, 200, &mut rng).unwrap();
        assert_eq!(samples.len(), 200);

        let mut seen: HashMap<_, usize> = HashMap::new();
        for sample in samples {
            assert_eq!(sample.literal_len(&g), 4);
            *seen.entry(sample).or_default() += 1;
        }

        let def = session.definition_of(root, 4).unwrap();
        assert_eq!(seen.len() as u128, session.count_of(def));
    }
}
