use itertools::{iproduct, Itertools};

use crate::sample::TokenString;

use super::definition::{DefinitionId, RuleDefinitionId, RuleNode};
use super::Session;

impl<'g> Session<'g> {
    /// Every distinct string behind `id`, in rank order with later duplicates
    /// removed. For an unambiguous grammar the string at position `r` is
    /// `string_at(id, r)`.
    pub fn all_strings(&self, id: DefinitionId) -> Vec<TokenString> {
        self.definition_strings(id).into_iter().unique().collect()
    }

    /// One entry per derivation, duplicates included.
    fn definition_strings(&self, id: DefinitionId) -> Vec<TokenString> {
        let definition = &self.caches[id];

        if definition.is_unreachable() {
            return vec![];
        }

        if definition.symbol.is_terminal() {
            return vec![TokenString::single(definition.symbol)];
        }

        definition
            .rules
            .iter()
            .flat_map(|&rule| self.rule_strings(rule))
            .collect()
    }

    fn rule_strings(&self, id: RuleDefinitionId) -> Vec<TokenString> {
        self.caches[id]
            .nodes
            .iter()
            .flat_map(|node| self.node_strings(node))
            .collect()
    }

    fn node_strings(&self, node: &RuleNode) -> Vec<TokenString> {
        let heads = self.definition_strings(node.head);

        let Some(tail) = node.tail else {
            return heads;
        };

        // tail node major, then head, then tail string: the order unranking
        // decomposes ranks in
        self.caches[tail]
            .nodes
            .iter()
            .flat_map(|tail_node| {
                let tails = self.node_strings(tail_node);
                iproduct!(heads.iter(), tails.iter())
                    .map(|(head, tail)| head.concat(tail))
                    .collect_vec()
            })
            .collect()
    }
}
