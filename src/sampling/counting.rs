use crate::grammar::Symbol;

use super::definition::{Definition, DefinitionId, RuleDefinition, RuleDefinitionId, RuleNode};
use super::Session;

impl<'g> Session<'g> {
    /// Counting step behind `definition_of`. Never fails: unknown symbols and
    /// unmatched lengths come back as unreachable definitions.
    pub(crate) fn define(&mut self, symbol: Symbol, length: usize) -> DefinitionId {
        if let Some(id) = self.caches.definition(symbol, length) {
            return id;
        }

        if symbol.is_terminal() {
            let count = match self.grammar.terminal(symbol) {
                Some(terminal) if terminal.length == length => 1,
                _ => 0,
            };

            return self.caches.insert_definition(
                Definition {
                    symbol,
                    length,
                    count,
                    rules: vec![],
                },
                vec![],
            );
        }

        if self.caches.guard.is_open(symbol, length) {
            if self.caches.guard.cuts() == 0 {
                crate::log!(
                    "{} re-entered at length {length}, cutting the cycle",
                    self.grammar.describe(symbol)
                );
            }
            self.caches.guard.cut(symbol, length);
            return self.caches.cut_placeholder(symbol, length);
        }

        let grammar = self.grammar;
        let Some(non_terminal) = grammar.non_terminal(symbol) else {
            return self
                .caches
                .insert_definition(Definition::unreachable(symbol, length), vec![]);
        };

        let probe = self.caches.guard.open(symbol, length);

        let mut count = 0;
        let mut rules = vec![];
        for alternative in &non_terminal.alternatives {
            let Some(rule) = self.define_rule(alternative, length) else {
                continue;
            };

            let rule_count = self.caches[rule].count;
            count = self.caches.add(count, rule_count);
            rules.push(rule);
        }

        let closed = self.caches.guard.close(symbol, length, probe);

        let definition = Definition {
            symbol,
            length,
            count,
            rules,
        };

        if closed.context_free {
            self.caches.insert_definition(definition, closed.through)
        } else {
            self.caches.push_definition(definition)
        }
    }

    /// Splits `length` between the first token of `residual` and the rest.
    /// `None` when the residual derives nothing of that length.
    pub(crate) fn define_rule(
        &mut self,
        residual: &[Symbol],
        length: usize,
    ) -> Option<RuleDefinitionId> {
        let (&head, tail) = residual.split_first()?;

        if let Some(memoized) = self.caches.rule_definition(residual, length) {
            return memoized;
        }

        let probe = self.caches.guard.begin(length);

        let mut nodes = vec![];

        if tail.is_empty() {
            let head_def = self.define(head, length);
            let count = self.caches[head_def].count;

            if count != 0 {
                nodes.push(RuleNode {
                    head: head_def,
                    tail: None,
                    partition: length,
                    count,
                });
            }
        } else {
            for partition in 1..=length {
                // re-entering an open head only matters if the tail can
                // still be completed, as in `a -> a "b"` at full length
                if self.caches.guard.is_open(head, partition)
                    && self.define_rule(tail, length - partition).is_none()
                {
                    continue;
                }

                let head_def = self.define(head, partition);
                let head_count = self.caches[head_def].count;
                if head_count == 0 {
                    continue;
                }

                let Some(tail_def) = self.define_rule(tail, length - partition) else {
                    continue;
                };

                let tail_count = self.caches[tail_def].count;
                let count = self.caches.mul(head_count, tail_count);
                if count == 0 {
                    continue;
                }

                nodes.push(RuleNode {
                    head: head_def,
                    tail: Some(tail_def),
                    partition,
                    count,
                });
            }
        }

        let closed = self.caches.guard.end(probe);

        let rule = if nodes.is_empty() {
            None
        } else {
            let mut count = 0;
            for node in &nodes {
                count = self.caches.add(count, node.count);
            }

            Some(self.caches.push_rule_definition(RuleDefinition {
                length,
                nodes,
                count,
            }))
        };

        if closed.context_free {
            self.caches
                .remember_residual(residual, length, rule, closed.through);
        }

        rule
    }
}
