use std::collections::{HashMap, HashSet};
use std::ops::Index;

use crate::grammar::Symbol;

use super::definition::{Definition, DefinitionId, RuleDefinition, RuleDefinitionId};

pub(crate) type SymbolKey = (Symbol, usize);

/// Memoized value together with the same-length non-terminals it was derived
/// through. It stays valid while none of them is being computed.
#[derive(Clone, Debug)]
struct Memo<T> {
    value: T,
    through: Vec<SymbolKey>,
}

/// Arenas and memo tables owned by one session.
#[derive(Default)]
pub(crate) struct Caches {
    definitions: Vec<Definition>,
    rule_definitions: Vec<RuleDefinition>,

    by_symbol: HashMap<SymbolKey, Memo<DefinitionId>>,
    /// residual token sequence -> length -> rule definition, `None` when the
    /// residual has no strings of that length
    by_residual: HashMap<Vec<Symbol>, HashMap<usize, Memo<Option<RuleDefinitionId>>>>,
    /// one unreachable stand-in per cut (symbol, length)
    cut_placeholders: HashMap<SymbolKey, DefinitionId>,

    pub(crate) guard: ReentrancyGuard,
    saturated: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub definitions: usize,
    pub rule_definitions: usize,
    pub cached_definitions: usize,
    pub cached_residuals: usize,
    pub cycle_cuts: usize,
    pub saturated_counts: usize,
}

impl Caches {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn definition(&mut self, symbol: Symbol, length: usize) -> Option<DefinitionId> {
        let memo = self.by_symbol.get(&(symbol, length))?;
        self.guard.reuse(&memo.through).then_some(memo.value)
    }

    /// outer `None`: never computed or not valid here, inner `None`: known to
    /// be absent
    pub fn rule_definition(
        &mut self,
        residual: &[Symbol],
        length: usize,
    ) -> Option<Option<RuleDefinitionId>> {
        let memo = self.by_residual.get(residual)?.get(&length)?;
        self.guard.reuse(&memo.through).then_some(memo.value)
    }

    /// Stores a definition in the arena without making it visible to lookups.
    pub fn push_definition(&mut self, definition: Definition) -> DefinitionId {
        let id = DefinitionId(self.definitions.len());
        self.definitions.push(definition);
        id
    }

    pub fn insert_definition(
        &mut self,
        definition: Definition,
        through: Vec<SymbolKey>,
    ) -> DefinitionId {
        let key = (definition.symbol, definition.length);
        let id = self.push_definition(definition);
        self.by_symbol.insert(key, Memo { value: id, through });
        id
    }

    /// Unreachable definition standing in for a re-entered (symbol, length).
    pub fn cut_placeholder(&mut self, symbol: Symbol, length: usize) -> DefinitionId {
        if let Some(&id) = self.cut_placeholders.get(&(symbol, length)) {
            return id;
        }

        let id = self.push_definition(Definition::unreachable(symbol, length));
        self.cut_placeholders.insert((symbol, length), id);
        id
    }

    pub fn push_rule_definition(&mut self, rule: RuleDefinition) -> RuleDefinitionId {
        let id = RuleDefinitionId(self.rule_definitions.len());
        self.rule_definitions.push(rule);
        id
    }

    pub fn remember_residual(
        &mut self,
        residual: &[Symbol],
        length: usize,
        rule: Option<RuleDefinitionId>,
        through: Vec<SymbolKey>,
    ) {
        let memo = Memo {
            value: rule,
            through,
        };

        match self.by_residual.get_mut(residual) {
            Some(by_length) => {
                by_length.insert(length, memo);
            }
            None => {
                self.by_residual
                    .insert(residual.to_vec(), HashMap::from([(length, memo)]));
            }
        }
    }

    pub fn add(&mut self, a: u128, b: u128) -> u128 {
        a.checked_add(b).unwrap_or_else(|| self.saturate())
    }

    pub fn mul(&mut self, a: u128, b: u128) -> u128 {
        a.checked_mul(b).unwrap_or_else(|| self.saturate())
    }

    fn saturate(&mut self) -> u128 {
        if self.saturated == 0 {
            crate::log!("string count exceeds {}, saturating", u128::MAX);
        }
        self.saturated += 1;
        u128::MAX
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            definitions: self.definitions.len(),
            rule_definitions: self.rule_definitions.len(),
            cached_definitions: self.by_symbol.len(),
            cached_residuals: self.by_residual.values().map(HashMap::len).sum(),
            cycle_cuts: self.guard.cuts,
            saturated_counts: self.saturated,
        }
    }
}

impl Index<DefinitionId> for Caches {
    type Output = Definition;

    fn index(&self, index: DefinitionId) -> &Self::Output {
        &self.definitions[index.0]
    }
}

impl Index<RuleDefinitionId> for Caches {
    type Output = RuleDefinition;

    fn index(&self, index: RuleDefinitionId) -> &Self::Output {
        &self.rule_definitions[index.0]
    }
}

/// Tracks which (symbol, length) pairs are being computed. Re-entering one of
/// them is a cycle cut: the inner occurrence counts as unreachable.
///
/// Cycles only close at a single length, so every computation records the
/// non-terminals of its own length it went through. A result computed while
/// one of them was open further out depends on that caller and is not
/// memoized; any other result is valid wherever none of them is open.
#[derive(Default)]
pub(crate) struct ReentrancyGuard {
    open: HashSet<SymbolKey>,
    frames: Vec<Frame>,
    cuts: usize,
}

struct Frame {
    length: usize,
    through: HashSet<SymbolKey>,
}

/// Handle for a computation started with `begin` or `open`.
#[must_use]
pub(crate) struct Probe {
    depth: usize,
}

pub(crate) struct Closed {
    pub through: Vec<SymbolKey>,
    /// Nothing the computation went through was open around it.
    pub context_free: bool,
}

impl ReentrancyGuard {
    pub fn cuts(&self) -> usize {
        self.cuts
    }

    pub fn is_open(&self, symbol: Symbol, length: usize) -> bool {
        self.open.contains(&(symbol, length))
    }

    fn touch(&mut self, key: SymbolKey) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.length == key.1 {
                frame.through.insert(key);
            }
        }
    }

    pub fn cut(&mut self, symbol: Symbol, length: usize) {
        self.cuts += 1;
        self.touch((symbol, length));
    }

    /// Whether a memo derived through `through` may be used here. A usable
    /// memo is recorded as gone through by the current computation.
    pub fn reuse(&mut self, through: &[SymbolKey]) -> bool {
        if through.iter().any(|key| self.open.contains(key)) {
            return false;
        }

        for &key in through {
            self.touch(key);
        }
        true
    }

    pub fn begin(&mut self, length: usize) -> Probe {
        self.frames.push(Frame {
            length,
            through: HashSet::new(),
        });
        Probe {
            depth: self.frames.len(),
        }
    }

    pub fn end(&mut self, probe: Probe) -> Closed {
        debug_assert_eq!(probe.depth, self.frames.len());

        let through = self
            .frames
            .pop()
            .map(|frame| frame.through.into_iter().collect::<Vec<_>>())
            .unwrap_or_default();

        let context_free = through.iter().all(|key| !self.open.contains(key));

        for &key in &through {
            self.touch(key);
        }

        Closed {
            through,
            context_free,
        }
    }

    pub fn open(&mut self, symbol: Symbol, length: usize) -> Probe {
        self.open.insert((symbol, length));
        let probe = self.begin(length);
        self.touch((symbol, length));
        probe
    }

    pub fn close(&mut self, symbol: Symbol, length: usize, probe: Probe) -> Closed {
        self.open.remove(&(symbol, length));
        self.end(probe)
    }
}
