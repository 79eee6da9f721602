use crate::grammar::Symbol;

/// Index of a [`Definition`] in the arena of the session that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(pub(crate) usize);

/// Index of a [`RuleDefinition`] in the arena of the session that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleDefinitionId(pub(crate) usize);

/// "`symbol` derives exactly `count` strings of `length`", with the rule
/// definitions that witness it. A count of 0 marks an unreachable length;
/// no other stored count is ever zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Definition {
    pub symbol: Symbol,
    pub length: usize,
    pub count: u128,
    /// One entry per alternative that matched, in grammar order.
    pub rules: Vec<RuleDefinitionId>,
}

impl Definition {
    pub fn unreachable(symbol: Symbol, length: usize) -> Self {
        Definition {
            symbol,
            length,
            count: 0,
            rules: vec![],
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.count == 0
    }
}

/// One way of splitting a length between the next token of a residual rule
/// and everything after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleNode {
    pub head: DefinitionId,
    pub tail: Option<RuleDefinitionId>,
    /// Length given to the head.
    pub partition: usize,
    /// `head.count * tail.count`, or `head.count` without a tail.
    pub count: u128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleDefinition {
    pub length: usize,
    pub nodes: Vec<RuleNode>,
    pub count: u128,
}
