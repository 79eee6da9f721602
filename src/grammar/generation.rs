use rand::Rng;
use thiserror::Error;

use crate::grammar::{Grammar, Symbol};
use crate::sample::TokenString;

#[derive(Clone, Debug)]
pub struct ProductionApplication {
    pub symbol: Symbol,
    pub production_variant: usize,
    pub items: Vec<TreeNode>,
}

/// Derivation tree produced by the unguided generator.
#[derive(Clone, Debug)]
pub enum TreeNode {
    ProductionApplication(ProductionApplication),
    Terminal(Symbol),
}

impl TreeNode {
    pub fn fold(&self, buffer: &mut TokenString) {
        match self {
            TreeNode::ProductionApplication(pa) => {
                for item in &pa.items {
                    item.fold(buffer);
                }
            }
            TreeNode::Terminal(symbol) => buffer.push(*symbol),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::ProductionApplication(pa) => {
                1 + pa.items.iter().map(TreeNode::depth).max().unwrap_or(0)
            }
            TreeNode::Terminal(_) => 0,
        }
    }
}

impl From<&TreeNode> for TokenString {
    fn from(tree: &TreeNode) -> Self {
        let mut folded = TokenString::default();
        tree.fold(&mut folded);
        folded
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("symbol {0} is not a non-terminal of the grammar")]
    UnknownSymbol(Symbol),

    #[error("no derivation of {symbol} fits in depth {depth_limit} after {attempts} attempts")]
    DepthExceeded {
        symbol: Symbol,
        depth_limit: usize,
        attempts: usize,
    },
}

/// Picks alternatives uniformly at every step, so output lengths follow
/// whatever distribution the grammar shape implies. Used as a baseline
/// against the length-exact sampler.
pub struct Generator<'g> {
    grammar: &'g Grammar,
    depth_limit: usize,
    attempts: usize,
}

impl<'g> Generator<'g> {
    pub fn new(grammar: &'g Grammar, depth_limit: usize) -> Generator<'g> {
        Generator {
            grammar,
            depth_limit,
            attempts: 100,
        }
    }

    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        start: Symbol,
        rng: &mut R,
    ) -> Result<TokenString, GenerationError> {
        let tree = self.generate_tree(start, rng)?;
        Ok(TokenString::from(&tree))
    }

    pub fn generate_tree<R: Rng + ?Sized>(
        &self,
        start: Symbol,
        rng: &mut R,
    ) -> Result<TreeNode, GenerationError> {
        if self.grammar.non_terminal(start).is_none() {
            return Err(GenerationError::UnknownSymbol(start));
        }

        for _attempt in 0..self.attempts {
            if let Some(tree) = self.generate_production(start, self.depth_limit, rng) {
                return Ok(tree);
            }
        }

        Err(GenerationError::DepthExceeded {
            symbol: start,
            depth_limit: self.depth_limit,
            attempts: self.attempts,
        })
    }

    fn generate_token<R: Rng + ?Sized>(
        &self,
        token: Symbol,
        remaining_depth: usize,
        rng: &mut R,
    ) -> Option<TreeNode> {
        if token.is_terminal() {
            return Some(TreeNode::Terminal(token));
        }

        if remaining_depth == 0 {
            None
        } else {
            self.generate_production(token, remaining_depth - 1, rng)
        }
    }

    fn generate_production<R: Rng + ?Sized>(
        &self,
        symbol: Symbol,
        remaining_depth: usize,
        rng: &mut R,
    ) -> Option<TreeNode> {
        let alternatives = &self.grammar.non_terminal(symbol)?.alternatives;

        for _ in 0..=remaining_depth {
            let chosen_idx = rng.gen_range(0..alternatives.len());
            let production = &alternatives[chosen_idx];

            if let Some(items) = production
                .iter()
                .map(|&token| self.generate_token(token, remaining_depth, rng))
                .collect::<Option<Vec<TreeNode>>>()
            {
                return Some(TreeNode::ProductionApplication(ProductionApplication {
                    symbol,
                    production_variant: chosen_idx,
                    items,
                }));
            }
        }

        None
    }
}
