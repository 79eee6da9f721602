use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use beau_collector::BeauCollector;

use super::parse::{RawGrammar, Token};
use super::{Grammar, Symbol};
use crate::error::SamplingError;

type ValidateResult = Result<(), anyhow::Error>;

/// Checks that can be made before symbols are assigned. All failures are
/// reported together.
pub fn validate_raw_grammar(g: &RawGrammar, start: &str) -> ValidateResult {
    let checks: [&dyn Fn(&RawGrammar) -> ValidateResult; 4] = [
        &|g| find_start(g, start),
        &resolve_names,
        &unique_productions,
        &symbol_space,
    ];

    let _ = checks
        .into_iter()
        .map(|check| check(g))
        .bcollect::<Vec<_>>()?;

    Ok(())
}

fn defined_names(g: &RawGrammar) -> HashSet<&str> {
    g.productions.iter().map(|p| p.lhs.as_str()).collect()
}

fn find_start(g: &RawGrammar, start: &str) -> ValidateResult {
    if !defined_names(g).contains(start) {
        Err(anyhow!("provided grammar does not contain node `{start}`"))
    } else {
        Ok(())
    }
}

fn resolve_names(g: &RawGrammar) -> ValidateResult {
    let defined = defined_names(g);
    let mut errors = HashSet::new();

    for production in &g.productions {
        for rhs in &production.rhs {
            for token in rhs {
                let Token::Identifier(i) = token else {
                    continue;
                };

                if !defined.contains(i.as_str()) {
                    errors.insert(i.clone());
                }
            }
        }
    }

    errors
        .into_iter()
        .map(|e| {
            Err::<(), anyhow::Error>(anyhow!(
                "production `{e}` is mentioned in grammar but not defined"
            ))
        })
        .bcollect::<Vec<_>>()?;
    Ok(())
}

fn unique_productions(g: &RawGrammar) -> ValidateResult {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for production in &g.productions {
        *seen.entry(production.lhs.as_str()).or_default() += 1;
    }

    seen.into_iter()
        .filter(|(_, times)| *times > 1)
        .map(|(name, times)| {
            Err::<(), anyhow::Error>(anyhow!(
                "production `{name}` is defined {times} times, merge its alternatives with `|`"
            ))
        })
        .bcollect::<Vec<_>>()?;
    Ok(())
}

fn symbol_space(g: &RawGrammar) -> ValidateResult {
    let non_terminals = defined_names(g).len();

    let terminals = g
        .productions
        .iter()
        .flat_map(|p| p.rhs.iter().flatten())
        .filter(|t| !matches!(t, Token::Identifier(_)))
        .collect::<HashSet<_>>()
        .len();

    let mut errors = vec![];
    if non_terminals > Symbol::CAPACITY {
        errors.push(Err::<(), anyhow::Error>(anyhow!(
            "grammar defines {non_terminals} productions, at most {} are supported",
            Symbol::CAPACITY
        )));
    }
    if terminals > Symbol::CAPACITY {
        errors.push(Err(anyhow!(
            "grammar uses {terminals} distinct terminals, at most {} are supported",
            Symbol::CAPACITY
        )));
    }

    errors.into_iter().bcollect::<Vec<_>>()?;
    Ok(())
}

/// Every non-terminal must derive at least one finite string, otherwise its
/// rules can never finish a derivation at any length.
pub fn check_productive(g: &Grammar) -> ValidateResult {
    let mut productive: HashSet<Symbol> = HashSet::new();

    loop {
        let before = productive.len();

        for nt in g.non_terminals() {
            if productive.contains(&nt.id) {
                continue;
            }

            let derives = nt.alternatives.iter().any(|rule| {
                rule.iter()
                    .all(|&s| s.is_terminal() || productive.contains(&s))
            });

            if derives {
                productive.insert(nt.id);
            }
        }

        if productive.len() == before {
            break;
        }
    }

    g.non_terminals()
        .iter()
        .filter(|nt| !productive.contains(&nt.id))
        .map(|nt| {
            Err::<(), anyhow::Error>(
                SamplingError::MalformedRule {
                    symbol: nt.id,
                    reason: format!("`{}` never derives a finite string", nt.name),
                }
                .into(),
            )
        })
        .bcollect::<Vec<_>>()?;
    Ok(())
}
