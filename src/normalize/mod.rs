/*
    This module converts context-free grammars to Chomsky normal form
*/

mod accessible;
mod cnf;
mod epsilon;
mod productive;
mod unit;

use std::fmt::Display;

use log::{debug, info};

use crate::error_handling::ErrorType;
use crate::grammar::*;

pub use accessible::remove_inaccessible;
pub use cnf::to_cnf;
pub use epsilon::eliminate_epsilon;
pub use productive::remove_nonproductive;
pub use unit::eliminate_units;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Epsilon,
    Unit,
    Accessibility,
    Productivity,
    Cnf,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Epsilon => write!(f, "epsilon rule elimination"),
            Stage::Unit => write!(f, "unit rule elimination"),
            Stage::Accessibility => write!(f, "inaccessible symbol removal"),
            Stage::Productivity => write!(f, "non-productive symbol removal"),
            Stage::Cnf => write!(f, "conversion to normal form"),
        }
    }
}

// Every stage, in the order the pipeline runs them
type StageFn = fn(&Grammar, &Limits) -> Result<Grammar>;
const PIPELINE: [(Stage, StageFn); 5] = [
    (Stage::Epsilon, eliminate_epsilon as StageFn),
    (Stage::Unit, eliminate_units as StageFn),
    (Stage::Accessibility, remove_inaccessible as StageFn),
    (Stage::Productivity, remove_nonproductive as StageFn),
    (Stage::Cnf, to_cnf as StageFn),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    // Upper bound on the passes any single fixpoint loop may take
    pub max_iterations: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits { max_iterations: 100_000 }
    }
}

impl Limits {
    fn check(&self, stage: Stage, iterations: usize) -> Result<()> {
        if iterations > self.max_iterations {
            Err(NormalizeError::Diverged { stage, iterations: self.max_iterations })
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum NormalizeError {
    // The input has a rule whose left side is not a single nonterminal
    NotContextFree(Rule),
    // A stage produced a grammar that failed validation
    Construction { stage: Stage, error: GrammarError },
    // A stage was handed a rule outside of what it accepts
    UnexpectedRule { stage: Stage, rule: Rule },
    // A fixpoint loop ran past the iteration limit
    Diverged { stage: Stage, iterations: usize },
}

impl ErrorType for NormalizeError {}

impl Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeError::NotContextFree(rule) => write!(f, "Not a context-free grammar: the left side of `{}` is not a single nonterminal", rule),
            NormalizeError::Construction { stage, error } => write!(f, "Invalid grammar after {}: {}", stage, error),
            NormalizeError::UnexpectedRule { stage, rule } => write!(f, "Rule `{}` cannot be handled by {}", rule, stage),
            NormalizeError::Diverged { stage, iterations } => write!(f, "{} did not settle within {} iterations", stage, iterations),
        }
    }
}

pub type Result<T> = std::result::Result<T, NormalizeError>;

// Validates a stage's output
fn rebuild(
    stage: Stage,
    start: Symbol,
    nonterminals: impl IntoIterator<Item = Symbol>,
    terminals: impl IntoIterator<Item = Symbol>,
    rules: Vec<Rule>,
) -> Result<Grammar> {
    Grammar::new(start, nonterminals, terminals, rules)
        .map_err(|error| NormalizeError::Construction { stage, error })
}

// The single left-hand symbol every stage relies on
fn head_of(rule: &Rule, stage: Stage) -> Result<Symbol> {
    rule.head()
        .cloned()
        .ok_or_else(|| NormalizeError::UnexpectedRule { stage, rule: rule.clone() })
}

pub fn normalize(grammar: &Grammar, limits: &Limits) -> Result<Grammar> {
    normalize_observed(grammar, limits, |_, _| {})
}

// Runs every stage in order, handing each intermediate grammar to `observe`
pub fn normalize_observed(
    grammar: &Grammar,
    limits: &Limits,
    mut observe: impl FnMut(Stage, &Grammar),
) -> Result<Grammar> {
    let offending = grammar.rules().iter()
        .find(|rule| !rule.head().is_some_and(|head| grammar.is_nonterminal(head)));
    if let Some(rule) = offending {
        return Err(NormalizeError::NotContextFree(rule.clone()));
    }

    let mut current = grammar.clone();
    for (stage, run) in PIPELINE {
        debug!("Starting {} with {} rules", stage, current.rules().len());
        current = run(&current, limits)?;
        info!(
            "Finished {}: {} nonterminals, {} terminals, {} rules",
            stage,
            current.nonterminals().len(),
            current.terminals().len(),
            current.rules().len()
        );
        observe(stage, &current);
    }

    Ok(current)
}
