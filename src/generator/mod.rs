/*
    This module samples random sentences from a grammar
*/

use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;

use itertools::Itertools;
use rand::prelude::*;

use crate::error_handling::*;
use crate::grammar::{Grammar, Rule, Symbol};

#[derive(Debug, PartialEq)]
pub enum GenerateErrorType {
    // A nonterminal has no rules to expand it with
    UndefinedNonterminal(Symbol),
    // At the depth limit every rule for this nonterminal needs further expansion
    DepthExceeded(Symbol),
}

impl ErrorType for GenerateErrorType {}

impl Display for GenerateErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateErrorType::UndefinedNonterminal(nonterminal) => write!(f, "No definition for nonterminal `{}`", nonterminal),
            GenerateErrorType::DepthExceeded(nonterminal) => write!(f, "Could not finish expanding `{}` within the depth limit", nonterminal),
        }
    }
}

pub type GenerateError = Error<GenerateErrorType>;
pub type GenResult = Result<String, GenerateError>;

// Expands the start symbol with uniformly chosen rules. Past `max_depth`
// nested expansions only the rules that finish soonest are picked.
pub fn generate<R: Rng + ?Sized>(grammar: &Grammar, rng: &mut R, max_depth: usize, file: PathBuf) -> GenResult {
    let location = Location::whole_file(file);
    let heights = finishing_heights(grammar);
    let mut sentence = String::new();
    generate_symbol(grammar.start(), grammar, &heights, rng, max_depth, &location, &mut sentence)?;
    Ok(sentence)
}

// Nested expansions a rule needs before only terminals are left, if it can
// finish at all
fn rule_height(rule: &Rule, grammar: &Grammar, heights: &HashMap<Symbol, usize>) -> Option<usize> {
    rule.right.iter()
        .map(|symbol| if grammar.is_nonterminal(symbol) { heights.get(symbol).copied() } else { Some(0) })
        .fold_options(0, usize::max)
        .map(|height| height + 1)
}

// The lowest rule height of every nonterminal that can finish
fn finishing_heights(grammar: &Grammar) -> HashMap<Symbol, usize> {
    let mut heights = HashMap::new();
    loop {
        let mut changed = false;
        for rule in grammar.rules() {
            let (Some(head), Some(height)) = (rule.head(), rule_height(rule, grammar, &heights)) else {
                continue;
            };
            if heights.get(head).map_or(true, |&known| height < known) {
                heights.insert(head.clone(), height);
                changed = true;
            }
        }
        if !changed {
            return heights;
        }
    }
}

fn generate_symbol<R: Rng + ?Sized>(
    symbol: &Symbol,
    grammar: &Grammar,
    heights: &HashMap<Symbol, usize>,
    rng: &mut R,
    depth: usize,
    location: &Location,
    sentence: &mut String,
) -> Result<(), GenerateError> {
    if symbol.is_epsilon() {
        return Ok(());
    }
    if grammar.is_terminal(symbol) {
        sentence.push_str(symbol.as_str());
        return Ok(());
    }

    let fail = |error| GenerateError { location: location.clone(), error };
    let candidates = grammar.rules_for(symbol).collect_vec();
    if candidates.is_empty() {
        return Err(fail(GenerateErrorType::UndefinedNonterminal(symbol.clone())));
    }

    let rule = if depth == 0 {
        let shortest = heights.get(symbol).copied();
        let finishing = candidates.into_iter()
            .filter(|rule| shortest.is_some() && rule_height(rule, grammar, heights) == shortest)
            .collect_vec();
        *finishing.choose(rng).ok_or_else(|| fail(GenerateErrorType::DepthExceeded(symbol.clone())))?
    } else {
        *candidates.choose(rng).ok_or_else(|| fail(GenerateErrorType::UndefinedNonterminal(symbol.clone())))?
    };

    for next in &rule.right {
        generate_symbol(next, grammar, heights, rng, depth.saturating_sub(1), location, sentence)?;
    }
    Ok(())
}
