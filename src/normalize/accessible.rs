use itertools::Itertools;
use log::debug;

use super::{rebuild, Limits, Result, Stage};
use crate::grammar::set_ops::same_elements;
use crate::grammar::{Grammar, Symbol};

// Every symbol reachable from the start symbol, in discovery order
fn accessible_symbols(grammar: &Grammar, limits: &Limits) -> Result<Vec<Symbol>> {
    let mut accessible = vec![grammar.start().clone()];
    let mut visited: Vec<Symbol> = Vec::new();
    let mut iterations = 0;

    while !same_elements(&accessible, &visited) {
        iterations += 1;
        limits.check(Stage::Accessibility, iterations)?;

        let unvisited = accessible.iter()
            .filter(|symbol| !visited.contains(symbol))
            .cloned()
            .collect_vec();
        for symbol in unvisited {
            for rule in grammar.rules_for(&symbol) {
                for reached in &rule.right {
                    if !reached.is_epsilon() && !accessible.contains(reached) {
                        accessible.push(reached.clone());
                    }
                }
            }
            visited.push(symbol);
        }
    }

    Ok(accessible)
}

pub fn remove_inaccessible(grammar: &Grammar, limits: &Limits) -> Result<Grammar> {
    let accessible = accessible_symbols(grammar, limits)?;
    let is_accessible = |symbol: &Symbol| accessible.contains(symbol);

    let (nonterminals, dropped): (Vec<_>, Vec<_>) = grammar.nonterminals().iter()
        .cloned()
        .partition(|symbol| is_accessible(symbol));
    if !dropped.is_empty() {
        debug!("Dropping inaccessible {}", dropped.iter().join(", "));
    }

    let terminals = grammar.terminals().iter()
        .filter(|symbol| is_accessible(symbol))
        .cloned();
    let rules = grammar.rules().iter()
        .filter(|rule| rule.left.iter().all(is_accessible))
        .cloned()
        .collect();

    rebuild(Stage::Accessibility, grammar.start().clone(), nonterminals, terminals, rules)
}
