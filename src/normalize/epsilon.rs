use indexmap::IndexSet;
use itertools::Itertools;
use log::debug;

use super::{head_of, rebuild, Limits, Result, Stage};
use crate::grammar::set_ops::nth_position;
use crate::grammar::{Grammar, Rule, Symbol};

// Removes every `A -> ε` rule, adding to each rule that mentions a nullable
// symbol the variants with one occurrence of it dropped
pub fn eliminate_epsilon(grammar: &Grammar, limits: &Limits) -> Result<Grammar> {
    let mut rules = grammar.rules().to_vec();
    let mut eliminated = IndexSet::new();
    let mut iterations = 0;

    while let Some(index) = rules.iter().position(Rule::is_epsilon) {
        let epsilon_rule = rules.remove(index);
        let nullable = head_of(&epsilon_rule, Stage::Epsilon)?;
        debug!("Eliminating `{}`", epsilon_rule);
        eliminated.insert(nullable.clone());

        // Keep rescanning until a full pass adds nothing, so variants added
        // by one pass get their remaining occurrences dropped by the next
        loop {
            iterations += 1;
            limits.check(Stage::Epsilon, iterations)?;

            let dependents = rules.iter()
                .filter(|rule| rule.right.contains(&nullable))
                .cloned()
                .collect_vec();

            let mut changed = false;
            for dependent in dependents {
                let mut occurrence = 0;
                while let Some(position) = nth_position(&dependent.right, &nullable, occurrence) {
                    occurrence += 1;
                    let Some(candidate) = without_symbol_at(&dependent, position, &eliminated) else {
                        continue;
                    };
                    if !rules.contains(&candidate) {
                        debug!("Adding `{}`", candidate);
                        rules.push(candidate);
                        changed = true;
                    }
                }
            }

            if !changed {
                break;
            }
        }
    }

    rebuild(
        Stage::Epsilon,
        grammar.start().clone(),
        grammar.nonterminals().iter().cloned(),
        grammar.terminals().iter().cloned(),
        rules,
    )
}

// `rule` with the symbol at `position` deleted. A right side that becomes
// empty is spelled `ε` so its left side gets eliminated in turn, unless
// that left side has already been eliminated.
fn without_symbol_at(rule: &Rule, position: usize, eliminated: &IndexSet<Symbol>) -> Option<Rule> {
    let mut right = rule.right.clone();
    right.remove(position);

    if !right.is_empty() {
        Some(Rule::new(rule.left.clone(), right))
    } else if rule.left.iter().any(|symbol| eliminated.contains(symbol)) {
        None
    } else {
        Some(Rule::new(rule.left.clone(), vec![Symbol::epsilon()]))
    }
}
