use itertools::Itertools;
use log::debug;

use super::{head_of, rebuild, Limits, Result, Stage};
use crate::grammar::set_ops::contains_sequence;
use crate::grammar::{Grammar, Rule};

// Replaces every renaming rule `A -> B` by copies of B's rules under A
pub fn eliminate_units(grammar: &Grammar, limits: &Limits) -> Result<Grammar> {
    let mut rules = grammar.rules().iter().cloned().unique().collect_vec();
    let mut iterations = 0;

    while let Some(index) = rules.iter().position(|rule| grammar.is_unit(rule)) {
        iterations += 1;
        limits.check(Stage::Unit, iterations)?;

        let unit = rules.remove(index);
        let head = head_of(&unit, Stage::Unit)?;
        let target = &unit.right[0];
        debug!("Inlining `{}`", unit);

        let existing = rules.iter()
            .filter(|rule| rule.left == unit.left)
            .map(|rule| &rule.right)
            .collect_vec();
        // `A -> A` says nothing, so it is never copied back in
        let inlined = rules.iter()
            .filter(|rule| rule.head() == Some(target))
            .map(|rule| rule.right.clone())
            .filter(|right| !(right.len() == 1 && right[0] == head))
            .filter(|right| !contains_sequence(&existing, right.as_slice()))
            .unique()
            .collect_vec();

        rules.extend(inlined.into_iter().map(|right| Rule::production(head.clone(), right)));
    }

    rebuild(
        Stage::Unit,
        grammar.start().clone(),
        grammar.nonterminals().iter().cloned(),
        grammar.terminals().iter().cloned(),
        rules,
    )
}
