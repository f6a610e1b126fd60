use indexmap::IndexSet;
use itertools::Itertools;
use log::debug;

use super::{rebuild, Limits, Result, Stage};
use crate::grammar::{Grammar, Rule, Symbol};

// Removes nonterminals that never derive a string of terminals, along with
// every rule that mentions them
pub fn remove_nonproductive(grammar: &Grammar, limits: &Limits) -> Result<Grammar> {
    let derives = |rule: &Rule, productive: &IndexSet<Symbol>| {
        rule.right.iter().all(|symbol| grammar.is_terminal(symbol) || productive.contains(symbol))
    };

    let mut productive: IndexSet<Symbol> = grammar.rules().iter()
        .filter(|rule| rule.right.iter().all(|symbol| grammar.is_terminal(symbol)))
        .filter_map(Rule::head)
        .cloned()
        .collect();
    let mut iterations = 0;

    loop {
        iterations += 1;
        limits.check(Stage::Productivity, iterations)?;

        let discovered = grammar.rules().iter()
            .filter(|rule| derives(rule, &productive))
            .filter_map(Rule::head)
            .filter(|head| !productive.contains(*head))
            .cloned()
            .collect_vec();
        if discovered.is_empty() {
            break;
        }
        productive.extend(discovered);
    }

    let (nonterminals, dropped): (Vec<_>, Vec<_>) = grammar.nonterminals().iter()
        .cloned()
        .partition(|symbol| productive.contains(symbol));
    if !dropped.is_empty() {
        debug!("Dropping non-productive {}", dropped.iter().join(", "));
    }

    let rules = grammar.rules().iter()
        .filter(|rule| derives(rule, &productive))
        .cloned()
        .collect();

    rebuild(
        Stage::Productivity,
        grammar.start().clone(),
        nonterminals,
        grammar.terminals().iter().cloned(),
        rules,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::grammar::fixtures::*;

    #[test]
    fn drops_looping_nonterminals() {
        let grammar = grammar("S", "S A B C", "a b c", &[
            ("S", "a B"),
            ("S", "A C"),
            ("B", "b"),
            ("A", "B a"),
            ("C", "c C"),
        ]);
        let result = remove_nonproductive(&grammar, &Limits::default()).unwrap();

        assert_eq!(result.nonterminals().iter().cloned().collect_vec(), syms("S A B"));
        assert_eq!(result.terminals(), grammar.terminals());
        assert_eq!(result.rules(), &[
            rule("S", "a B"),
            rule("B", "b"),
            rule("A", "B a"),
        ][..]);
    }

    #[test]
    fn productivity_propagates_through_chains() {
        let grammar = grammar("S", "S A B", "b", &[
            ("S", "A A"),
            ("A", "B B"),
            ("B", "b"),
        ]);
        let result = remove_nonproductive(&grammar, &Limits::default()).unwrap();
        assert_eq!(result, grammar);
    }

    #[test]
    fn undefined_nonterminals_are_dropped() {
        let grammar = grammar("S", "S U", "a", &[("S", "a U"), ("S", "a")]);
        let result = remove_nonproductive(&grammar, &Limits::default()).unwrap();

        assert_eq!(result.nonterminals().iter().cloned().collect_vec(), syms("S"));
        assert_eq!(result.rules(), &[rule("S", "a")][..]);
    }
}
