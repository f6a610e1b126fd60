use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use itertools::Itertools;
use log::debug;

use super::{head_of, rebuild, Limits, NormalizeError, Result, Stage};
use crate::grammar::{Grammar, Rule, Symbol};

// Nonterminals known to expand to exactly one right side, looked up from
// either end
#[derive(Default)]
struct PatternIndex {
    by_pattern: HashMap<Vec<Symbol>, Symbol>,
    by_symbol: HashMap<Symbol, Vec<Symbol>>,
    // Every name below this has been tried already
    next_fresh: usize,
}

impl PatternIndex {
    // The first nonterminal registered for a pattern keeps it
    fn register(&mut self, symbol: &Symbol, pattern: &[Symbol]) {
        if self.pattern_of(symbol).is_some() || self.lookup(pattern).is_some() {
            return;
        }
        self.by_pattern.insert(pattern.to_vec(), symbol.clone());
        self.by_symbol.insert(symbol.clone(), pattern.to_vec());
    }

    fn lookup(&self, pattern: &[Symbol]) -> Option<&Symbol> {
        self.by_pattern.get(pattern)
    }

    fn pattern_of(&self, symbol: &Symbol) -> Option<&[Symbol]> {
        self.by_symbol.get(symbol).map(Vec::as_slice)
    }

    // The smallest number, as a symbol, that `taken` rejects
    fn fresh(&mut self, taken: impl Fn(&Symbol) -> bool) -> Symbol {
        loop {
            let candidate = Symbol::new(self.next_fresh.to_string());
            self.next_fresh += 1;
            if !taken(&candidate) {
                return candidate;
            }
        }
    }
}

struct CnfBuilder<'g> {
    grammar: &'g Grammar,
    nonterminals: IndexSet<Symbol>,
    rules: Vec<Rule>,
    index: PatternIndex,
    // Nonterminals with exactly one rule in the input
    single_rule: HashSet<Symbol>,
}

impl<'g> CnfBuilder<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        let single_rule = grammar.rules().iter()
            .filter_map(Rule::head)
            .counts()
            .into_iter()
            .filter(|(_, count)| *count == 1)
            .map(|(head, _)| head.clone())
            .collect::<HashSet<_>>();

        let mut index = PatternIndex::default();
        for rule in grammar.rules() {
            if let Some(head) = rule.head() {
                if single_rule.contains(head) && grammar.is_cnf_rule(rule) {
                    index.register(head, &rule.right);
                }
            }
        }

        CnfBuilder {
            grammar,
            nonterminals: grammar.nonterminals().clone(),
            rules: Vec::with_capacity(grammar.rules().len()),
            index,
            single_rule,
        }
    }

    fn is_terminal(&self, symbol: &Symbol) -> bool {
        self.grammar.is_terminal(symbol)
    }

    fn is_nonterminal(&self, symbol: &Symbol) -> bool {
        self.nonterminals.contains(symbol)
    }

    // A nonterminal whose only rule expands to `pattern`, minting one if
    // none exists yet
    fn reuse_or_mint(&mut self, pattern: Vec<Symbol>) -> Symbol {
        if let Some(existing) = self.index.lookup(&pattern) {
            return existing.clone();
        }

        let nonterminals = &self.nonterminals;
        let terminals = self.grammar.terminals();
        let symbol = self.index.fresh(|candidate| nonterminals.contains(candidate) || terminals.contains(candidate));
        debug!("Minted `{}` for {}", symbol, pattern.iter().join(" "));

        self.nonterminals.insert(symbol.clone());
        self.index.register(&symbol, &pattern);
        self.rules.push(Rule::production(symbol.clone(), pattern));
        symbol
    }

    fn add(&mut self, rule: &Rule) -> Result<()> {
        let head = head_of(rule, Stage::Cnf)?;
        let unexpected = || NormalizeError::UnexpectedRule { stage: Stage::Cnf, rule: rule.clone() };

        match rule.right.as_slice() {
            [terminal] if self.is_terminal(terminal) => {
                self.rules.push(rule.clone());
                return Ok(());
            }
            [_] => return Err(unexpected()),
            [first, second] if self.is_nonterminal(first) && self.is_nonterminal(second) => {
                self.rules.push(rule.clone());
                return Ok(());
            }
            _ => {}
        }
        if rule.right.iter().any(Symbol::is_epsilon) {
            return Err(unexpected());
        }

        // The rule keeps its place ahead of the rules minted for it
        let slot = self.rules.len();
        self.rules.push(rule.clone());

        let mut right = Vec::with_capacity(rule.right.len());
        for symbol in &rule.right {
            if self.is_terminal(symbol) {
                right.push(self.reuse_or_mint(vec![symbol.clone()]));
            } else {
                right.push(symbol.clone());
            }
        }

        while right.len() > 2 {
            let pair = right.split_off(right.len() - 2);
            let joined = self.reuse_or_mint(pair);
            right.push(joined);
        }

        if self.single_rule.contains(&head) {
            self.index.register(&head, &right);
        }
        self.rules[slot].right = right;
        Ok(())
    }
}

// Rewrites every rule as `A -> a` or `A -> B C`, isolating terminals and
// splitting long right sides from the right
pub fn to_cnf(grammar: &Grammar, _limits: &Limits) -> Result<Grammar> {
    let mut builder = CnfBuilder::new(grammar);
    for rule in grammar.rules() {
        builder.add(rule)?;
    }

    rebuild(
        Stage::Cnf,
        grammar.start().clone(),
        builder.nonterminals,
        grammar.terminals().iter().cloned(),
        builder.rules,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::grammar::fixtures::*;

    fn convert(grammar: &Grammar) -> Grammar {
        to_cnf(grammar, &Limits::default()).unwrap()
    }

    #[test]
    fn isolates_terminals_and_binarizes() {
        let grammar = grammar("S", "S C", "a b", &[
            ("S", "a b C"),
            ("S", "C C"),
            ("C", "b"),
            ("C", "a"),
        ]);
        let result = convert(&grammar);

        assert_eq!(result.rules(), &[
            rule("S", "0 2"),
            rule("0", "a"),
            rule("1", "b"),
            rule("2", "1 C"),
            rule("S", "C C"),
            rule("C", "b"),
            rule("C", "a"),
        ][..]);
        assert_eq!(result.nonterminals().iter().cloned().collect_vec(), syms("S C 0 1 2"));
    }

    #[test]
    fn multi_rule_nonterminals_are_not_reused() {
        let grammar = grammar("S", "S A B", "a b", &[
            ("S", "a A b"),
            ("S", "b a"),
            ("A", "a"),
            ("B", "A A"),
            ("A", "B B"),
        ]);
        let result = convert(&grammar);

        // A has two rules, so `a` gets a fresh name
        assert_eq!(result.rules(), &[
            rule("S", "0 2"),
            rule("0", "a"),
            rule("1", "b"),
            rule("2", "A 1"),
            rule("S", "1 0"),
            rule("A", "a"),
            rule("B", "A A"),
            rule("A", "B B"),
        ][..]);
    }

    #[test]
    fn reuses_existing_pattern_owner() {
        let grammar = grammar("S", "S T P", "a b", &[
            ("S", "a P P"),
            ("S", "b"),
            ("T", "a"),
            ("P", "T T"),
        ]);
        let result = convert(&grammar);

        assert_eq!(result.rules(), &[
            rule("S", "T 0"),
            rule("0", "P P"),
            rule("S", "b"),
            rule("T", "a"),
            rule("P", "T T"),
        ][..]);
    }

    #[test]
    fn reuses_minted_symbols_across_rules() {
        let grammar = grammar("S", "S", "a b", &[
            ("S", "a b"),
            ("S", "b a"),
            ("S", "a a a"),
        ]);
        let result = convert(&grammar);

        assert_eq!(result.nonterminals().iter().cloned().collect_vec(), syms("S 0 1 2"));
        assert_eq!(result.rules(), &[
            rule("S", "0 1"),
            rule("0", "a"),
            rule("1", "b"),
            rule("S", "1 0"),
            rule("S", "0 2"),
            rule("2", "0 0"),
        ][..]);
        assert!(result.rules().iter().all(|rule| result.is_cnf_rule(rule)));
    }

    #[test]
    fn fresh_names_skip_taken_symbols() {
        let grammar = grammar("S", "S 1", "0 a", &[("S", "a 1"), ("1", "a"), ("1", "0")]);
        let result = convert(&grammar);

        assert_eq!(result.rules(), &[
            rule("S", "2 1"),
            rule("2", "a"),
            rule("1", "a"),
            rule("1", "0"),
        ][..]);
    }

    #[test]
    fn rejects_unit_rules() {
        let grammar = grammar("S", "S A", "a", &[("S", "A"), ("A", "a")]);
        assert_eq!(
            to_cnf(&grammar, &Limits::default()),
            Err(NormalizeError::UnexpectedRule { stage: Stage::Cnf, rule: rule("S", "A") })
        );
    }

    #[test]
    fn pattern_index_first_owner_wins() {
        let mut index = PatternIndex::default();
        index.register(&sym("X"), &syms("A B"));
        index.register(&sym("Y"), &syms("A B"));
        index.register(&sym("X"), &syms("B A"));

        assert_eq!(index.lookup(&syms("A B")), Some(&sym("X")));
        assert_eq!(index.lookup(&syms("B A")), None);
        assert_eq!(index.pattern_of(&sym("X")), Some(&syms("A B")[..]));
        assert_eq!(index.pattern_of(&sym("Y")), None);
    }
}
