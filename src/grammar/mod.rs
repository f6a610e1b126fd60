/*
    This module is for storing, validating and classifying grammars
*/

pub mod set_ops;

use std::fmt::Display;

use indexmap::IndexSet;
use itertools::Itertools;

use crate::error_handling::ErrorType;

// Spelling of the empty string
pub const EPSILON: &str = "ε";

// The base unit in a grammar rule. Whether a symbol is a terminal or a
// nonterminal is decided by the grammar that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    pub fn epsilon() -> Self {
        Symbol(EPSILON.to_string())
    }

    pub fn is_epsilon(&self) -> bool {
        self.0 == EPSILON
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub left: Vec<Symbol>,
    pub right: Vec<Symbol>,
}

impl Rule {
    pub fn new(left: Vec<Symbol>, right: Vec<Symbol>) -> Self {
        Rule { left, right }
    }

    // A rule with a single symbol on the left
    pub fn production(head: Symbol, right: Vec<Symbol>) -> Self {
        Rule { left: vec![head], right }
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self.right.as_slice(), [symbol] if symbol.is_epsilon())
    }

    // The left side, if it is exactly one symbol
    pub fn head(&self) -> Option<&Symbol> {
        match self.left.as_slice() {
            [symbol] => Some(symbol),
            _ => None,
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.left.iter().join(" "), self.right.iter().join(" "))
    }
}

// Chomsky hierarchy class, most restrictive first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarType {
    RightRegular,
    LeftRegular,
    ContextFree,
    ContextSensitive,
    RecursivelyEnumerable,
}

impl Display for GrammarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarType::RightRegular => write!(f, "Right Regular"),
            GrammarType::LeftRegular => write!(f, "Left Regular"),
            GrammarType::ContextFree => write!(f, "Context Free"),
            GrammarType::ContextSensitive => write!(f, "Context Sensitive"),
            GrammarType::RecursivelyEnumerable => write!(f, "Recursively Enumerable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    // The start symbol is not among the nonterminals
    StartNotNonterminal(Symbol),
    // A symbol is declared both as a terminal and as a nonterminal
    OverlappingSymbol(Symbol),
    // ε was declared as a terminal or a nonterminal
    EpsilonDeclared,
    // A rule with nothing on one of its sides
    EmptySide(Rule),
    // A rule uses a symbol that was never declared
    UnknownSymbol { symbol: Symbol, rule: Rule },
    // ε written next to other symbols on a right side
    EpsilonInSequence(Rule),
}

impl ErrorType for GrammarError {}

impl Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarError::StartNotNonterminal(start) => write!(f, "Start symbol `{}` must be a nonterminal", start),
            GrammarError::OverlappingSymbol(symbol) => write!(f, "`{}` is both a terminal and a nonterminal", symbol),
            GrammarError::EpsilonDeclared => write!(f, "`{}` cannot be declared as a terminal or nonterminal", EPSILON),
            GrammarError::EmptySide(rule) => write!(f, "Rule `{}` has an empty side", rule),
            GrammarError::UnknownSymbol { symbol, rule } => write!(f, "Rule `{}` uses undeclared symbol `{}`", rule, symbol),
            GrammarError::EpsilonInSequence(rule) => write!(f, "Rule `{}` mixes `{}` with other symbols", rule, EPSILON),
        }
    }
}

pub type Result<T> = std::result::Result<T, GrammarError>;

// An immutable, validated grammar. Every constructor goes through `new`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    start: Symbol,
    nonterminals: IndexSet<Symbol>,
    terminals: IndexSet<Symbol>,
    rules: Vec<Rule>,
    kind: GrammarType,
}

impl Grammar {
    pub fn new(
        start: Symbol,
        nonterminals: impl IntoIterator<Item = Symbol>,
        terminals: impl IntoIterator<Item = Symbol>,
        rules: Vec<Rule>,
    ) -> Result<Grammar> {
        let nonterminals: IndexSet<Symbol> = nonterminals.into_iter().collect();
        let terminals: IndexSet<Symbol> = terminals.into_iter().collect();

        if !nonterminals.contains(&start) {
            return Err(GrammarError::StartNotNonterminal(start));
        }
        if let Some(symbol) = nonterminals.intersection(&terminals).next() {
            return Err(GrammarError::OverlappingSymbol(symbol.clone()));
        }
        if nonterminals.iter().chain(terminals.iter()).any(Symbol::is_epsilon) {
            return Err(GrammarError::EpsilonDeclared);
        }

        let declared = |symbol: &Symbol| nonterminals.contains(symbol) || terminals.contains(symbol);
        for rule in &rules {
            if rule.left.is_empty() || rule.right.is_empty() {
                return Err(GrammarError::EmptySide(rule.clone()));
            }
            // ε only ever stands alone
            if rule.right.len() > 1 && rule.right.iter().any(Symbol::is_epsilon) {
                return Err(GrammarError::EpsilonInSequence(rule.clone()));
            }
            // ε is only allowed on the right
            let unknown = rule.left.iter()
                .find(|symbol| !declared(symbol))
                .or_else(|| rule.right.iter().find(|symbol| !declared(symbol) && !symbol.is_epsilon()));
            if let Some(symbol) = unknown {
                return Err(GrammarError::UnknownSymbol {
                    symbol: symbol.clone(),
                    rule: rule.clone()
                });
            }
        }

        let kind = classify(&nonterminals, &terminals, &rules);

        Ok(Grammar {
            start,
            nonterminals,
            terminals,
            rules,
            kind,
        })
    }

    // The same grammar re-validated around a different start symbol
    pub fn with_start(&self, start: Symbol) -> Result<Grammar> {
        Grammar::new(
            start,
            self.nonterminals.iter().cloned(),
            self.terminals.iter().cloned(),
            self.rules.clone(),
        )
    }

    pub fn start(&self) -> &Symbol {
        &self.start
    }

    pub fn nonterminals(&self) -> &IndexSet<Symbol> {
        &self.nonterminals
    }

    pub fn terminals(&self) -> &IndexSet<Symbol> {
        &self.terminals
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn kind(&self) -> GrammarType {
        self.kind
    }

    pub fn is_nonterminal(&self, symbol: &Symbol) -> bool {
        self.nonterminals.contains(symbol)
    }

    pub fn is_terminal(&self, symbol: &Symbol) -> bool {
        self.terminals.contains(symbol)
    }

    // Rules whose whole left side is `head`
    pub fn rules_for<'a>(&'a self, head: &'a Symbol) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |rule| rule.head() == Some(head))
    }

    // A renaming rule `A -> B`
    pub fn is_unit(&self, rule: &Rule) -> bool {
        matches!(rule.right.as_slice(), [symbol] if self.is_nonterminal(symbol))
    }

    // `A -> a` or `A -> B C`
    pub fn is_cnf_rule(&self, rule: &Rule) -> bool {
        rule.head().is_some_and(|head| self.is_nonterminal(head))
            && match rule.right.as_slice() {
                [terminal] => self.is_terminal(terminal),
                [first, second] => self.is_nonterminal(first) && self.is_nonterminal(second),
                _ => false,
            }
    }
}

fn classify(nonterminals: &IndexSet<Symbol>, terminals: &IndexSet<Symbol>, rules: &[Rule]) -> GrammarType {
    let is_nonterminal = |symbol: &Symbol| nonterminals.contains(symbol);
    let is_terminal = |symbol: &Symbol| terminals.contains(symbol);

    let context_free = rules.iter()
        .all(|rule| rule.head().is_some_and(is_nonterminal));
    if context_free {
        let regular_shaped = rules.iter().all(|rule| match rule.right.as_slice() {
            [symbol] => is_terminal(symbol),
            [_, _] => true,
            _ => false,
        });
        if regular_shaped {
            let pairs = rules.iter()
                .filter(|rule| rule.right.len() == 2)
                .map(|rule| (&rule.right[0], &rule.right[1]))
                .collect_vec();
            if pairs.iter().all(|(first, second)| is_terminal(first) && is_nonterminal(second)) {
                return GrammarType::RightRegular;
            }
            if pairs.iter().all(|(first, second)| is_nonterminal(first) && is_terminal(second)) {
                return GrammarType::LeftRegular;
            }
        }
        return GrammarType::ContextFree;
    }

    if rules.iter().all(|rule| rule.left.len() <= rule.right.len()) {
        GrammarType::ContextSensitive
    } else {
        GrammarType::RecursivelyEnumerable
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Type: {}", self.kind)?;
        writeln!(f, "Nonterminals: {} ({})", self.nonterminals.iter().join(", "), self.nonterminals.len())?;
        writeln!(f, "Terminals: {} ({})", self.terminals.iter().join(", "), self.terminals.len())?;
        writeln!(f, "Start symbol: {}", self.start)?;
        writeln!(f, "Productions:")?;
        for rule in self.rules.iter().sorted_by_key(|rule| rule.left.iter().join(" ")) {
            writeln!(f, "    {}", rule)?;
        }
        write!(f, "{} productions", self.rules.len())
    }
}

// Shorthand for building grammars in tests: rule sides are whitespace
// separated symbol names, with `ε` for the empty string.
#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub fn sym(name: &str) -> Symbol {
        Symbol::new(name)
    }

    pub fn syms(names: &str) -> Vec<Symbol> {
        names.split_whitespace().map(Symbol::new).collect()
    }

    pub fn rule(left: &str, right: &str) -> Rule {
        Rule::new(syms(left), syms(right))
    }

    pub fn grammar(start: &str, nonterminals: &str, terminals: &str, rules: &[(&str, &str)]) -> Grammar {
        Grammar::new(
            sym(start),
            syms(nonterminals),
            syms(terminals),
            rules.iter().map(|(left, right)| rule(left, right)).collect(),
        ).unwrap()
    }

    // The grammar the normalizer is usually demonstrated on
    pub fn textbook() -> Grammar {
        grammar("S", "S A B C D", "a b", &[
            ("S", "a B"),
            ("S", "A C"),
            ("S", "b A"),
            ("S", "a A"),
            ("A", "ε"),
            ("A", "a S"),
            ("A", "A B A b"),
            ("B", "a"),
            ("B", "A b S A"),
            ("C", "a b C"),
            ("D", "A B"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::fixtures::*;
    use super::*;

    fn build(start: &str, nonterminals: &str, terminals: &str, rules: &[(&str, &str)]) -> Result<Grammar> {
        Grammar::new(
            sym(start),
            syms(nonterminals),
            syms(terminals),
            rules.iter().map(|(left, right)| rule(left, right)).collect(),
        )
    }

    #[test]
    fn accepts_well_formed_grammar() {
        let grammar = textbook();
        assert_eq!(grammar.start(), &sym("S"));
        assert_eq!(grammar.nonterminals().len(), 5);
        assert_eq!(grammar.terminals().len(), 2);
        assert_eq!(grammar.rules().len(), 11);
        assert_eq!(grammar.kind(), GrammarType::ContextFree);
    }

    #[test]
    fn rejects_invariant_violations() {
        assert_eq!(
            build("X", "S", "a", &[("S", "a")]),
            Err(GrammarError::StartNotNonterminal(sym("X")))
        );
        assert_eq!(
            build("S", "S a", "a", &[("S", "a")]),
            Err(GrammarError::OverlappingSymbol(sym("a")))
        );
        assert_eq!(
            build("S", "S ε", "a", &[("S", "a")]),
            Err(GrammarError::EpsilonDeclared)
        );
        assert_eq!(
            build("S", "S", "a", &[("S", "a c")]),
            Err(GrammarError::UnknownSymbol { symbol: sym("c"), rule: rule("S", "a c") })
        );
        assert_eq!(
            build("S", "S", "a", &[("S ε", "a")]),
            Err(GrammarError::UnknownSymbol { symbol: sym("ε"), rule: rule("S ε", "a") })
        );
        assert_eq!(
            build("S", "S", "a", &[("S", "")]),
            Err(GrammarError::EmptySide(rule("S", "")))
        );
        assert_eq!(
            build("S", "S", "a b", &[("S", "a ε"), ("S", "b")]),
            Err(GrammarError::EpsilonInSequence(rule("S", "a ε")))
        );
    }

    #[test]
    fn epsilon_allowed_on_right() {
        assert!(build("S", "S", "a", &[("S", "ε"), ("S", "a")]).is_ok());
    }

    #[test]
    fn classifies_grammars() {
        let right = grammar("S", "S", "a b", &[("S", "a S"), ("S", "b")]);
        assert_eq!(right.kind(), GrammarType::RightRegular);

        let left = grammar("S", "S", "a b", &[("S", "S a"), ("S", "b")]);
        assert_eq!(left.kind(), GrammarType::LeftRegular);

        let free = grammar("S", "S", "a b", &[("S", "a S b"), ("S", "b")]);
        assert_eq!(free.kind(), GrammarType::ContextFree);

        let sensitive = grammar("S", "S B", "a b", &[("S", "a S B"), ("a B", "a b")]);
        assert_eq!(sensitive.kind(), GrammarType::ContextSensitive);

        let unrestricted = grammar("S", "S B", "a b", &[("S", "a B"), ("a B", "b")]);
        assert_eq!(unrestricted.kind(), GrammarType::RecursivelyEnumerable);
    }

    #[test]
    fn with_start_revalidates() {
        let grammar = textbook();
        assert_eq!(grammar.with_start(sym("A")).unwrap().start(), &sym("A"));
        assert_eq!(
            grammar.with_start(sym("a")),
            Err(GrammarError::StartNotNonterminal(sym("a")))
        );
    }

    #[test]
    fn rule_shapes() {
        let grammar = textbook();
        assert!(rule("A", "ε").is_epsilon());
        assert!(!rule("A", "a").is_epsilon());
        assert!(grammar.is_unit(&rule("S", "B")));
        assert!(!grammar.is_unit(&rule("S", "a")));
        assert!(grammar.is_cnf_rule(&rule("S", "A B")));
        assert!(grammar.is_cnf_rule(&rule("S", "a")));
        assert!(!grammar.is_cnf_rule(&rule("S", "a B")));
        assert!(!grammar.is_cnf_rule(&rule("S A", "a")));
        assert_eq!(rule("S A", "a").head(), None);
    }

    #[test]
    fn rules_for_head() {
        let grammar = textbook();
        let s = sym("S");
        assert_eq!(grammar.rules_for(&s).count(), 4);
    }

    #[test]
    fn renders_rules() {
        assert_eq!(rule("S", "a B").to_string(), "S -> a B");
        assert_eq!(rule("a B", "a b").to_string(), "a B -> a b");

        let rendered = grammar("S", "S", "a", &[("S", "a")]).to_string();
        assert!(rendered.contains("Type: Right Regular"));
        assert!(rendered.contains("    S -> a"));
        assert!(rendered.ends_with("1 productions"));
    }
}
