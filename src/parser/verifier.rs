use std::collections::{HashMap, HashSet};

use log::warn;

use super::CompileErrorType::SymbolClash;
use super::{CompileError, CompileErrors, FileResult, Line, Word};

// The name a word is written with, and whether it was quoted
fn named(word: &Word) -> Option<(&String, bool)> {
    match word {
        Word::Nonterminal(name) => Some((name, false)),
        Word::Terminal(name) => Some((name, true)),
        Word::Epsilon => None
    }
}

fn get_clashing_symbols(lines: &[Line]) -> CompileErrors {
    // Remember how each name was first written, and report the first line
    // that writes it the other way
    let mut quoted = HashMap::new();
    let mut reported = HashSet::new();
    let mut errors = Vec::new();

    for line in lines {
        let words = line.left.iter().chain(line.rewrite.iter().flatten());
        for (name, is_terminal) in words.filter_map(named) {
            let first = *quoted.entry(name).or_insert(is_terminal);
            if first != is_terminal && reported.insert(name) {
                errors.push(CompileError {
                    location: line.location.clone(),
                    error: SymbolClash(name.clone())
                });
            }
        }
    }

    errors
}

fn warn_undefined_nonterminals(lines: &[Line]) {
    // Nonterminals without rules are legal, they just never produce anything
    let defined = lines.iter()
        .filter_map(|line| match line.left.as_slice() {
            [Word::Nonterminal(name)] => Some(name),
            _ => None
        })
        .collect::<HashSet<_>>();

    for line in lines {
        for word in line.rewrite.iter().flatten() {
            if let Word::Nonterminal(name) = word {
                if !defined.contains(name) {
                    warn!("{}: `{}` has no rules", line.location, name);
                }
            }
        }
    }
}

pub(super) fn verify_lines(lines: &[Line]) -> FileResult<()> {
    let mut errors = Vec::new();

    errors.extend(get_clashing_symbols(lines).into_iter());
    warn_undefined_nonterminals(lines);

    if errors.len() > 0 {
        Err(errors)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error_handling::Location;
    use std::path::PathBuf;

    fn line(number: usize, left: Vec<Word>, rewrite: Vec<Vec<Word>>) -> Line {
        Line {
            left,
            rewrite,
            location: Location { file: PathBuf::from("g.bnf"), line: number }
        }
    }

    #[test]
    fn consistent_lines_verify() {
        let lines = vec![
            line(1, vec![Word::Nonterminal("S".to_string())], vec![
                vec![Word::Terminal("a".to_string()), Word::Nonterminal("S".to_string())],
                vec![Word::Epsilon]
            ])
        ];
        assert_eq!(verify_lines(&lines), Ok(()));
    }

    #[test]
    fn clash_reported_once() {
        let lines = vec![
            line(1, vec![Word::Nonterminal("S".to_string())], vec![
                vec![Word::Terminal("S".to_string())]
            ]),
            line(2, vec![Word::Nonterminal("S".to_string())], vec![
                vec![Word::Terminal("S".to_string()), Word::Nonterminal("S".to_string())]
            ])
        ];

        assert_eq!(verify_lines(&lines), Err(vec![CompileError {
            location: Location { file: PathBuf::from("g.bnf"), line: 1 },
            error: SymbolClash("S".to_string())
        }]));
    }
}
