/*
    This module reads grammars from BNF-like files
*/

mod lexer;
mod verifier;

use std::fmt::Display;
use std::fs::File;
use std::io::BufRead;
use std::path::PathBuf;

use indexmap::IndexSet;
use itertools::Itertools;

use crate::error_handling::*;
use crate::grammar::*;
use lexer::*;
use verifier::verify_lines;

#[derive(Debug)]
pub enum CompileErrorType {
    // A line which should contain a rule does not
    MissingEquals,
    // A rule has multiple equals signs
    UnexpectedEquals,
    // Nothing before the equals sign
    MissingLeftSide,
    // ε on the left of a rule
    EpsilonOnLeft,
    // An alternative with no symbols, e.g. `A = | "a"`
    EmptyAlternative,
    // The empty string written next to other symbols, e.g. `A = "a" ""`
    EpsilonInSequence,
    // There is an unclosed quote
    UnmatchedQuote,
    // A name used both quoted and bare
    SymbolClash(String),
    // The file holds no rules
    EmptyGrammar,
    // The rules parsed but do not form a valid grammar
    InvalidGrammar(GrammarError),
    // Somehow a full rewrite was parsed as a base alternative
    // This is a problem with chomskify, not the grammar
    UnsplitRewrite,
    // A blank line got too deep into the parser
    // This is a problem with chomskify, not the grammar
    UnexpectedBlankLine,
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for CompileErrorType {}

impl PartialEq for CompileErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CompileErrorType::FileError(a), CompileErrorType::FileError(b)) => a.kind() == b.kind(),
            (CompileErrorType::SymbolClash(a), CompileErrorType::SymbolClash(b)) => a == b,
            (CompileErrorType::InvalidGrammar(a), CompileErrorType::InvalidGrammar(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for CompileErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileErrorType::MissingEquals => write!(f, "Expected `=` after the left side of a rule"),
            CompileErrorType::UnexpectedEquals => write!(f, "Unexpected `=` encountered"),
            CompileErrorType::MissingLeftSide => write!(f, "Rule has nothing to rewrite on its left side"),
            CompileErrorType::EpsilonOnLeft => write!(f, "`{}` cannot appear on the left side of a rule", EPSILON),
            CompileErrorType::EmptyAlternative => write!(f, "Empty alternative (write `\"\"` for the empty string)"),
            CompileErrorType::EpsilonInSequence => write!(f, "The empty string must be an alternative on its own"),
            CompileErrorType::UnmatchedQuote => write!(f, "Unmatched quotes"),
            CompileErrorType::SymbolClash(name) => write!(f, "`{}` is used both as a terminal and as a nonterminal", name),
            CompileErrorType::EmptyGrammar => write!(f, "No rules found"),
            CompileErrorType::InvalidGrammar(error) => write!(f, "Invalid grammar: {}", error),
            CompileErrorType::UnsplitRewrite => write!(f, "Rewrite was not fully split (this is a problem with chomskify, not the grammar)"),
            CompileErrorType::UnexpectedBlankLine => write!(f, "Blank line encountered in rule parser (this is a problem with chomskify, not the grammar)"),
            CompileErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type CompileError = Error<CompileErrorType>;
pub type CompileErrors = Errors<CompileErrorType>;

fn io_error(error: std::io::Error, file: PathBuf) -> CompileError {
    CompileError::in_file(file, CompileErrorType::FileError(error))
}

pub type Result<T> = std::result::Result<T, CompileErrorType>;
pub type LineResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

// One symbol as written in the file
#[derive(PartialEq, Debug, Clone)]
enum Word {
    Nonterminal(String),
    Terminal(String),
    Epsilon
}

impl Word {
    fn to_symbol(&self) -> Symbol {
        match self {
            Word::Nonterminal(name) | Word::Terminal(name) => Symbol::new(name.as_str()),
            Word::Epsilon => Symbol::epsilon(),
        }
    }
}

// The symbols in a single alternative
type Alternative = Vec<Word>;

// A line of the file: `left = alternative | alternative ...`
#[derive(PartialEq, Debug)]
struct Line {
    left: Vec<Word>,
    rewrite: Vec<Alternative>,
    location: Location
}

fn parse_word(token: &Token) -> Result<Word> {
    match token {
        Token::Equals => Err(CompileErrorType::UnexpectedEquals),
        Token::Or => Err(CompileErrorType::UnsplitRewrite),
        Token::Epsilon => Ok(Word::Epsilon),
        Token::Nonterminal(s) => Ok(Word::Nonterminal(s.clone())),
        Token::Terminal(s) => Ok(Word::Terminal(s.clone()))
    }
}

fn parse_alternative(tokens: &[Token]) -> Result<Alternative> {
    if tokens.is_empty() {
        return Err(CompileErrorType::EmptyAlternative);
    }
    if tokens.len() > 1 && tokens.contains(&Token::Epsilon) {
        return Err(CompileErrorType::EpsilonInSequence);
    }
    tokens.iter().map(parse_word).collect()
}

fn parse_rewrite(tokens: &[Token]) -> Result<Vec<Alternative>> {
    tokens.split(|t| *t == Token::Or).map(parse_alternative).collect()
}

fn parse_left(tokens: &[Token]) -> Result<Vec<Word>> {
    if tokens.is_empty() {
        return Err(CompileErrorType::MissingLeftSide);
    }
    tokens.iter().map(|token| match token {
        Token::Or => Err(CompileErrorType::MissingLeftSide),
        Token::Epsilon => Err(CompileErrorType::EpsilonOnLeft),
        _ => parse_word(token),
    }).collect()
}

fn parse_line(tokens: &[Token], location: Location) -> Result<Line> {
    if tokens.is_empty() {
        return Err(CompileErrorType::UnexpectedBlankLine);
    }

    let equals = tokens.iter()
        .position(|t| *t == Token::Equals)
        .ok_or(CompileErrorType::MissingEquals)?;

    let left = parse_left(&tokens[..equals])?;
    let rewrite = parse_rewrite(&tokens[equals + 1..])?;

    return Ok(Line {
        left,
        rewrite,
        location
    });
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Line> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone()))
        .map_err(|error| CompileError { location, error })
}

// Blank lines and lines starting with `;` hold no rule
fn is_rule_line(line: &String) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with(';')
}

// Returns an iterator over the lines of a file, with the io errors wrapped
// in CompileError and enumerated
fn file_line_nums<'a>(file: File, path: &'a PathBuf) -> impl Iterator<Item = (usize, LineResult<String>)> + 'a {
    std::io::BufReader::new(file)
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path.clone())))
        .enumerate()
        .filter(|(_, line)| line.as_ref().is_ok_and(is_rule_line) || line.is_err())
        .map(|(num, line)| (num + 1, line))
}

// Collects the symbols of every line, in order of first appearance, and
// builds the grammar. The start symbol is the first one defined.
fn grammar_from_lines(lines: Vec<Line>, path: &PathBuf) -> FileResult<Grammar> {
    let start = lines.first()
        .and_then(|line| line.left.first())
        .map(Word::to_symbol)
        .ok_or_else(|| vec![CompileError::in_file(path.clone(), CompileErrorType::EmptyGrammar)])?;

    verify_lines(&lines)?;

    let words = lines.iter()
        .flat_map(|line| line.left.iter().chain(line.rewrite.iter().flatten()))
        .collect_vec();
    let nonterminals: IndexSet<Symbol> = words.iter()
        .filter(|word| matches!(word, Word::Nonterminal(_)))
        .map(|word| word.to_symbol())
        .collect();
    let terminals: IndexSet<Symbol> = words.iter()
        .filter(|word| matches!(word, Word::Terminal(_)))
        .map(|word| word.to_symbol())
        .collect();

    let rules = lines.iter()
        .flat_map(|line| line.rewrite.iter().map(move |alternative| Rule::new(
            line.left.iter().map(Word::to_symbol).collect(),
            alternative.iter().map(Word::to_symbol).collect(),
        )))
        .collect_vec();

    Grammar::new(start, nonterminals, terminals, rules)
        .map_err(|error| vec![CompileError::in_file(path.clone(), CompileErrorType::InvalidGrammar(error))])
}

pub fn parse_file(path: &PathBuf) -> FileResult<Grammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path.clone())])?;
    let lines = file_line_nums(file, path);

    let parsed_lines = lines.map(|(num, line_res)| {
        line_res.and_then(|line| parse_lex_line(&line, Location {
            file: path.clone(),
            line: num
        }))
    });

    let (lines, errors): (Vec<_>, Vec<_>) = parsed_lines.partition_result();
    if !errors.is_empty() {
        return Err(errors);
    }

    return grammar_from_lines(lines, path);
}
