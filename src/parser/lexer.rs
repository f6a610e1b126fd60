use itertools::{Itertools, PeekingNext};

use super::{CompileErrorType, Result};
use crate::grammar::EPSILON;

#[derive(PartialEq, Debug)]
pub enum Token {
    Equals,
    Or,
    Epsilon,
    Nonterminal(String),
    Terminal(String)
}

// `""` is the empty string rather than a terminal
pub fn lex_terminal(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    line.next(); // Consume open quote
    let token_text: String = line.peeking_take_while(|&c| c != '\"').collect();

    // Check if there is a close quote and consume it if there is
    if line.next() != Some('\"') {
        return Err(CompileErrorType::UnmatchedQuote);
    }

    if token_text.is_empty() {
        Ok(Token::Epsilon)
    } else {
        Ok(Token::Terminal(token_text))
    }
}

// Bare words run until whitespace or one of the characters with a meaning
pub fn lex_nonterminal(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    let name: String = line
        .peeking_take_while(|&c| !c.is_whitespace() && !matches!(c, '=' | '|' | '\"' | ';'))
        .collect();

    if name == EPSILON {
        Ok(Token::Epsilon)
    } else {
        Ok(Token::Nonterminal(name))
    }
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(c) = line_chars.peek() {
        if *c == ';' {
            // The rest of the line is a comment
            break;
        } else if *c == '=' {
            line_chars.next();
            tokens.push(Token::Equals);
        } else if *c == '|' {
            line_chars.next();
            tokens.push(Token::Or);
        } else if *c == '\"' {
            tokens.push(lex_terminal(&mut line_chars)?);
        } else if !c.is_whitespace() {
            tokens.push(lex_nonterminal(&mut line_chars)?);
        } else {
            line_chars.next();
        }
    }

    return Ok(tokens);
}
