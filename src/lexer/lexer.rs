use std::rc::Rc;

use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, Regex);

#[derive(Clone)]
pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

pub struct Lexer {
    patterns: Vec<RegexPattern>,
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            pos: 0,
            tokens: vec![],
            patterns: vec![
                RegexPattern { regex: Regex::new("\\s+").unwrap(), handler: skip_handler },
                RegexPattern { regex: Regex::new(";.*").unwrap(), handler: skip_handler },
                RegexPattern { regex: Regex::new("[0-9]+(\\.[0-9]+)?").unwrap(), handler: number_handler },
                RegexPattern { regex: Regex::new("\"[^\"]*\"").unwrap(), handler: string_handler },
                RegexPattern { regex: Regex::new("\\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(") },
                RegexPattern { regex: Regex::new("\\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")") },
                RegexPattern { regex: Regex::new("[a-zA-Z_+*/<>=!?-][a-zA-Z0-9_+*/<>=!?-]*").unwrap(), handler: symbol_handler },
            ],
            source,
            file: file_name,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.source.as_bytes()[self.pos] as char
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }
}

fn number_handler(lexer: &mut Lexer, regex: Regex) {
    let matched = regex.find(lexer.remainder()).unwrap().as_str().to_string();
    let start = lexer.pos;

    lexer.advance_n(matched.len());
    lexer.push(MK_TOKEN!(
        TokenKind::Number,
        matched,
        Span {
            start: Position(start as u32, Rc::clone(&lexer.file)),
            end: Position(lexer.pos as u32, Rc::clone(&lexer.file))
        }
    ));
}

fn skip_handler(lexer: &mut Lexer, regex: Regex) {
    let matched = regex.find(lexer.remainder()).unwrap().end();
    lexer.advance_n(matched);
}

fn string_handler(lexer: &mut Lexer, regex: Regex) {
    let remainder = lexer.remainder().to_string();
    let matched = regex.find(&remainder).unwrap();
    let raw = &remainder[(matched.start() + 1)..(matched.end() - 1)];

    let mut value = String::new();
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('"') => value.push('"'),
            Some('\\') => value.push('\\'),
            Some(other) => {
                // Unknown escapes keep the backslash
                value.push('\\');
                value.push(other);
            }
            None => value.push('\\'),
        }
    }

    let start = lexer.pos;
    lexer.advance_n(matched.end());
    lexer.push(MK_TOKEN!(
        TokenKind::String,
        value,
        Span {
            start: Position(start as u32, Rc::clone(&lexer.file)),
            end: Position(lexer.pos as u32, Rc::clone(&lexer.file))
        }
    ));
}

fn symbol_handler(lexer: &mut Lexer, regex: Regex) {
    let remainder = lexer.remainder().to_string();
    let value = regex.find(&remainder).unwrap();
    let start = lexer.pos;

    let kind = if let Some(kind) = RESERVED_LOOKUP.get(value.as_str()) {
        *kind
    } else {
        TokenKind::Symbol
    };

    lexer.advance_n(value.len());
    lexer.push(MK_TOKEN!(
        kind,
        String::from(value.as_str()),
        Span {
            start: Position(start as u32, Rc::clone(&lexer.file)),
            end: Position(lexer.pos as u32, Rc::clone(&lexer.file))
        }
    ));
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);
    let patterns = lex.patterns.clone();

    while !lex.at_eof() {
        let matched = patterns.iter().find(|pattern| {
            pattern
                .regex
                .find(lex.remainder())
                .is_some_and(|m| m.start() == 0)
        });

        match matched {
            Some(pattern) => (pattern.handler)(&mut lex, pattern.regex.clone()),
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().to_string(),
                    },
                    Position(lex.pos as u32, Rc::clone(&lex.file)),
                ))
            }
        }
    }

    lex.push(MK_TOKEN!(
        TokenKind::EOF,
        String::from("EOF"),
        Span {
            start: Position(lex.pos as u32, Rc::clone(&lex.file)),
            end: Position(lex.pos as u32, Rc::clone(&lex.file))
        }
    ));
    Ok(lex.tokens)
}
