//! Parser state and the top-level parse entry point.
//!
//! The Parser struct owns the token stream and provides the token
//! consumption primitives (`current_token`, `advance`, `expect`) used by
//! the expression and type parsing functions.

use crate::{
    ast::expressions::Expression,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position,
};

use super::expr::parse_expr;

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// The list of tokens to parse
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    /// Returns the source position of the current token.
    pub fn current_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    /// Advances to the next token and returns the previous token.
    pub fn advance(&mut self) -> &Token {
        self.pos += 1;
        &self.tokens[self.pos - 1]
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        let token = self.current_token();
        let kind = token.kind;
        if kind != expected_kind {
            match error {
                Some(error) => Err(error),
                None if kind == TokenKind::EOF => Err(Error::new(
                    ErrorImpl::UnexpectedEndOfInput,
                    token.span.start.clone(),
                )),
                None => Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: token.value.clone(),
                    },
                    token.span.start.clone(),
                )),
            }
        } else {
            Ok(self.advance().clone())
        }
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.pos < self.tokens.len() && self.current_token_kind() != TokenKind::EOF
    }
}

/// Parses a stream of tokens into a single expression tree.
///
/// This is the main entry point for parsing. A program unit is exactly
/// one expression; trailing tokens after it are an error.
pub fn parse(tokens: Vec<Token>) -> Result<Expression, Error> {
    let mut parser = Parser::new(tokens);

    let expression = parse_expr(&mut parser)?;

    if parser.has_tokens() {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.current_position(),
        ));
    }

    Ok(expression)
}
