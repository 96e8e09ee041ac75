use crate::{
    ast::{
        expressions::{
            ApplyExpression, BinaryExpression, BinaryOperator, Expression, FunctionExpression,
            GetExpression, IfExpression, LetExpression, LiteralExpression, LiteralKind,
            UnaryExpression, UnaryOperator,
        },
        types::{Constant, SecurityLabel},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Span,
};

use super::{parser::Parser, types::parse_type_annotation};

pub fn parse_expr(parser: &mut Parser) -> Result<Expression, Error> {
    match parser.current_token_kind() {
        TokenKind::Number => parse_number_literal(parser),
        TokenKind::String => {
            let token = parser.advance().clone();
            Ok(Expression::Literal(LiteralExpression {
                kind: LiteralKind::String,
                value: Constant::Str(token.value),
                label: SecurityLabel::Low,
                span: token.span,
            }))
        }
        TokenKind::True | TokenKind::False => {
            let token = parser.advance().clone();
            Ok(Expression::Literal(LiteralExpression {
                kind: LiteralKind::Bool,
                value: Constant::Bool(token.kind == TokenKind::True),
                label: SecurityLabel::Low,
                span: token.span,
            }))
        }
        TokenKind::Symbol => {
            let token = parser.advance().clone();
            Ok(Expression::Get(GetExpression {
                symbol: token.value,
                span: token.span,
            }))
        }
        TokenKind::OpenParen => parse_list_expr(parser),
        TokenKind::EOF => Err(Error::new(
            ErrorImpl::UnexpectedEndOfInput,
            parser.current_position(),
        )),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.current_position(),
        )),
    }
}

fn parse_number_literal(parser: &mut Parser) -> Result<Expression, Error> {
    let token = parser.advance().clone();

    if token.value.contains('.') {
        let result = token.value.parse::<f64>();
        match result {
            Ok(value) => Ok(Expression::Literal(LiteralExpression {
                kind: LiteralKind::Float,
                value: Constant::Float(value),
                label: SecurityLabel::Low,
                span: token.span,
            })),
            Err(_) => Err(Error::new(
                ErrorImpl::NumberParseError { token: token.value },
                token.span.start.clone(),
            )),
        }
    } else {
        let result = token.value.parse::<i64>();
        match result {
            Ok(value) => Ok(Expression::Literal(LiteralExpression {
                kind: LiteralKind::Int,
                value: Constant::Int(value),
                label: SecurityLabel::Low,
                span: token.span,
            })),
            Err(_) => Err(Error::new(
                ErrorImpl::NumberParseError { token: token.value },
                token.span.start.clone(),
            )),
        }
    }
}

/// Dispatches a parenthesized form on its head symbol. Reserved heads
/// are special forms; anything else is an application.
fn parse_list_expr(parser: &mut Parser) -> Result<Expression, Error> {
    let open = parser.expect(TokenKind::OpenParen)?;

    if parser.current_token_kind() == TokenKind::Symbol {
        match parser.current_token().value.as_str() {
            "not" => return parse_unary_expr(parser, open),
            "and" | "or" | "+" | "-" | "*" | "/" => return parse_binary_expr(parser, open),
            "if" => return parse_if_expr(parser, open),
            "let" => return parse_let_expr(parser, open),
            "fun" => return parse_function_expr(parser, open),
            "dyn" => return parse_dynamic_literal(parser, open),
            "High" | "Low" => return parse_labeled_literal(parser, open),
            _ => {}
        }
    }

    let function = parse_expr(parser)?;

    let mut arguments = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        if parser.current_token_kind() == TokenKind::EOF {
            return Err(Error::new(
                ErrorImpl::UnexpectedEndOfInput,
                parser.current_position(),
            ));
        }
        arguments.push(parse_expr(parser)?);
    }

    let close = parser.expect(TokenKind::CloseParen)?;

    Ok(Expression::Apply(ApplyExpression {
        function: Box::new(function),
        arguments,
        span: span_between(&open, &close),
    }))
}

fn parse_unary_expr(parser: &mut Parser, open: Token) -> Result<Expression, Error> {
    parser.advance();

    let expression = parse_expr(parser)?;
    let close = parser.expect(TokenKind::CloseParen)?;

    Ok(Expression::Unary(UnaryExpression {
        operator: UnaryOperator::Not,
        expression: Box::new(expression),
        span: span_between(&open, &close),
    }))
}

fn parse_binary_expr(parser: &mut Parser, open: Token) -> Result<Expression, Error> {
    let operator_token = parser.advance().clone();
    let operator = match operator_token.value.as_str() {
        "and" => BinaryOperator::And,
        "or" => BinaryOperator::Or,
        "+" => BinaryOperator::Add,
        "-" => BinaryOperator::Subtract,
        "*" => BinaryOperator::Multiply,
        "/" => BinaryOperator::Divide,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let first = parse_expr(parser)?;
    let second = parse_expr(parser)?;
    let close = parser.expect(TokenKind::CloseParen)?;

    Ok(Expression::Binary(BinaryExpression {
        operator,
        first: Box::new(first),
        second: Box::new(second),
        span: span_between(&open, &close),
    }))
}

fn parse_if_expr(parser: &mut Parser, open: Token) -> Result<Expression, Error> {
    parser.advance();

    let condition = parse_expr(parser)?;
    let then_branch = parse_expr(parser)?;
    let else_branch = parse_expr(parser)?;
    let close = parser.expect(TokenKind::CloseParen)?;

    Ok(Expression::If(IfExpression {
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
        span: span_between(&open, &close),
    }))
}

fn parse_let_expr(parser: &mut Parser, open: Token) -> Result<Expression, Error> {
    parser.advance();

    let symbol = parser.expect(TokenKind::Symbol)?;
    let value = parse_expr(parser)?;
    let body = parse_expr(parser)?;
    let close = parser.expect(TokenKind::CloseParen)?;

    Ok(Expression::Let(LetExpression {
        symbol: symbol.value,
        value: Box::new(value),
        body: Box::new(body),
        span: span_between(&open, &close),
    }))
}

fn parse_function_expr(parser: &mut Parser, open: Token) -> Result<Expression, Error> {
    parser.advance();

    // Each parameter must be a plain symbol
    parser.expect(TokenKind::OpenParen)?;
    let mut parameters = vec![];
    while parser.current_token_kind() == TokenKind::Symbol {
        parameters.push(parser.advance().value.clone());
    }
    parser.expect(TokenKind::CloseParen)?;

    let annotation = parse_type_annotation(parser)?;
    let body = parse_expr(parser)?;
    let close = parser.expect(TokenKind::CloseParen)?;

    Ok(Expression::Function(FunctionExpression {
        parameters,
        annotation,
        body: Box::new(body),
        span: span_between(&open, &close),
    }))
}

fn parse_dynamic_literal(parser: &mut Parser, open: Token) -> Result<Expression, Error> {
    let keyword = parser.advance().clone();

    let inner = parse_expr(parser)?;
    let close = parser.expect(TokenKind::CloseParen)?;

    match inner {
        Expression::Literal(literal) if literal.kind != LiteralKind::Dynamic => {
            Ok(Expression::Literal(LiteralExpression {
                kind: LiteralKind::Dynamic,
                value: literal.value,
                label: literal.label,
                span: span_between(&open, &close),
            }))
        }
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: keyword.value,
                message: String::from("dyn wraps a ground literal"),
            },
            keyword.span.start,
        )),
    }
}

fn parse_labeled_literal(parser: &mut Parser, open: Token) -> Result<Expression, Error> {
    let label_token = parser.advance().clone();
    let label = match label_token.value.as_str() {
        "High" => SecurityLabel::High,
        _ => SecurityLabel::Low,
    };

    let inner = parse_expr(parser)?;
    let close = parser.expect(TokenKind::CloseParen)?;

    match inner {
        Expression::Literal(literal) => Ok(Expression::Literal(LiteralExpression {
            kind: literal.kind,
            value: literal.value,
            label,
            span: span_between(&open, &close),
        })),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: label_token.value,
                message: String::from("a security label annotates a literal"),
            },
            label_token.span.start,
        )),
    }
}

fn span_between(open: &Token, close: &Token) -> Span {
    Span {
        start: open.span.start.clone(),
        end: close.span.end.clone(),
    }
}
