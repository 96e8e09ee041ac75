//! Type annotation parsing for function literals.
//!
//! Two annotation shapes are accepted after a function's parameter list:
//!
//! - `(-> Int Dyn Bool)` - a plain function type, last element is the
//!   return type
//! - `((-> (Int Low) (Bool High)) Low)` - a security function type where
//!   every component is a `(type label)` pair and the outer pair labels
//!   the function value itself

use crate::{
    ast::types::{
        FunctionType, SecurityBaseType, SecurityFunctionType, SecurityLabel, SecurityType, Type,
        TypeAnnotation,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

pub fn parse_type_annotation(parser: &mut Parser) -> Result<TypeAnnotation, Error> {
    parser.expect(TokenKind::OpenParen)?;

    // A nested open paren means the security pair form; a plain function
    // type starts with the arrow symbol instead.
    if parser.current_token_kind() == TokenKind::OpenParen {
        let function_type = parse_security_function_type(parser)?;
        let label = parse_security_label(parser)?;
        parser.expect(TokenKind::CloseParen)?;

        Ok(TypeAnnotation::Security(SecurityType {
            ty: SecurityBaseType::Function(function_type),
            label,
        }))
    } else {
        Ok(TypeAnnotation::Simple(parse_function_type_body(parser)?))
    }
}

/// Parses `-> T1 .. Tn R )` with the opening paren already consumed.
fn parse_function_type_body(parser: &mut Parser) -> Result<FunctionType, Error> {
    let arrow = expect_arrow(parser)?;

    let mut types = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        if parser.current_token_kind() == TokenKind::EOF {
            return Err(Error::new(
                ErrorImpl::UnexpectedEndOfInput,
                parser.current_position(),
            ));
        }
        types.push(parse_type(parser)?);
    }
    parser.expect(TokenKind::CloseParen)?;

    let return_type = types.pop().ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: String::from("->"),
                message: String::from("a function type needs a return type"),
            },
            arrow,
        )
    })?;

    Ok(FunctionType {
        parameter_types: types,
        return_type: Box::new(return_type),
    })
}

pub fn parse_type(parser: &mut Parser) -> Result<Type, Error> {
    match parser.current_token_kind() {
        TokenKind::Symbol => {
            let token = parser.advance().clone();
            match token.value.as_str() {
                "Bool" => Ok(Type::Bool),
                "Int" => Ok(Type::Int),
                "Float" => Ok(Type::Float),
                "String" => Ok(Type::String),
                "Dyn" => Ok(Type::Dynamic),
                _ => Err(Error::new(
                    ErrorImpl::UnexpectedToken { token: token.value },
                    token.span.start,
                )),
            }
        }
        TokenKind::OpenParen => {
            parser.advance();
            Ok(Type::Function(parse_function_type_body(parser)?))
        }
        _ => Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.current_position(),
        )),
    }
}

fn parse_security_function_type(parser: &mut Parser) -> Result<SecurityFunctionType, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let arrow = expect_arrow(parser)?;

    let mut types = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        if parser.current_token_kind() == TokenKind::EOF {
            return Err(Error::new(
                ErrorImpl::UnexpectedEndOfInput,
                parser.current_position(),
            ));
        }
        types.push(parse_security_type(parser)?);
    }
    parser.expect(TokenKind::CloseParen)?;

    let return_type = types.pop().ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: String::from("->"),
                message: String::from("a function type needs a return type"),
            },
            arrow,
        )
    })?;

    Ok(SecurityFunctionType {
        parameter_types: types,
        return_type: Box::new(return_type),
    })
}

pub fn parse_security_type(parser: &mut Parser) -> Result<SecurityType, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let ty = if parser.current_token_kind() == TokenKind::OpenParen {
        SecurityBaseType::Function(parse_security_function_type(parser)?)
    } else {
        let token = parser.expect(TokenKind::Symbol)?;
        match token.value.as_str() {
            "Bool" => SecurityBaseType::Bool,
            "Int" => SecurityBaseType::Int,
            "Float" => SecurityBaseType::Float,
            "String" => SecurityBaseType::String,
            _ => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedToken { token: token.value },
                    token.span.start,
                ))
            }
        }
    };

    let label = parse_security_label(parser)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(SecurityType { ty, label })
}

fn parse_security_label(parser: &mut Parser) -> Result<SecurityLabel, Error> {
    let token = parser.expect(TokenKind::Symbol)?;
    match token.value.as_str() {
        "High" => Ok(SecurityLabel::High),
        "Low" => Ok(SecurityLabel::Low),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.value,
                message: String::from("expected a security label"),
            },
            token.span.start,
        )),
    }
}

fn expect_arrow(parser: &mut Parser) -> Result<crate::Position, Error> {
    let token = parser.expect(TokenKind::Symbol)?;
    if token.value == "->" {
        Ok(token.span.start)
    } else {
        Err(Error::new(
            ErrorImpl::UnexpectedToken { token: token.value },
            token.span.start,
        ))
    }
}
