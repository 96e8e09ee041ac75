use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnexpectedEndOfInput => "UnexpectedEndOfInput",
            ErrorImpl::ValueLiteralTypeError { .. } => "ValueLiteralTypeError",
            ErrorImpl::TypeMismatchError { .. } => "TypeMismatchError",
            ErrorImpl::ArityMismatchError { .. } => "ArityMismatchError",
            ErrorImpl::UnboundSymbolError { .. } => "UnboundSymbolError",
            ErrorImpl::SecurityFlowViolationError { .. } => "SecurityFlowViolationError",
            ErrorImpl::UnsupportedOperationError { .. } => "UnsupportedOperationError",
            ErrorImpl::DynamicGuardError { .. } => "DynamicGuardError",
            ErrorImpl::DivisionByZeroError => "DivisionByZeroError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, is a parenthesis missing?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnexpectedEndOfInput => ErrorTip::Suggestion(String::from(
                "The program ends before its closing parenthesis",
            )),
            ErrorImpl::ValueLiteralTypeError { expected, received } => ErrorTip::Suggestion(
                format!("{} was expected, this literal holds {}", expected, received),
            ),
            ErrorImpl::TypeMismatchError { expected, received } => {
                ErrorTip::Suggestion(format!("{} was expected, found {}", expected, received))
            }
            ErrorImpl::ArityMismatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::UnboundSymbolError { symbol } => ErrorTip::Suggestion(format!(
                "Symbol `{}` is not bound in the current scope",
                symbol
            )),
            ErrorImpl::SecurityFlowViolationError {
                boundary,
                required,
                inferred,
            } => ErrorTip::Suggestion(format!(
                "The {} label {} may not flow into the declared {}",
                boundary, inferred, required
            )),
            ErrorImpl::UnsupportedOperationError { operation } => ErrorTip::Suggestion(format!(
                "`{}` is not supported by this checker",
                operation
            )),
            ErrorImpl::DynamicGuardError { expected, received } => ErrorTip::Suggestion(format!(
                "{} was expected at runtime, found {}",
                expected, received
            )),
            ErrorImpl::DivisionByZeroError => {
                ErrorTip::Suggestion(String::from("The divisor evaluates to zero"))
            }
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("{expected} was expected, this literal holds {received}")]
    ValueLiteralTypeError { expected: String, received: String },
    #[error("{expected} was expected, found {received}")]
    TypeMismatchError { expected: String, received: String },
    #[error("function takes {expected} parameters but {received} arguments were supplied")]
    ArityMismatchError { expected: usize, received: usize },
    #[error("symbol {symbol:?} is not bound")]
    UnboundSymbolError { symbol: String },
    #[error("{boundary} security label {inferred} exceeds the declared {required}")]
    SecurityFlowViolationError {
        boundary: String,
        required: String,
        inferred: String,
    },
    #[error("operation {operation:?} is not supported")]
    UnsupportedOperationError { operation: String },
    #[error("runtime value {received} is not one of {expected}")]
    DynamicGuardError { expected: String, received: String },
    #[error("division by zero")]
    DivisionByZeroError,
}
