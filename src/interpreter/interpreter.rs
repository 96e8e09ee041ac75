use std::fmt::Display;

use crate::{
    ast::{
        expressions::{
            ApplyExpression, BinaryExpression, BinaryOperator, CheckDynamicTypeExpression,
            Expression, FunctionExpression, GetExpression, IfExpression, LetExpression,
            LiteralExpression, UnaryExpression, UnaryOperator,
        },
        types::{format_type_set, Constant, Type, TypeAnnotation},
    },
    environment::Environment,
    errors::errors::{Error, ErrorImpl},
    type_checker::gradual::are_consistent,
    Span,
};

/// A runtime value. Functions are first-class; applying one evaluates
/// its body in a fresh environment holding only the parameters.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Function(FunctionExpression),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "String",
            Value::Function(_) => "Function",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Str(value) => write!(f, "{}", value),
            Value::Function(function) => write!(f, "<fun ({})>", function.parameters.join(" ")),
        }
    }
}

/// Evaluates a checked program to a value.
pub fn interpret(ast: &Expression) -> Result<Value, Error> {
    Interpreter::new().evaluate(ast)
}

/// Runtime membership of a value in a static type. Float accepts Int
/// values, the same relaxation the literal check uses.
fn value_matches(value: &Value, ty: &Type) -> bool {
    match ty {
        Type::Dynamic => true,
        Type::Bool => matches!(value, Value::Bool(_)),
        Type::Int => matches!(value, Value::Int(_)),
        Type::Float => matches!(value, Value::Int(_) | Value::Float(_)),
        Type::String => matches!(value, Value::Str(_)),
        Type::Function(function_type) => match value {
            Value::Function(function) => match &function.annotation {
                TypeAnnotation::Simple(declared) => {
                    are_consistent(&Type::Function(declared.clone()), &Type::Function(function_type.clone()))
                }
                TypeAnnotation::Security(_) => false,
            },
            _ => false,
        },
    }
}

pub struct Interpreter {
    env: Environment<Value>,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            env: Environment::new(),
        }
    }

    pub fn evaluate(&mut self, expression: &Expression) -> Result<Value, Error> {
        match expression {
            Expression::Literal(literal) => self.evaluate_literal(literal),
            Expression::Unary(unary) => self.evaluate_unary(unary),
            Expression::Binary(binary) => self.evaluate_binary(binary),
            Expression::If(if_expression) => self.evaluate_if(if_expression),
            Expression::Let(let_expression) => self.evaluate_let(let_expression),
            Expression::Get(get) => self.evaluate_get(get),
            Expression::Function(function) => Ok(Value::Function(function.clone())),
            Expression::Apply(apply) => self.evaluate_apply(apply),
            Expression::CheckDynamicType(check) => self.evaluate_guard(check),
        }
    }

    fn evaluate_literal(&mut self, literal: &LiteralExpression) -> Result<Value, Error> {
        Ok(match &literal.value {
            Constant::Bool(value) => Value::Bool(*value),
            Constant::Int(value) => Value::Int(*value),
            Constant::Float(value) => Value::Float(*value),
            Constant::Str(value) => Value::Str(value.clone()),
        })
    }

    fn evaluate_unary(&mut self, unary: &UnaryExpression) -> Result<Value, Error> {
        match unary.operator {
            UnaryOperator::Not => {
                let value = self.evaluate(&unary.expression)?;
                let value = as_bool(value, unary.expression.span())?;
                Ok(Value::Bool(!value))
            }
        }
    }

    fn evaluate_binary(&mut self, binary: &BinaryExpression) -> Result<Value, Error> {
        match binary.operator {
            // Boolean operators short-circuit, so an unreached second
            // operand skips its guard as well.
            BinaryOperator::And => {
                let first = self.evaluate(&binary.first)?;
                if !as_bool(first, binary.first.span())? {
                    return Ok(Value::Bool(false));
                }
                let second = self.evaluate(&binary.second)?;
                Ok(Value::Bool(as_bool(second, binary.second.span())?))
            }
            BinaryOperator::Or => {
                let first = self.evaluate(&binary.first)?;
                if as_bool(first, binary.first.span())? {
                    return Ok(Value::Bool(true));
                }
                let second = self.evaluate(&binary.second)?;
                Ok(Value::Bool(as_bool(second, binary.second.span())?))
            }
            BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::Multiply
            | BinaryOperator::Divide => {
                let first = self.evaluate(&binary.first)?;
                let second = self.evaluate(&binary.second)?;
                evaluate_arithmetic(binary.operator, first, second, &binary.span)
            }
        }
    }

    fn evaluate_if(&mut self, if_expression: &IfExpression) -> Result<Value, Error> {
        let condition = self.evaluate(&if_expression.condition)?;
        if as_bool(condition, if_expression.condition.span())? {
            self.evaluate(&if_expression.then_branch)
        } else {
            self.evaluate(&if_expression.else_branch)
        }
    }

    fn evaluate_let(&mut self, let_expression: &LetExpression) -> Result<Value, Error> {
        let outer = self.env.clone();

        let value = self.evaluate(&let_expression.value)?;
        self.env.put(&let_expression.symbol, value);
        let body = self.evaluate(&let_expression.body);

        self.env = outer;
        body
    }

    fn evaluate_get(&mut self, get: &GetExpression) -> Result<Value, Error> {
        self.env.get(&get.symbol).cloned().ok_or_else(|| {
            Error::new(
                ErrorImpl::UnboundSymbolError {
                    symbol: get.symbol.clone(),
                },
                get.span.start.clone(),
            )
        })
    }

    fn evaluate_apply(&mut self, apply: &ApplyExpression) -> Result<Value, Error> {
        let function = match self.evaluate(&apply.function)? {
            Value::Function(function) => function,
            other => {
                return Err(Error::new(
                    ErrorImpl::DynamicGuardError {
                        expected: String::from("Function"),
                        received: String::from(other.type_name()),
                    },
                    apply.function.span().start.clone(),
                ))
            }
        };

        if function.parameters.len() != apply.arguments.len() {
            return Err(Error::new(
                ErrorImpl::ArityMismatchError {
                    expected: function.parameters.len(),
                    received: apply.arguments.len(),
                },
                apply.span.start.clone(),
            ));
        }

        let mut arguments = Vec::with_capacity(apply.arguments.len());
        for argument in &apply.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        // No closure: the body runs with the parameters alone.
        let outer = std::mem::replace(&mut self.env, Environment::new());
        for (symbol, value) in function.parameters.iter().zip(arguments) {
            self.env.put(symbol, value);
        }

        let result = self.evaluate(&function.body);
        self.env = outer;
        result
    }

    fn evaluate_guard(&mut self, check: &CheckDynamicTypeExpression) -> Result<Value, Error> {
        let value = self.evaluate(&check.expression)?;

        if check
            .expected_types
            .iter()
            .any(|ty| value_matches(&value, ty))
        {
            Ok(value)
        } else {
            Err(Error::new(
                ErrorImpl::DynamicGuardError {
                    expected: format_type_set(&check.expected_types),
                    received: String::from(value.type_name()),
                },
                check.span.start.clone(),
            ))
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

fn as_bool(value: Value, span: &Span) -> Result<bool, Error> {
    match value {
        Value::Bool(value) => Ok(value),
        other => Err(Error::new(
            ErrorImpl::DynamicGuardError {
                expected: String::from("Bool"),
                received: String::from(other.type_name()),
            },
            span.start.clone(),
        )),
    }
}

fn evaluate_arithmetic(
    operator: BinaryOperator,
    first: Value,
    second: Value,
    span: &Span,
) -> Result<Value, Error> {
    match (first, second) {
        (Value::Int(first), Value::Int(second)) => match operator {
            BinaryOperator::Add => Ok(Value::Int(first + second)),
            BinaryOperator::Subtract => Ok(Value::Int(first - second)),
            BinaryOperator::Multiply => Ok(Value::Int(first * second)),
            BinaryOperator::Divide => {
                if second == 0 {
                    Err(Error::new(
                        ErrorImpl::DivisionByZeroError,
                        span.start.clone(),
                    ))
                } else {
                    Ok(Value::Int(first / second))
                }
            }
            _ => unreachable!("boolean operator in arithmetic evaluation"),
        },
        (first, second) => {
            let first = as_float(first, span)?;
            let second = as_float(second, span)?;
            match operator {
                BinaryOperator::Add => Ok(Value::Float(first + second)),
                BinaryOperator::Subtract => Ok(Value::Float(first - second)),
                BinaryOperator::Multiply => Ok(Value::Float(first * second)),
                BinaryOperator::Divide => {
                    if second == 0.0 {
                        Err(Error::new(
                            ErrorImpl::DivisionByZeroError,
                            span.start.clone(),
                        ))
                    } else {
                        Ok(Value::Float(first / second))
                    }
                }
                _ => unreachable!("boolean operator in arithmetic evaluation"),
            }
        }
    }
}

fn as_float(value: Value, span: &Span) -> Result<f64, Error> {
    match value {
        Value::Int(value) => Ok(value as f64),
        Value::Float(value) => Ok(value),
        other => Err(Error::new(
            ErrorImpl::DynamicGuardError {
                expected: String::from("Int or Float"),
                received: String::from(other.type_name()),
            },
            span.start.clone(),
        )),
    }
}
