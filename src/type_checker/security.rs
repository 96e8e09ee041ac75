//! The security type checker.
//!
//! Derives a (base type, security label) pair for every node under a
//! non-interference discipline. Base types are compared by exact
//! equality; there is no dynamic type in this variant, so the checker
//! rejects dynamic literals and guard nodes outright. Labels join upward
//! through operators, `if` taints its result with the condition's label
//! to close the implicit-flow channel, and declared labels at function
//! return and argument boundaries must dominate the inferred ones.
//!
//! The tree is never rewritten; checking borrows the AST.

use crate::{
    ast::{
        expressions::{
            ApplyExpression, BinaryExpression, Expression, FunctionExpression, GetExpression,
            IfExpression, LetExpression, LiteralExpression, LiteralKind, UnaryExpression,
            UnaryOperator,
        },
        types::{
            format_type_set, Constant, SecurityBaseType, SecurityFunctionType, SecurityLabel,
            SecurityType, TypeAnnotation,
        },
    },
    environment::Environment,
    errors::errors::{Error, ErrorImpl},
    Span,
};

/// Checks a whole program, returning its security type.
pub fn type_check(ast: &Expression) -> Result<SecurityType, Error> {
    SecurityTypeChecker::new().check(ast)
}

fn check_expected_base(
    ty: &SecurityBaseType,
    types: &[SecurityBaseType],
    span: &Span,
) -> Result<(), Error> {
    if types.iter().any(|expected| ty == expected) {
        Ok(())
    } else {
        Err(Error::new(
            ErrorImpl::TypeMismatchError {
                expected: format_type_set(types),
                received: ty.to_string(),
            },
            span.start.clone(),
        ))
    }
}

pub struct SecurityTypeChecker {
    env: Environment<SecurityType>,
}

impl SecurityTypeChecker {
    pub fn new() -> Self {
        SecurityTypeChecker {
            env: Environment::new(),
        }
    }

    pub fn check(&mut self, expression: &Expression) -> Result<SecurityType, Error> {
        match expression {
            Expression::Literal(literal) => self.check_literal(literal),
            Expression::Unary(unary) => self.check_unary(unary),
            Expression::Binary(binary) => self.check_binary(binary),
            Expression::If(if_expression) => self.check_if(if_expression),
            Expression::Let(let_expression) => self.check_let(let_expression),
            Expression::Get(get) => self.check_get(get),
            Expression::Function(function) => self.check_function(function),
            Expression::Apply(apply) => self.check_apply(apply),
            Expression::CheckDynamicType(check) => Err(Error::new(
                ErrorImpl::UnsupportedOperationError {
                    operation: String::from("check-dynamic-type"),
                },
                check.span.start.clone(),
            )),
        }
    }

    fn check_literal(&mut self, literal: &LiteralExpression) -> Result<SecurityType, Error> {
        let ty = match (literal.kind, &literal.value) {
            (LiteralKind::Bool, Constant::Bool(_)) => SecurityBaseType::Bool,
            (LiteralKind::Int, Constant::Int(_)) => SecurityBaseType::Int,
            (LiteralKind::Float, Constant::Int(_) | Constant::Float(_)) => SecurityBaseType::Float,
            (LiteralKind::String, Constant::Str(_)) => SecurityBaseType::String,
            (LiteralKind::Dynamic, _) => {
                return Err(Error::new(
                    ErrorImpl::UnsupportedOperationError {
                        operation: String::from("dynamic literal"),
                    },
                    literal.span.start.clone(),
                ))
            }
            (kind, value) => {
                let expected = match kind {
                    LiteralKind::Bool => "Bool",
                    LiteralKind::Int => "Int",
                    LiteralKind::Float => "Int or Float",
                    LiteralKind::String => "String",
                    LiteralKind::Dynamic => unreachable!(),
                };
                return Err(Error::new(
                    ErrorImpl::ValueLiteralTypeError {
                        expected: String::from(expected),
                        received: String::from(value.type_name()),
                    },
                    literal.span.start.clone(),
                ));
            }
        };

        Ok(SecurityType {
            ty,
            label: literal.label,
        })
    }

    fn check_unary(&mut self, unary: &UnaryExpression) -> Result<SecurityType, Error> {
        match unary.operator {
            UnaryOperator::Not => {
                let operand = self.check(&unary.expression)?;
                check_expected_base(
                    &operand.ty,
                    &[SecurityBaseType::Bool],
                    unary.expression.span(),
                )?;

                // The operand's label rides along unchanged.
                Ok(operand)
            }
        }
    }

    fn check_binary(&mut self, binary: &BinaryExpression) -> Result<SecurityType, Error> {
        let first = self.check(&binary.first)?;
        let second = self.check(&binary.second)?;
        let label = first.label.join(second.label);

        if binary.operator.is_arithmetic() {
            let expected = [SecurityBaseType::Int, SecurityBaseType::Float];
            check_expected_base(&first.ty, &expected, binary.first.span())?;
            check_expected_base(&second.ty, &expected, binary.second.span())?;

            let ty = if first.ty == SecurityBaseType::Float || second.ty == SecurityBaseType::Float
            {
                SecurityBaseType::Float
            } else {
                SecurityBaseType::Int
            };
            Ok(SecurityType { ty, label })
        } else {
            check_expected_base(&first.ty, &[SecurityBaseType::Bool], binary.first.span())?;
            check_expected_base(&second.ty, &[SecurityBaseType::Bool], binary.second.span())?;

            Ok(SecurityType {
                ty: SecurityBaseType::Bool,
                label,
            })
        }
    }

    fn check_if(&mut self, if_expression: &IfExpression) -> Result<SecurityType, Error> {
        let condition = self.check(&if_expression.condition)?;
        check_expected_base(
            &condition.ty,
            &[SecurityBaseType::Bool],
            if_expression.condition.span(),
        )?;

        let then_branch = self.check(&if_expression.then_branch)?;
        let else_branch = self.check(&if_expression.else_branch)?;
        check_expected_base(
            &else_branch.ty,
            std::slice::from_ref(&then_branch.ty),
            if_expression.else_branch.span(),
        )?;

        // The condition's label taints the result even though its value
        // never appears in it; branching on a secret is itself a flow.
        Ok(SecurityType {
            ty: then_branch.ty,
            label: SecurityLabel::join_multiple(&[
                condition.label,
                then_branch.label,
                else_branch.label,
            ]),
        })
    }

    fn check_let(&mut self, let_expression: &LetExpression) -> Result<SecurityType, Error> {
        let outer = self.env.clone();

        let value = self.check(&let_expression.value)?;
        self.env.put(&let_expression.symbol, value);
        let body = self.check(&let_expression.body)?;

        self.env = outer;

        Ok(body)
    }

    fn check_get(&mut self, get: &GetExpression) -> Result<SecurityType, Error> {
        self.env.get(&get.symbol).cloned().ok_or_else(|| {
            Error::new(
                ErrorImpl::UnboundSymbolError {
                    symbol: get.symbol.clone(),
                },
                get.span.start.clone(),
            )
        })
    }

    fn check_function(&mut self, function: &FunctionExpression) -> Result<SecurityType, Error> {
        let security_type = match &function.annotation {
            TypeAnnotation::Security(security_type) => security_type,
            TypeAnnotation::Simple(_) => {
                return Err(Error::new(
                    ErrorImpl::UnsupportedOperationError {
                        operation: String::from("unlabeled function annotation"),
                    },
                    function.span.start.clone(),
                ))
            }
        };
        let function_type = match &security_type.ty {
            SecurityBaseType::Function(function_type) => function_type,
            other => {
                return Err(Error::new(
                    ErrorImpl::TypeMismatchError {
                        expected: String::from("a function type"),
                        received: other.to_string(),
                    },
                    function.span.start.clone(),
                ))
            }
        };

        if function_type.parameter_types.len() != function.parameters.len() {
            return Err(Error::new(
                ErrorImpl::ArityMismatchError {
                    expected: function_type.parameter_types.len(),
                    received: function.parameters.len(),
                },
                function.span.start.clone(),
            ));
        }

        let outer = std::mem::replace(&mut self.env, Environment::new());
        for (symbol, parameter_type) in function
            .parameters
            .iter()
            .zip(&function_type.parameter_types)
        {
            self.env.put(symbol, parameter_type.clone());
        }

        let body = self.check(&function.body);
        self.env = outer;
        let body = body?;

        if body.ty != function_type.return_type.ty {
            return Err(Error::new(
                ErrorImpl::TypeMismatchError {
                    expected: function_type.return_type.ty.to_string(),
                    received: body.ty.to_string(),
                },
                function.body.span().start.clone(),
            ));
        }
        if function_type.return_type.label < body.label {
            return Err(Error::new(
                ErrorImpl::SecurityFlowViolationError {
                    boundary: String::from("function return"),
                    required: function_type.return_type.label.to_string(),
                    inferred: body.label.to_string(),
                },
                function.body.span().start.clone(),
            ));
        }

        Ok(security_type.clone())
    }

    fn check_apply(&mut self, apply: &ApplyExpression) -> Result<SecurityType, Error> {
        let security_type = self.check(&apply.function)?;
        let function_type: &SecurityFunctionType = match &security_type.ty {
            SecurityBaseType::Function(function_type) => function_type,
            other => {
                return Err(Error::new(
                    ErrorImpl::TypeMismatchError {
                        expected: String::from("a function type"),
                        received: other.to_string(),
                    },
                    apply.function.span().start.clone(),
                ))
            }
        };

        let mut argument_types = Vec::with_capacity(apply.arguments.len());
        for argument in &apply.arguments {
            argument_types.push(self.check(argument)?);
        }

        if function_type.parameter_types.len() != argument_types.len() {
            return Err(Error::new(
                ErrorImpl::ArityMismatchError {
                    expected: function_type.parameter_types.len(),
                    received: argument_types.len(),
                },
                apply.span.start.clone(),
            ));
        }

        for ((parameter_type, argument_type), argument) in function_type
            .parameter_types
            .iter()
            .zip(&argument_types)
            .zip(&apply.arguments)
        {
            check_expected_base(
                &argument_type.ty,
                std::slice::from_ref(&parameter_type.ty),
                argument.span(),
            )?;
            if parameter_type.label < argument_type.label {
                return Err(Error::new(
                    ErrorImpl::SecurityFlowViolationError {
                        boundary: String::from("argument"),
                        required: parameter_type.label.to_string(),
                        inferred: argument_type.label.to_string(),
                    },
                    argument.span().start.clone(),
                ));
            }
        }

        // Only data flows taint the result; the callee expression's own
        // label is not folded in.
        Ok((*function_type.return_type).clone())
    }
}

impl Default for SecurityTypeChecker {
    fn default() -> Self {
        SecurityTypeChecker::new()
    }
}
