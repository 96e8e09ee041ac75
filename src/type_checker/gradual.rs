//! The gradual type checker.
//!
//! Checks the tree bottom-up, replacing type equality with the weaker
//! consistency relation: `Dyn` is consistent with everything, function
//! types are consistent component-wise, and everything else must match
//! exactly. Wherever a dynamically-typed value reaches a context that
//! demands a static type, the checker rewrites the tree to wrap that
//! position in a `CheckDynamicType` guard for the interpreter to enforce.
//!
//! Checking is a pure transformation: every rule consumes its node and
//! returns a freshly-built one, so rewrites never alias shared structure.

use crate::{
    ast::{
        expressions::{
            ApplyExpression, BinaryExpression, CheckDynamicTypeExpression, Expression,
            FunctionExpression, GetExpression, IfExpression, LetExpression, LiteralExpression,
            LiteralKind, UnaryExpression, UnaryOperator,
        },
        types::{format_type_set, Constant, FunctionType, Type, TypeAnnotation},
    },
    environment::Environment,
    errors::errors::{Error, ErrorImpl},
    Span,
};

/// Checks a whole program, returning its static type and the rewritten
/// tree with every runtime guard in place.
pub fn type_check(ast: Expression) -> Result<(Type, Expression), Error> {
    GradualTypeChecker::new().check(ast)
}

/// Consistency, the gradual substitute for type equality. Reflexive and
/// symmetric, but not transitive: `Dyn` absorbs everything.
pub fn are_consistent(type1: &Type, type2: &Type) -> bool {
    match (type1, type2) {
        (Type::Dynamic, _) | (_, Type::Dynamic) => true,
        (Type::Function(function1), Type::Function(function2)) => {
            are_consistent_function_types(function1, function2)
        }
        (Type::Function(_), _) | (_, Type::Function(_)) => false,
        _ => type1 == type2,
    }
}

fn are_consistent_function_types(function1: &FunctionType, function2: &FunctionType) -> bool {
    function1.parameter_types.len() == function2.parameter_types.len()
        && are_consistent(&function1.return_type, &function2.return_type)
        && function1
            .parameter_types
            .iter()
            .zip(&function2.parameter_types)
            .all(|(parameter1, parameter2)| are_consistent(parameter1, parameter2))
}

fn check_expected_types(ty: &Type, types: &[Type], span: &Span) -> Result<(), Error> {
    if types.iter().any(|expected| are_consistent(ty, expected)) {
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

fn check_expected_types_of_value(
    value: &Constant,
    types: &[Type],
    span: &Span,
) -> Result<(), Error> {
    if types.iter().any(|expected| constant_matches(value, expected)) {
        Ok(())
    } else {
        Err(Error::new(
            ErrorImpl::ValueLiteralTypeError {
                expected: format_type_set(types),
                received: String::from(value.type_name()),
            },
            span.start.clone(),
        ))
    }
}

/// Runtime-representation membership of a constant in a type. Float
/// admits Int constants, mirroring the numeric promotion rule.
fn constant_matches(value: &Constant, ty: &Type) -> bool {
    match ty {
        Type::Dynamic => true,
        Type::Bool => matches!(value, Constant::Bool(_)),
        Type::Int => matches!(value, Constant::Int(_)),
        Type::Float => matches!(value, Constant::Int(_) | Constant::Float(_)),
        Type::String => matches!(value, Constant::Str(_)),
        Type::Function(_) => false,
    }
}

/// Wraps an expression in a runtime guard for the given acceptable types.
fn guard(expected_types: Vec<Type>, expression: Expression) -> Expression {
    let span = expression.span().clone();
    Expression::CheckDynamicType(CheckDynamicTypeExpression {
        expected_types,
        expression: Box::new(expression),
        span,
    })
}

/// Statically checks an operand against the expected set, or defers the
/// whole obligation to runtime when the operand is dynamic.
fn expect_or_guard(
    operand_type: &Type,
    operand: Expression,
    expected: &[Type],
) -> Result<Expression, Error> {
    if *operand_type == Type::Dynamic {
        Ok(guard(expected.to_vec(), operand))
    } else {
        check_expected_types(operand_type, expected, operand.span())?;
        Ok(operand)
    }
}

pub struct GradualTypeChecker {
    env: Environment<Type>,
}

impl GradualTypeChecker {
    pub fn new() -> Self {
        GradualTypeChecker {
            env: Environment::new(),
        }
    }

    pub fn check(&mut self, expression: Expression) -> Result<(Type, Expression), Error> {
        match expression {
            Expression::Literal(literal) => self.check_literal(literal),
            Expression::Unary(unary) => self.check_unary(unary),
            Expression::Binary(binary) => self.check_binary(binary),
            Expression::If(if_expression) => self.check_if(if_expression),
            Expression::Let(let_expression) => self.check_let(let_expression),
            Expression::Get(get) => self.check_get(get),
            Expression::Function(function) => self.check_function(function),
            Expression::Apply(apply) => self.check_apply(apply),
            // Guards are synthesized after checking; a rewritten tree is
            // input for the interpreter, not for another checker pass.
            Expression::CheckDynamicType(check) => Err(Error::new(
                ErrorImpl::UnsupportedOperationError {
                    operation: String::from("check-dynamic-type"),
                },
                check.span.start.clone(),
            )),
        }
    }

    fn check_literal(&mut self, literal: LiteralExpression) -> Result<(Type, Expression), Error> {
        let (expected, ty) = match literal.kind {
            LiteralKind::Bool => (vec![Type::Bool], Type::Bool),
            LiteralKind::Int => (vec![Type::Int], Type::Int),
            LiteralKind::Float => (vec![Type::Int, Type::Float], Type::Float),
            LiteralKind::String => (vec![Type::String], Type::String),
            LiteralKind::Dynamic => (
                vec![Type::Bool, Type::Int, Type::Float, Type::String],
                Type::Dynamic,
            ),
        };
        check_expected_types_of_value(&literal.value, &expected, &literal.span)?;

        Ok((ty, Expression::Literal(literal)))
    }

    fn check_unary(&mut self, unary: UnaryExpression) -> Result<(Type, Expression), Error> {
        let UnaryExpression {
            operator,
            expression,
            span,
        } = unary;

        match operator {
            UnaryOperator::Not => {
                let (operand_type, operand) = self.check(*expression)?;
                let operand = expect_or_guard(&operand_type, operand, &[Type::Bool])?;

                Ok((
                    Type::Bool,
                    Expression::Unary(UnaryExpression {
                        operator,
                        expression: Box::new(operand),
                        span,
                    }),
                ))
            }
        }
    }

    fn check_binary(&mut self, binary: BinaryExpression) -> Result<(Type, Expression), Error> {
        let BinaryExpression {
            operator,
            first,
            second,
            span,
        } = binary;

        let (first_type, first) = self.check(*first)?;
        let (second_type, second) = self.check(*second)?;

        let (result_type, expected) = if operator.is_arithmetic() {
            // Int only when both static operand types are exactly Int;
            // a dynamic side always promotes the result to Float.
            let result = if first_type == Type::Int && second_type == Type::Int {
                Type::Int
            } else {
                Type::Float
            };
            (result, vec![Type::Int, Type::Float])
        } else {
            (Type::Bool, vec![Type::Bool])
        };

        let first = expect_or_guard(&first_type, first, &expected)?;
        let second = expect_or_guard(&second_type, second, &expected)?;

        Ok((
            result_type,
            Expression::Binary(BinaryExpression {
                operator,
                first: Box::new(first),
                second: Box::new(second),
                span,
            }),
        ))
    }

    fn check_if(&mut self, if_expression: IfExpression) -> Result<(Type, Expression), Error> {
        let IfExpression {
            condition,
            then_branch,
            else_branch,
            span,
        } = if_expression;

        let (condition_type, condition) = self.check(*condition)?;
        let condition = expect_or_guard(&condition_type, condition, &[Type::Bool])?;

        let (then_type, then_branch) = self.check(*then_branch)?;
        let (else_type, else_branch) = self.check(*else_branch)?;

        let result_type =
            if then_type == Type::Dynamic || else_type == Type::Dynamic {
                Type::Dynamic
            } else {
                check_expected_types(&then_type, &[else_type], then_branch.span())?;
                then_type
            };

        Ok((
            result_type,
            Expression::If(IfExpression {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                span,
            }),
        ))
    }

    fn check_let(&mut self, let_expression: LetExpression) -> Result<(Type, Expression), Error> {
        let LetExpression {
            symbol,
            value,
            body,
            span,
        } = let_expression;

        let outer = self.env.clone();

        let (value_type, value) = self.check(*value)?;
        self.env.put(&symbol, value_type);
        let (body_type, body) = self.check(*body)?;

        self.env = outer;

        Ok((
            body_type,
            Expression::Let(LetExpression {
                symbol,
                value: Box::new(value),
                body: Box::new(body),
                span,
            }),
        ))
    }

    fn check_get(&mut self, get: GetExpression) -> Result<(Type, Expression), Error> {
        let ty = self.env.get(&get.symbol).cloned().ok_or_else(|| {
            Error::new(
                ErrorImpl::UnboundSymbolError {
                    symbol: get.symbol.clone(),
                },
                get.span.start.clone(),
            )
        })?;

        Ok((ty, Expression::Get(get)))
    }

    fn check_function(
        &mut self,
        function: FunctionExpression,
    ) -> Result<(Type, Expression), Error> {
        let FunctionExpression {
            parameters,
            annotation,
            body,
            span,
        } = function;

        let function_type = match &annotation {
            TypeAnnotation::Simple(function_type) => function_type.clone(),
            TypeAnnotation::Security(_) => {
                return Err(Error::new(
                    ErrorImpl::UnsupportedOperationError {
                        operation: String::from("security-labeled function annotation"),
                    },
                    span.start.clone(),
                ))
            }
        };

        if function_type.parameter_types.len() != parameters.len() {
            return Err(Error::new(
                ErrorImpl::ArityMismatchError {
                    expected: function_type.parameter_types.len(),
                    received: parameters.len(),
                },
                span.start.clone(),
            ));
        }

        // Function bodies see only their parameters, never the scope the
        // function literal appears in.
        let outer = std::mem::replace(&mut self.env, Environment::new());
        for (symbol, parameter_type) in parameters.iter().zip(&function_type.parameter_types) {
            self.env.put(symbol, parameter_type.clone());
        }

        let (body_type, body) = self.check(*body)?;
        check_expected_types(
            &body_type,
            std::slice::from_ref(function_type.return_type.as_ref()),
            body.span(),
        )?;

        let body = if *function_type.return_type != Type::Dynamic && body_type == Type::Dynamic {
            guard(vec![(*function_type.return_type).clone()], body)
        } else {
            body
        };

        self.env = outer;

        Ok((
            Type::Function(function_type),
            Expression::Function(FunctionExpression {
                parameters,
                annotation,
                body: Box::new(body),
                span,
            }),
        ))
    }

    fn check_apply(&mut self, apply: ApplyExpression) -> Result<(Type, Expression), Error> {
        let ApplyExpression {
            function,
            arguments,
            span,
        } = apply;

        let (function_type, function) = self.check(*function)?;
        let function_type = match function_type {
            Type::Function(function_type) => function_type,
            other => {
                return Err(Error::new(
                    ErrorImpl::TypeMismatchError {
                        expected: String::from("a function type"),
                        received: other.to_string(),
                    },
                    function.span().start.clone(),
                ))
            }
        };

        let mut argument_types = Vec::with_capacity(arguments.len());
        let mut checked_arguments = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let (argument_type, argument) = self.check(argument)?;
            argument_types.push(argument_type);
            checked_arguments.push(argument);
        }

        if function_type.parameter_types.len() != argument_types.len() {
            return Err(Error::new(
                ErrorImpl::ArityMismatchError {
                    expected: function_type.parameter_types.len(),
                    received: argument_types.len(),
                },
                span.start.clone(),
            ));
        }

        for ((parameter_type, argument_type), argument) in function_type
            .parameter_types
            .iter()
            .zip(&argument_types)
            .zip(&checked_arguments)
        {
            check_expected_types(
                argument_type,
                std::slice::from_ref(parameter_type),
                argument.span(),
            )?;
        }

        let node = Expression::Apply(ApplyExpression {
            function: Box::new(function),
            arguments: checked_arguments,
            span,
        });

        // A statically-typed call result still needs a runtime guard: the
        // callee's actual behavior is only provable for the Dyn return.
        let return_type = *function_type.return_type;
        if return_type == Type::Dynamic {
            Ok((Type::Dynamic, node))
        } else {
            let guarded = guard(vec![return_type.clone()], node);
            Ok((return_type, guarded))
        }
    }
}

impl Default for GradualTypeChecker {
    fn default() -> Self {
        GradualTypeChecker::new()
    }
}
