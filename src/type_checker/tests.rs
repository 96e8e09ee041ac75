//! Unit tests for the two checker pipelines.
//!
//! This module contains tests for:
//! - The consistency relation and its interaction with Dyn
//! - Numeric promotion and guard insertion in the gradual checker
//! - Label joins, implicit-flow tainting, and flow rejection in the
//!   security checker
//! - Scope handling shared by both

use crate::ast::{
    expressions::{Expression, LiteralExpression, LiteralKind},
    types::{Constant, FunctionType, SecurityBaseType, SecurityLabel, SecurityType, Type},
};
use crate::errors::errors::Error;
use crate::lexer::lexer::tokenize;
use crate::parser::parser::parse;
use crate::Span;

use super::gradual::{self, are_consistent};
use super::security;

fn parse_source(source: &str) -> Expression {
    let tokens = tokenize(source.to_string(), Some("test.stlc".to_string())).unwrap();
    parse(tokens).unwrap()
}

fn gradual_check(source: &str) -> Result<(Type, Expression), Error> {
    gradual::type_check(parse_source(source))
}

fn security_check(source: &str) -> Result<SecurityType, Error> {
    security::type_check(&parse_source(source))
}

fn function_type(parameter_types: Vec<Type>, return_type: Type) -> Type {
    Type::Function(FunctionType {
        parameter_types,
        return_type: Box::new(return_type),
    })
}

// Consistency relation

#[test]
fn test_consistency_is_reflexive() {
    let types = [
        Type::Bool,
        Type::Int,
        Type::Float,
        Type::String,
        Type::Dynamic,
        function_type(vec![Type::Int, Type::Dynamic], Type::Bool),
    ];

    for ty in &types {
        assert!(are_consistent(ty, ty));
    }
}

#[test]
fn test_consistency_is_symmetric() {
    let types = [
        Type::Bool,
        Type::Int,
        Type::Dynamic,
        function_type(vec![Type::Dynamic], Type::Int),
        function_type(vec![Type::Int], Type::Int),
    ];

    for type1 in &types {
        for type2 in &types {
            assert_eq!(are_consistent(type1, type2), are_consistent(type2, type1));
        }
    }
}

#[test]
fn test_dynamic_absorbs_everything() {
    let types = [
        Type::Bool,
        Type::Int,
        Type::Float,
        Type::String,
        function_type(vec![], Type::Bool),
        function_type(vec![Type::Int, Type::Int, Type::Int], Type::Dynamic),
    ];

    for ty in &types {
        assert!(are_consistent(&Type::Dynamic, ty));
        assert!(are_consistent(ty, &Type::Dynamic));
    }
}

#[test]
fn test_distinct_base_types_are_not_consistent() {
    assert!(!are_consistent(&Type::Int, &Type::Bool));
    assert!(!are_consistent(&Type::Int, &Type::Float));
    assert!(!are_consistent(&Type::String, &Type::Bool));
}

#[test]
fn test_function_types_compare_componentwise() {
    let function1 = function_type(vec![Type::Int], Type::Bool);
    let function2 = function_type(vec![Type::Dynamic], Type::Bool);
    let function3 = function_type(vec![Type::Int, Type::Int], Type::Bool);

    assert!(are_consistent(&function1, &function2));
    assert!(!are_consistent(&function1, &function3));
    assert!(!are_consistent(&function1, &Type::Int));
}

// Gradual checker

#[test]
fn test_literal_value_must_match_declared_kind() {
    // The parser never builds such a node, but the AST is open to
    // programmatic construction.
    let literal = Expression::Literal(LiteralExpression {
        kind: LiteralKind::Bool,
        value: Constant::Int(1),
        label: SecurityLabel::Low,
        span: Span::null(),
    });

    let result = gradual::type_check(literal.clone());
    assert!(result.is_err());
    assert_eq!(
        result.err().unwrap().get_error_name(),
        "ValueLiteralTypeError"
    );

    let result = security::type_check(&literal);
    assert!(result.is_err());
    assert_eq!(
        result.err().unwrap().get_error_name(),
        "ValueLiteralTypeError"
    );
}

#[test]
fn test_float_literal_accepts_int_value() {
    let literal = Expression::Literal(LiteralExpression {
        kind: LiteralKind::Float,
        value: Constant::Int(3),
        label: SecurityLabel::Low,
        span: Span::null(),
    });

    let (ty, _) = gradual::type_check(literal.clone()).unwrap();
    assert_eq!(ty, Type::Float);

    let security_type = security::type_check(&literal).unwrap();
    assert_eq!(security_type.ty, SecurityBaseType::Float);
}

#[test]
fn test_int_addition_types_as_int() {
    let (ty, _) = gradual_check("(+ 1 1)").unwrap();
    assert_eq!(ty, Type::Int);
}

#[test]
fn test_mixed_addition_promotes_to_float() {
    let (ty, _) = gradual_check("(+ 1 1.0)").unwrap();
    assert_eq!(ty, Type::Float);

    let (ty, _) = gradual_check("(+ 1.0 1)").unwrap();
    assert_eq!(ty, Type::Float);
}

#[test]
fn test_dynamic_operand_promotes_to_float() {
    // The promotion rule consults static types only, so a dynamic side
    // yields Float even when both operands hold Ints at runtime.
    let (ty, _) = gradual_check("(+ 1 (dyn 1))").unwrap();
    assert_eq!(ty, Type::Float);
}

#[test]
fn test_bool_operand_in_addition_is_rejected() {
    let result = gradual_check("(+ true 1)");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "TypeMismatchError");
}

#[test]
fn test_not_requires_bool() {
    let result = gradual_check("(not 42)");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "TypeMismatchError");
}

#[test]
fn test_dynamic_literal_operand_gets_guard() {
    let (ty, rewritten) = gradual_check("(not (dyn true))").unwrap();
    assert_eq!(ty, Type::Bool);

    let Expression::Unary(unary) = rewritten else {
        panic!("Expected a unary node");
    };
    let Expression::CheckDynamicType(check) = *unary.expression else {
        panic!("Expected the operand to be wrapped in a guard");
    };
    assert_eq!(check.expected_types, vec![Type::Bool]);
    assert!(matches!(*check.expression, Expression::Literal(_)));
}

#[test]
fn test_guard_insertion_is_per_side() {
    let (ty, rewritten) = gradual_check("(and (dyn true) false)").unwrap();
    assert_eq!(ty, Type::Bool);

    let Expression::Binary(binary) = rewritten else {
        panic!("Expected a binary node");
    };
    assert!(matches!(*binary.first, Expression::CheckDynamicType(_)));
    assert!(matches!(*binary.second, Expression::Literal(_)));
}

#[test]
fn test_arithmetic_guard_carries_numeric_set() {
    let (_, rewritten) = gradual_check("(+ (dyn 1) 2)").unwrap();

    let Expression::Binary(binary) = rewritten else {
        panic!("Expected a binary node");
    };
    let Expression::CheckDynamicType(check) = *binary.first else {
        panic!("Expected the dynamic side to be wrapped");
    };
    assert_eq!(check.expected_types, vec![Type::Int, Type::Float]);
}

#[test]
fn test_if_condition_guarded_and_branch_types_joined() {
    let (ty, rewritten) = gradual_check("(if (dyn true) 1 2)").unwrap();
    assert_eq!(ty, Type::Int);

    let Expression::If(if_expression) = rewritten else {
        panic!("Expected an if node");
    };
    assert!(matches!(
        *if_expression.condition,
        Expression::CheckDynamicType(_)
    ));
}

#[test]
fn test_if_with_dynamic_branch_is_dynamic() {
    let (ty, rewritten) = gradual_check("(if true (dyn 1) 2)").unwrap();
    assert_eq!(ty, Type::Dynamic);

    // No guard is inserted around the branches.
    let Expression::If(if_expression) = rewritten else {
        panic!("Expected an if node");
    };
    assert!(matches!(*if_expression.then_branch, Expression::Literal(_)));
    assert!(matches!(*if_expression.else_branch, Expression::Literal(_)));
}

#[test]
fn test_if_with_mismatched_branches_is_rejected() {
    let result = gradual_check("(if true 1 \"two\")");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "TypeMismatchError");
}

#[test]
fn test_let_binds_value_type_in_body() {
    let (ty, _) = gradual_check("(let x 4 (* x x))").unwrap();
    assert_eq!(ty, Type::Int);
}

#[test]
fn test_let_scope_is_restored_after_body() {
    let result = gradual_check("(+ (let x 1 x) x)");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "UnboundSymbolError");
}

#[test]
fn test_unbound_symbol_is_rejected() {
    let result = gradual_check("x");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "UnboundSymbolError");
}

#[test]
fn test_function_reports_declared_type() {
    let (ty, _) = gradual_check("(fun (x) (-> Int Bool) true)").unwrap();
    assert_eq!(ty, function_type(vec![Type::Int], Type::Bool));
}

#[test]
fn test_function_body_checked_against_return_type() {
    let result = gradual_check("(fun (x) (-> Int Bool) 1)");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "TypeMismatchError");
}

#[test]
fn test_dynamic_body_with_static_return_gets_guard() {
    let (_, rewritten) = gradual_check("(fun (x) (-> Int Int) (dyn 5))").unwrap();

    let Expression::Function(function) = rewritten else {
        panic!("Expected a function node");
    };
    let Expression::CheckDynamicType(check) = *function.body else {
        panic!("Expected the body to be wrapped in a guard");
    };
    assert_eq!(check.expected_types, vec![Type::Int]);
}

#[test]
fn test_dynamic_return_body_is_not_guarded() {
    let (_, rewritten) = gradual_check("(fun (x) (-> Int Dyn) (dyn 5))").unwrap();

    let Expression::Function(function) = rewritten else {
        panic!("Expected a function node");
    };
    assert!(matches!(*function.body, Expression::Literal(_)));
}

#[test]
fn test_function_body_cannot_see_enclosing_scope() {
    let result = gradual_check("(let y 1 ((fun (x) (-> Int Int) y) 2))");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "UnboundSymbolError");
}

#[test]
fn test_apply_with_static_return_is_guarded() {
    let (ty, rewritten) = gradual_check("((fun (x) (-> Int Int) x) 2)").unwrap();
    assert_eq!(ty, Type::Int);

    let Expression::CheckDynamicType(check) = rewritten else {
        panic!("Expected the whole apply node to be wrapped");
    };
    assert_eq!(check.expected_types, vec![Type::Int]);
    assert!(matches!(*check.expression, Expression::Apply(_)));
}

#[test]
fn test_apply_with_dynamic_return_is_not_guarded() {
    let (ty, rewritten) = gradual_check("((fun (x) (-> Int Dyn) x) 2)").unwrap();
    assert_eq!(ty, Type::Dynamic);
    assert!(matches!(rewritten, Expression::Apply(_)));
}

#[test]
fn test_apply_accepts_dynamic_argument_for_static_parameter() {
    let (ty, _) = gradual_check("((fun (x) (-> Int Int) x) (dyn 2))").unwrap();
    assert_eq!(ty, Type::Int);
}

#[test]
fn test_apply_rejects_inconsistent_argument() {
    let result = gradual_check("((fun (x) (-> Int Int) x) true)");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "TypeMismatchError");
}

#[test]
fn test_arity_mismatch_with_too_few_arguments() {
    let result = gradual_check("((fun (x y) (-> Int Int Int) x) 1)");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "ArityMismatchError");
}

#[test]
fn test_arity_mismatch_with_too_many_arguments() {
    let result = gradual_check("((fun (x y) (-> Int Int Int) x) 1 2 3)");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "ArityMismatchError");
}

#[test]
fn test_applying_a_non_function_is_rejected() {
    let result = gradual_check("(let f 1 (f 2))");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "TypeMismatchError");
}

// Security checker

#[test]
fn test_literal_carries_its_label() {
    let security_type = security_check("(High 42)").unwrap();

    assert_eq!(security_type.ty, SecurityBaseType::Int);
    assert_eq!(security_type.label, SecurityLabel::High);
}

#[test]
fn test_unlabeled_literal_is_low() {
    let security_type = security_check("42").unwrap();

    assert_eq!(security_type.label, SecurityLabel::Low);
}

#[test]
fn test_not_preserves_operand_label() {
    let security_type = security_check("(not (High true))").unwrap();

    assert_eq!(security_type.ty, SecurityBaseType::Bool);
    assert_eq!(security_type.label, SecurityLabel::High);
}

#[test]
fn test_not_requires_exactly_bool() {
    let result = security_check("(not (High 1))");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "TypeMismatchError");
}

#[test]
fn test_binary_result_joins_operand_labels() {
    let security_type = security_check("(+ (High 1) 2)").unwrap();

    assert_eq!(security_type.ty, SecurityBaseType::Int);
    assert_eq!(security_type.label, SecurityLabel::High);
}

#[test]
fn test_binary_promotion_on_static_types() {
    let security_type = security_check("(+ 1 2.0)").unwrap();
    assert_eq!(security_type.ty, SecurityBaseType::Float);

    let security_type = security_check("(* 2 3)").unwrap();
    assert_eq!(security_type.ty, SecurityBaseType::Int);
}

#[test]
fn test_if_condition_taints_result() {
    // Neither branch is High, yet branching on a High condition is an
    // implicit flow, so the result joins to High.
    let security_type = security_check("(if (High true) 1 2)").unwrap();

    assert_eq!(security_type.ty, SecurityBaseType::Int);
    assert_eq!(security_type.label, SecurityLabel::High);
}

#[test]
fn test_if_branch_types_must_match_exactly() {
    let result = security_check("(if true 1 2.0)");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "TypeMismatchError");
}

#[test]
fn test_let_propagates_security_type() {
    let security_type = security_check("(let secret (High 40) (+ secret 2))").unwrap();

    assert_eq!(security_type.ty, SecurityBaseType::Int);
    assert_eq!(security_type.label, SecurityLabel::High);
}

#[test]
fn test_security_let_scope_is_restored() {
    let result = security_check("(+ (let x 1 x) x)");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "UnboundSymbolError");
}

#[test]
fn test_function_with_matching_labels_is_accepted() {
    let security_type =
        security_check("(fun (x) ((-> (Int High) (Int High)) Low) (+ x 1))").unwrap();

    assert_eq!(security_type.label, SecurityLabel::Low);
    assert!(matches!(security_type.ty, SecurityBaseType::Function(_)));
}

#[test]
fn test_function_cannot_underdeclare_return_label() {
    let result = security_check("(fun (x) ((-> (Int Low) (Int Low)) Low) (High 1))");

    assert!(result.is_err());
    assert_eq!(
        result.err().unwrap().get_error_name(),
        "SecurityFlowViolationError"
    );
}

#[test]
fn test_function_return_base_type_must_match() {
    let result = security_check("(fun (x) ((-> (Int Low) (Bool Low)) Low) 1)");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "TypeMismatchError");
}

#[test]
fn test_high_argument_into_low_parameter_is_rejected() {
    let result = security_check("((fun (x) ((-> (Int Low) (Int Low)) Low) x) (High 3))");

    assert!(result.is_err());
    assert_eq!(
        result.err().unwrap().get_error_name(),
        "SecurityFlowViolationError"
    );
}

#[test]
fn test_low_argument_into_high_parameter_is_accepted() {
    let security_type =
        security_check("((fun (x) ((-> (Int High) (Int High)) Low) x) 3)").unwrap();

    assert_eq!(security_type.label, SecurityLabel::High);
}

#[test]
fn test_apply_result_is_declared_return_type_unchanged() {
    // The argument's High label stays confined to the parameter; only
    // the declared return classification comes back out.
    let security_type =
        security_check("((fun (x) ((-> (Bool High) (Int Low)) Low) 1) (High true))").unwrap();

    assert_eq!(security_type.ty, SecurityBaseType::Int);
    assert_eq!(security_type.label, SecurityLabel::Low);
}

#[test]
fn test_security_arity_mismatch() {
    let result = security_check("((fun (x y) ((-> (Int Low) (Int Low) (Int Low)) Low) x) 1)");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "ArityMismatchError");
}

#[test]
fn test_security_rejects_dynamic_literal() {
    let result = security_check("(dyn 1)");

    assert!(result.is_err());
    assert_eq!(
        result.err().unwrap().get_error_name(),
        "UnsupportedOperationError"
    );
}

#[test]
fn test_security_function_body_is_isolated() {
    let result =
        security_check("(let y 1 ((fun (x) ((-> (Int Low) (Int Low)) Low) y) 2))");

    assert!(result.is_err());
    assert_eq!(result.err().unwrap().get_error_name(), "UnboundSymbolError");
}

// Label lattice

#[test]
fn test_label_join() {
    assert_eq!(
        SecurityLabel::Low.join(SecurityLabel::High),
        SecurityLabel::High
    );
    assert_eq!(
        SecurityLabel::High.join(SecurityLabel::Low),
        SecurityLabel::High
    );
    assert_eq!(
        SecurityLabel::Low.join(SecurityLabel::Low),
        SecurityLabel::Low
    );
}

#[test]
fn test_label_join_multiple() {
    assert_eq!(
        SecurityLabel::join_multiple(&[
            SecurityLabel::Low,
            SecurityLabel::High,
            SecurityLabel::Low
        ]),
        SecurityLabel::High
    );
    assert_eq!(SecurityLabel::join_multiple(&[]), SecurityLabel::Low);
}

#[test]
fn test_label_order() {
    assert!(SecurityLabel::Low <= SecurityLabel::High);
    assert!(SecurityLabel::Low < SecurityLabel::High);
    assert!(SecurityLabel::High <= SecurityLabel::High);
}
