//! Evaluation module for checked programs.
//!
//! A tree-walking interpreter over the (possibly rewritten) expression
//! tree. It is the sole enforcer of the `CheckDynamicType` guards the
//! gradual checker inserts: each guard asserts the wrapped value's
//! runtime type against the expected set before the value is used.
//! Security labels are a static concern and are ignored here.

pub mod interpreter;
