//! Type checking and semantic analysis module.
//!
//! This module holds the two checker pipelines that share the expression
//! tree but compute different classifications over it:
//!
//! - `gradual`: derives a static type for every node under a
//!   gradual-typing discipline and rewrites the tree to insert runtime
//!   guard nodes wherever a dynamic value flows into a typed context
//! - `security`: derives a (base type, security label) pair for every
//!   node and rejects the tree when a higher-security value could
//!   influence a lower-security result
//!
//! Both checkers manage scopes with clone-then-restore environments and
//! check function bodies in isolation from the enclosing scope.

pub mod gradual;
pub mod security;

#[cfg(test)]
mod tests;
