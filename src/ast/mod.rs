/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - expressions: Definitions for the expression node variants
/// - types: Definitions for the type and security-label algebra
pub mod expressions;
pub mod types;
