use std::fmt::Display;

/// Static types of the gradually-typed language.
///
/// `Dynamic` stands for a statically-unknown type that is checked at
/// runtime instead; the checker treats it as consistent with every type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Bool,
    Int,
    Float,
    String,
    Dynamic,
    Function(FunctionType),
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Bool => write!(f, "Bool"),
            Type::Int => write!(f, "Int"),
            Type::Float => write!(f, "Float"),
            Type::String => write!(f, "String"),
            Type::Dynamic => write!(f, "Dyn"),
            Type::Function(function_type) => write!(f, "{}", function_type),
        }
    }
}

/// An ordered sequence of parameter types plus a return type.
///
/// Compared structurally, component by component.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub parameter_types: Vec<Type>,
    pub return_type: Box<Type>,
}

impl Display for FunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(->")?;
        for parameter_type in &self.parameter_types {
            write!(f, " {}", parameter_type)?;
        }
        write!(f, " {})", self.return_type)
    }
}

/// A data-sensitivity level forming a join-semilattice.
///
/// The derived order is total, so `join` is `max`; adding further levels
/// between `Low` and `High` keeps both the order and the join lawful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SecurityLabel {
    Low,
    High,
}

impl SecurityLabel {
    pub fn join(self, other: SecurityLabel) -> SecurityLabel {
        self.max(other)
    }

    pub fn join_multiple(labels: &[SecurityLabel]) -> SecurityLabel {
        labels
            .iter()
            .fold(SecurityLabel::Low, |acc, label| acc.join(*label))
    }
}

impl Display for SecurityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityLabel::Low => write!(f, "Low"),
            SecurityLabel::High => write!(f, "High"),
        }
    }
}

/// A base type paired with the security label of the value it classifies.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityType {
    pub ty: SecurityBaseType,
    pub label: SecurityLabel,
}

impl Display for SecurityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {})", self.ty, self.label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SecurityBaseType {
    Bool,
    Int,
    Float,
    String,
    Function(SecurityFunctionType),
}

impl Display for SecurityBaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityBaseType::Bool => write!(f, "Bool"),
            SecurityBaseType::Int => write!(f, "Int"),
            SecurityBaseType::Float => write!(f, "Float"),
            SecurityBaseType::String => write!(f, "String"),
            SecurityBaseType::Function(function_type) => write!(f, "{}", function_type),
        }
    }
}

/// A function type whose parameters and return carry security labels.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityFunctionType {
    pub parameter_types: Vec<SecurityType>,
    pub return_type: Box<SecurityType>,
}

impl Display for SecurityFunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(->")?;
        for parameter_type in &self.parameter_types {
            write!(f, " {}", parameter_type)?;
        }
        write!(f, " {})", self.return_type)
    }
}

/// The declared type on a function literal. The gradual checker only
/// accepts `Simple` annotations, the security checker only `Security`.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    Simple(FunctionType),
    Security(SecurityType),
}

/// The concrete value carried by a literal node.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Constant {
    pub fn type_name(&self) -> &'static str {
        match self {
            Constant::Bool(_) => "Bool",
            Constant::Int(_) => "Int",
            Constant::Float(_) => "Float",
            Constant::Str(_) => "String",
        }
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Bool(value) => write!(f, "{}", value),
            Constant::Int(value) => write!(f, "{}", value),
            Constant::Float(value) => write!(f, "{}", value),
            Constant::Str(value) => write!(f, "{}", value),
        }
    }
}

/// Joins type names into the "X or Y" form used by error messages.
pub fn format_type_set<T: Display>(types: &[T]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<String>>()
        .join(" or ")
}
