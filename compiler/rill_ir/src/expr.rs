//! Expression node handles and leaf nodes.
//!
//! [`Expr`] is the shared handle type for every node in a tree. Cloning an
//! `Expr` bumps a reference count; it never copies a subtree. Nodes are
//! immutable after construction, so a tree can be read from any number of
//! threads at once.
//!
//! # Identity
//!
//! Two handles are the *same* node when they point at the same allocation
//! ([`Expr::ptr_eq`]). Structurally equal subtrees built separately are
//! different nodes; child lookup in views and rewriters compares identity.

use std::fmt;
use std::sync::Arc;

use crate::visitor::Visitor;
use crate::{BlockExpr, TypeId, Value};

/// Shared handle to a parameter declaration.
///
/// The same `ParamRef` is stored in a scope's variable list and wrapped in
/// [`Expr::Parameter`] wherever the body reads the variable.
pub type ParamRef = Arc<ParameterExpr>;

/// Discriminator for expression nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Constant,
    Parameter,
    Placeholder,
    Block,
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExprKind::Constant => "constant",
            ExprKind::Parameter => "parameter",
            ExprKind::Placeholder => "placeholder",
            ExprKind::Block => "block",
        })
    }
}

/// Handle to an immutable expression node.
#[derive(Clone)]
pub enum Expr {
    Constant(Arc<ConstantExpr>),
    Parameter(ParamRef),
    Placeholder(Arc<PlaceholderExpr>),
    Block(Arc<BlockExpr>),
}

impl Expr {
    /// Constant whose type is derived from the value.
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = value.ty();
        Expr::Constant(Arc::new(ConstantExpr { value, ty }))
    }

    /// Constant with an explicit static type (e.g. a `null` of type `STR`).
    pub fn typed_constant(value: impl Into<Value>, ty: TypeId) -> Self {
        Expr::Constant(Arc::new(ConstantExpr {
            value: value.into(),
            ty,
        }))
    }

    /// Unbound placeholder of the given type.
    ///
    /// Placeholders mark holes that a rewriter must fill before the tree is
    /// usable; they cannot appear in value position of a block.
    pub fn placeholder(ty: TypeId) -> Self {
        Expr::Placeholder(Arc::new(PlaceholderExpr { ty }))
    }

    /// Node discriminator.
    #[inline]
    pub fn kind(&self) -> ExprKind {
        match self {
            Expr::Constant(_) => ExprKind::Constant,
            Expr::Parameter(_) => ExprKind::Parameter,
            Expr::Placeholder(_) => ExprKind::Placeholder,
            Expr::Block(_) => ExprKind::Block,
        }
    }

    /// Static result type of the node.
    pub fn ty(&self) -> TypeId {
        match self {
            Expr::Constant(constant) => constant.ty,
            Expr::Parameter(parameter) => parameter.ty,
            Expr::Placeholder(placeholder) => placeholder.ty,
            Expr::Block(block) => block.ty(),
        }
    }

    /// Whether the node produces a value when evaluated.
    #[inline]
    pub fn can_read(&self) -> bool {
        !matches!(self, Expr::Placeholder(_))
    }

    /// Identity comparison: true if both handles point at the same node.
    pub fn ptr_eq(a: &Expr, b: &Expr) -> bool {
        match (a, b) {
            (Expr::Constant(a), Expr::Constant(b)) => Arc::ptr_eq(a, b),
            (Expr::Parameter(a), Expr::Parameter(b)) => Arc::ptr_eq(a, b),
            (Expr::Placeholder(a), Expr::Placeholder(b)) => Arc::ptr_eq(a, b),
            (Expr::Block(a), Expr::Block(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Dispatch to the visitor method for this node's kind.
    pub fn accept<'ast, V: Visitor<'ast> + ?Sized>(&'ast self, visitor: &mut V) {
        match self {
            Expr::Constant(constant) => visitor.visit_constant(constant),
            Expr::Parameter(parameter) => visitor.visit_parameter(parameter),
            Expr::Placeholder(placeholder) => visitor.visit_placeholder(placeholder),
            Expr::Block(block) => visitor.visit_block(block),
        }
    }

    #[inline]
    pub fn as_block(&self) -> Option<&Arc<BlockExpr>> {
        match self {
            Expr::Block(block) => Some(block),
            _ => None,
        }
    }

    #[inline]
    pub fn as_parameter(&self) -> Option<&ParamRef> {
        match self {
            Expr::Parameter(parameter) => Some(parameter),
            _ => None,
        }
    }
}

impl From<ParamRef> for Expr {
    fn from(parameter: ParamRef) -> Self {
        Expr::Parameter(parameter)
    }
}

impl From<&ParamRef> for Expr {
    fn from(parameter: &ParamRef) -> Self {
        Expr::Parameter(Arc::clone(parameter))
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(constant) => fmt::Debug::fmt(constant, f),
            Expr::Parameter(parameter) => fmt::Debug::fmt(parameter, f),
            Expr::Placeholder(placeholder) => fmt::Debug::fmt(placeholder, f),
            Expr::Block(block) => fmt::Debug::fmt(block, f),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(constant) => write!(f, "(const {})", constant.value),
            Expr::Parameter(parameter) => write!(f, "(param {})", parameter.display_name()),
            Expr::Placeholder(placeholder) => write!(f, "(hole {})", placeholder.ty),
            Expr::Block(block) => fmt::Display::fmt(block, f),
        }
    }
}

/// A literal value.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantExpr {
    value: Value,
    ty: TypeId,
}

impl ConstantExpr {
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.ty
    }
}

/// A named (or anonymous) parameter or local variable.
#[derive(Debug)]
pub struct ParameterExpr {
    name: Option<Arc<str>>,
    ty: TypeId,
    by_ref: bool,
}

impl ParameterExpr {
    /// Local variable declaration, usable in a scope.
    pub fn variable(name: &str, ty: TypeId) -> ParamRef {
        Arc::new(ParameterExpr {
            name: Some(Arc::from(name)),
            ty,
            by_ref: false,
        })
    }

    /// Anonymous local variable (compiler temporaries).
    pub fn anonymous(ty: TypeId) -> ParamRef {
        Arc::new(ParameterExpr {
            name: None,
            ty,
            by_ref: false,
        })
    }

    /// Parameter passed by reference. Valid for lambdas, never for scopes.
    pub fn by_ref(name: &str, ty: TypeId) -> ParamRef {
        Arc::new(ParameterExpr {
            name: Some(Arc::from(name)),
            ty,
            by_ref: true,
        })
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    #[inline]
    pub fn is_by_ref(&self) -> bool {
        self.by_ref
    }

    /// Name for diagnostics; anonymous parameters render as `_`.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or("_")
    }
}

/// An unbound hole in a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderExpr {
    ty: TypeId,
}

impl PlaceholderExpr {
    #[inline]
    pub fn ty(&self) -> TypeId {
        self.ty
    }
}
