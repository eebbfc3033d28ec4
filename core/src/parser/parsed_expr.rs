use serde::Serialize;

use crate::parser::{BinaryOp, BoolOp, ComparisonOp, Span, UnaryOp};

/// A parsed expression: exactly one root node, never empty.
///
/// Programs are immutable and can be shared between threads and evaluated
/// any number of times against different contexts.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Program {
    pub root: Node,
}

/// An expression node together with its source span.
///
/// Spans do not take part in equality, so `(a + b)` and `a + b` compare equal.
#[derive(Serialize, Debug, Clone)]
pub struct Node {
    pub expr: Expr,
    pub span: Span,
    #[serde(skip)]
    height: usize,
}

impl Node {
    pub fn new(expr: Expr, span: Span) -> Self {
        let height = 1 + expr.children().map(Node::height).max().unwrap_or(0);
        Self { expr, span, height }
    }

    /// Number of nodes on the longest path from this node down to a leaf.
    ///
    /// This is the recursion depth the evaluator needs for this subtree.
    pub fn height(&self) -> usize {
        self.height
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Ident(String),
    /// `$`, the whole context.
    Root,
    /// `object.property` (property is an `Ident`) or `object[property]`.
    Member {
        object: Box<Node>,
        property: Box<Node>,
        computed: bool,
    },
    /// `@callee(args...)`. The callee is resolved at evaluation time.
    Call { callee: String, args: Vec<Node> },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Boolean {
        op: BoolOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Comparison {
        op: ComparisonOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Node>,
        prefix: bool,
    },
    Conditional {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
}

impl Expr {
    /// Direct subexpressions, in evaluation order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        let (boxed, args): ([Option<&Node>; 3], &[Node]) = match self {
            Expr::Literal(_) | Expr::Ident(_) | Expr::Root => ([None; 3], &[]),
            Expr::Member {
                object, property, ..
            } => ([Some(&**object), Some(&**property), None], &[]),
            Expr::Call { args, .. } => ([None; 3], args),
            Expr::Binary { left, right, .. }
            | Expr::Boolean { left, right, .. }
            | Expr::Comparison { left, right, .. } => ([Some(&**left), Some(&**right), None], &[]),
            Expr::Unary { expr, .. } => ([Some(&**expr), None, None], &[]),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => (
                [Some(&**test), Some(&**consequent), Some(&**alternate)],
                &[],
            ),
        };
        boxed.into_iter().flatten().chain(args)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "literal",
            Expr::Ident(_) => "identifier",
            Expr::Root => "context root",
            Expr::Member { .. } => "member access",
            Expr::Call { .. } => "function call",
            Expr::Binary { .. } | Expr::Boolean { .. } | Expr::Comparison { .. } => {
                "binary expression"
            }
            Expr::Unary { .. } => "unary expression",
            Expr::Conditional { .. } => "conditional",
        }
    }
}

impl Program {
    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![&self.root];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.expr.children());
        }
        count
    }

    /// Height of the tree, see [`Node::height`].
    pub fn height(&self) -> usize {
        self.root.height()
    }
}
