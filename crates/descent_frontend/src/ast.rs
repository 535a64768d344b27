use std::{fmt, mem};

use descent_diagnostic::span::Span;

use crate::parser::EvalError;
use crate::token::TokenKind;
use crate::{Node, NodeCopy};

#[derive(Node!)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Folds the tree with the same checked arithmetic the evaluating
    /// parser uses.
    pub fn evaluate(&self) -> Result<i64, EvalError> {
        let mut values = vec![];

        self.walk(|visit| -> Result<(), EvalError> {
            match visit {
                Visit::Literal(value) => values.push(value),
                Visit::Close { op, lhs, rhs } => match (values.pop(), values.pop()) {
                    (Some(rhs_value), Some(lhs_value)) => {
                        values.push(op.apply(lhs_value, rhs_value, lhs, rhs)?);
                    }
                    _ => unreachable!("binary node closed without two operands"),
                },
                Visit::Open(_) | Visit::Separator => {}
            }
            Ok(())
        })?;

        match values.pop() {
            Some(value) => Ok(value),
            None => unreachable!("walk visits at least one literal"),
        }
    }

    /// Depth-first, left-to-right traversal on an explicit stack, so
    /// arbitrarily long operator chains do not exhaust the call stack.
    fn walk<E>(&self, mut visit: impl FnMut(Visit) -> Result<(), E>) -> Result<(), E> {
        let mut stack = vec![Pending::Node(self)];

        while let Some(pending) = stack.pop() {
            match pending {
                Pending::Node(expr) => match &expr.kind {
                    ExprKind::Literal(value) => visit(Visit::Literal(*value))?,
                    ExprKind::Binary { op, lhs, rhs } => {
                        visit(Visit::Open(*op))?;
                        stack.push(Pending::Close {
                            op: *op,
                            lhs: lhs.span,
                            rhs: rhs.span,
                        });
                        stack.push(Pending::Node(rhs.as_ref()));
                        stack.push(Pending::Separator);
                        stack.push(Pending::Node(lhs.as_ref()));
                    }
                },
                Pending::Separator => visit(Visit::Separator)?,
                Pending::Close { op, lhs, rhs } => visit(Visit::Close { op, lhs, rhs })?,
            }
        }

        Ok(())
    }
}

enum Pending<'a> {
    Node(&'a Expr),
    Separator,
    Close { op: BinOp, lhs: Span, rhs: Span },
}

enum Visit {
    Literal(i64),
    Open(BinOp),
    Separator,
    Close { op: BinOp, lhs: Span, rhs: Span },
}

/// Prints the tree as an s-expression, e.g. `(- (- 8 3) 2)`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.walk(|visit| match visit {
            Visit::Literal(value) => write!(f, "{value}"),
            Visit::Open(op) => write!(f, "({op} "),
            Visit::Separator => f.write_str(" "),
            Visit::Close { .. } => f.write_str(")"),
        })
    }
}

/// Unlinks children onto a work list instead of recursing.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut stack = vec![];
        take_children(&mut self.kind, &mut stack);

        while let Some(mut expr) = stack.pop() {
            take_children(&mut expr.kind, &mut stack);
        }
    }
}

fn take_children(kind: &mut ExprKind, stack: &mut Vec<Box<Expr>>) {
    if let ExprKind::Binary { .. } = kind {
        if let ExprKind::Binary { lhs, rhs, .. } = mem::replace(kind, ExprKind::Literal(0)) {
            stack.push(lhs);
            stack.push(rhs);
        }
    }
}

#[derive(Node!)]
pub enum ExprKind {
    Literal(i64),

    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(NodeCopy!)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn token_kind(self) -> TokenKind {
        match self {
            BinOp::Add => TokenKind::Add,
            BinOp::Sub => TokenKind::Sub,
            BinOp::Mul => TokenKind::Mul,
            BinOp::Div => TokenKind::Div,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }

    /// Checked `i64` arithmetic. Division truncates toward zero.
    pub fn apply(
        self,
        lhs: i64,
        rhs: i64,
        lhs_span: Span,
        rhs_span: Span,
    ) -> Result<i64, EvalError> {
        let value = match self {
            BinOp::Add => lhs.checked_add(rhs),
            BinOp::Sub => lhs.checked_sub(rhs),
            BinOp::Mul => lhs.checked_mul(rhs),
            BinOp::Div if rhs == 0 => return Err(EvalError::DivisionByZero { span: rhs_span }),
            BinOp::Div => lhs.checked_div(rhs),
        };

        value.ok_or(EvalError::Overflow {
            op: self,
            span: lhs_span.union(rhs_span),
        })
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
