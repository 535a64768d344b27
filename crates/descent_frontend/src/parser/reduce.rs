use descent_diagnostic::span::Span;

use super::ParseResult;
use crate::ast::{BinOp, Expr, ExprKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// How the parser turns recognised grammar into a result.
///
/// The grammar is walked identically for every strategy; only these
/// callbacks differ.
pub trait Reduce {
    type Output;

    fn literal(&mut self, value: i64, span: Span) -> ParseResult<Self::Output>;

    fn binary(
        &mut self,
        op: BinOp,
        lhs: Spanned<Self::Output>,
        rhs: Spanned<Self::Output>,
    ) -> ParseResult<Self::Output>;

    /// Called for `( expr )`, with `span` covering the parentheses.
    fn parenthesized(&mut self, inner: Self::Output, _span: Span) -> Self::Output {
        inner
    }
}

/// Evaluates while parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fold;

impl Reduce for Fold {
    type Output = i64;

    fn literal(&mut self, value: i64, _span: Span) -> ParseResult<i64> {
        Ok(value)
    }

    fn binary(&mut self, op: BinOp, lhs: Spanned<i64>, rhs: Spanned<i64>) -> ParseResult<i64> {
        Ok(op.apply(lhs.node, rhs.node, lhs.span, rhs.span)?)
    }
}

/// Builds an [`Expr`] tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildTree;

impl Reduce for BuildTree {
    type Output = Expr;

    fn literal(&mut self, value: i64, span: Span) -> ParseResult<Expr> {
        Ok(Expr::new(ExprKind::Literal(value), span))
    }

    fn binary(&mut self, op: BinOp, lhs: Spanned<Expr>, rhs: Spanned<Expr>) -> ParseResult<Expr> {
        let span = lhs.span.union(rhs.span);

        Ok(Expr::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs.node),
                rhs: Box::new(rhs.node),
            },
            span,
        ))
    }

    fn parenthesized(&mut self, mut inner: Expr, span: Span) -> Expr {
        inner.span = span;
        inner
    }
}
