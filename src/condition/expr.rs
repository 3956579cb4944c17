//! Composite condition expressions.
//!
//! ## Truth tables
//!
//! Both composites first check whether every child ignored the event; if
//! so, the composite ignores it too. Otherwise:
//!
//! | | any `Invalid` | any `Ignore` | otherwise |
//! |---|---|---|---|
//! | AND | `Invalid` | `Ignore` | `Valid` |
//!
//! | | any `Valid` | otherwise |
//! |---|---|---|
//! | OR | `Valid` | `Invalid` |
//!
//! NOT swaps `Valid` and `Invalid` and passes `Ignore` through. A negated
//! `Valid` is rejected as `RuleViolation`; the inner detail is gone, so a
//! literal `Not(Not(x))` rejects with `RuleViolation` even when `x` carried
//! another reason. `negate()` on a NOT unwraps it instead.
//!
//! ## Flattening
//!
//! `a.and(b).and(c)` builds one AND node with three children, not a nested
//! tree; the same holds for `or`. Compiling folds the tree further (drops
//! `Always` from ANDs, unwraps single-child composites) and lays it out as a
//! flat pre-order program. Folding never removes a NOT, so the compiled
//! program rejects with the same reason as the tree walk.

use super::response::{ConditionResponse, RejectionReason, Verdict};

/// Condition expression over leaves of type `L`.
#[derive(Clone, Debug)]
pub enum Expr<L> {
    /// Always `Valid`. The default phase gate.
    Always,
    Leaf(L),
    And(Vec<Expr<L>>),
    Or(Vec<Expr<L>>),
    Not(Box<Expr<L>>),
}

impl<L> Expr<L> {
    /// Create a leaf.
    pub fn leaf(leaf: L) -> Self {
        Self::Leaf(leaf)
    }

    /// Create an AND node, inlining nested ANDs.
    pub fn all(children: impl IntoIterator<Item = Expr<L>>) -> Self {
        Self::And(flatten_and(children))
    }

    /// Create an OR node, inlining nested ORs.
    pub fn any(children: impl IntoIterator<Item = Expr<L>>) -> Self {
        Self::Or(flatten_or(children))
    }

    /// Add another condition with AND.
    #[must_use]
    pub fn and(self, other: Expr<L>) -> Self {
        Self::all([self, other])
    }

    /// Add another condition with OR.
    #[must_use]
    pub fn or(self, other: Expr<L>) -> Self {
        Self::any([self, other])
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Check if this is the trivial `Always` expression.
    #[must_use]
    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Always => 0,
            Self::Leaf(_) => 1,
            Self::And(children) | Self::Or(children) => children.iter().map(Self::leaf_count).sum(),
            Self::Not(inner) => inner.leaf_count(),
        }
    }

    /// Evaluate by walking the tree. `CompiledExpr::evaluate_with` gives
    /// the same answers.
    pub fn evaluate_with<F>(&self, leaf: &mut F) -> ConditionResponse
    where
        F: FnMut(&L) -> ConditionResponse,
    {
        match self {
            Self::Always => ConditionResponse::valid(),
            Self::Leaf(l) => leaf(l),
            Self::Not(inner) => negate(inner.evaluate_with(leaf)),
            Self::And(children) => {
                let mut acc = AndAcc::default();
                for child in children {
                    if let Some(rejected) = acc.push(child.evaluate_with(leaf)) {
                        return rejected;
                    }
                }
                acc.finish()
            }
            Self::Or(children) => {
                let mut acc = OrAcc::default();
                for child in children {
                    if let Some(accepted) = acc.push(child.evaluate_with(leaf)) {
                        return accepted;
                    }
                }
                acc.finish()
            }
        }
    }

    fn fold(self) -> Self {
        match self {
            Self::Always | Self::Leaf(_) => self,
            Self::Not(inner) => Self::Not(Box::new((*inner).fold())),
            Self::And(children) => {
                let children = flatten_and(children.into_iter().map(Self::fold));
                if !children.is_empty() && children.iter().all(Self::is_always) {
                    return Self::Always;
                }
                let mut kept: Vec<_> = children.into_iter().filter(|c| !c.is_always()).collect();
                match kept.len() {
                    1 => kept.remove(0),
                    _ => Self::And(kept),
                }
            }
            Self::Or(mut children) => {
                children = flatten_or(children.into_iter().map(Self::fold));
                if children.iter().any(Self::is_always) {
                    return Self::Always;
                }
                match children.len() {
                    1 => children.remove(0),
                    _ => Self::Or(children),
                }
            }
        }
    }

    /// Fold and lay out as a flat program.
    #[must_use]
    pub fn compile(self) -> CompiledExpr<L> {
        let mut compiled = CompiledExpr {
            ops: Vec::new(),
            leaves: Vec::new(),
        };
        compiled.emit(self.fold());
        compiled
    }
}

fn flatten_and<L>(children: impl IntoIterator<Item = Expr<L>>) -> Vec<Expr<L>> {
    let mut flat = Vec::new();
    for child in children {
        match child {
            // an empty AND is Ignore, not neutral
            Expr::And(inner) if !inner.is_empty() => flat.extend(inner),
            other => flat.push(other),
        }
    }
    flat
}

fn flatten_or<L>(children: impl IntoIterator<Item = Expr<L>>) -> Vec<Expr<L>> {
    let mut flat = Vec::new();
    for child in children {
        match child {
            Expr::Or(inner) if !inner.is_empty() => flat.extend(inner),
            other => flat.push(other),
        }
    }
    flat
}

impl<L> Default for Expr<L> {
    fn default() -> Self {
        Self::Always
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Always,
    Leaf(u32),
    /// Children follow; `end` is the index after the last one.
    And { end: u32 },
    Or { end: u32 },
    Not,
}

/// Flat pre-order form of an `Expr`.
///
/// Composite ops store where their subtree ends, so short-circuiting jumps
/// straight past the remaining children.
#[derive(Clone, Debug)]
pub struct CompiledExpr<L> {
    ops: Vec<Op>,
    leaves: Vec<L>,
}

impl<L> CompiledExpr<L> {
    fn emit(&mut self, expr: Expr<L>) {
        match expr {
            Expr::Always => self.ops.push(Op::Always),
            Expr::Leaf(leaf) => {
                self.ops.push(Op::Leaf(self.leaves.len() as u32));
                self.leaves.push(leaf);
            }
            Expr::Not(inner) => {
                self.ops.push(Op::Not);
                self.emit(*inner);
            }
            Expr::And(children) => self.emit_composite(children, |end| Op::And { end }),
            Expr::Or(children) => self.emit_composite(children, |end| Op::Or { end }),
        }
    }

    fn emit_composite(&mut self, children: Vec<Expr<L>>, op: fn(u32) -> Op) {
        let at = self.ops.len();
        self.ops.push(op(0));
        for child in children {
            self.emit(child);
        }
        self.ops[at] = op(self.ops.len() as u32);
    }

    /// Check if the expression folded to `Always`. Such gates can be
    /// skipped without evaluating anything.
    #[must_use]
    pub fn is_always(&self) -> bool {
        self.ops == [Op::Always]
    }

    /// Leaves in evaluation order.
    #[must_use]
    pub fn leaves(&self) -> &[L] {
        &self.leaves
    }

    /// Number of ops in the program.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Evaluate, calling `leaf` for each leaf actually reached.
    pub fn evaluate_with<F>(&self, leaf: &mut F) -> ConditionResponse
    where
        F: FnMut(&L) -> ConditionResponse,
    {
        if self.ops.is_empty() {
            return ConditionResponse::valid();
        }
        self.eval(0, leaf).0
    }

    fn eval<F>(&self, at: usize, leaf: &mut F) -> (ConditionResponse, usize)
    where
        F: FnMut(&L) -> ConditionResponse,
    {
        match self.ops[at] {
            Op::Always => (ConditionResponse::valid(), at + 1),
            Op::Leaf(index) => (leaf(&self.leaves[index as usize]), at + 1),
            Op::Not => {
                let (response, next) = self.eval(at + 1, leaf);
                (negate(response), next)
            }
            Op::And { end } => {
                let end = end as usize;
                let mut acc = AndAcc::default();
                let mut next = at + 1;
                while next < end {
                    let (response, after) = self.eval(next, leaf);
                    if let Some(rejected) = acc.push(response) {
                        return (rejected, end);
                    }
                    next = after;
                }
                (acc.finish(), end)
            }
            Op::Or { end } => {
                let end = end as usize;
                let mut acc = OrAcc::default();
                let mut next = at + 1;
                while next < end {
                    let (response, after) = self.eval(next, leaf);
                    if let Some(accepted) = acc.push(response) {
                        return (accepted, end);
                    }
                    next = after;
                }
                (acc.finish(), end)
            }
        }
    }
}

fn negate(response: ConditionResponse) -> ConditionResponse {
    match response.verdict {
        Verdict::Valid => {
            ConditionResponse::invalid(RejectionReason::RuleViolation, "negated condition held")
        }
        Verdict::Invalid => ConditionResponse::valid(),
        Verdict::Ignore => response,
    }
}

#[derive(Default)]
struct AndAcc {
    valid: usize,
    ignored: usize,
}

impl AndAcc {
    /// Returns the rejection that ends the scan, if any.
    fn push(&mut self, response: ConditionResponse) -> Option<ConditionResponse> {
        match response.verdict {
            Verdict::Valid => self.valid += 1,
            Verdict::Ignore => self.ignored += 1,
            Verdict::Invalid => return Some(response),
        }
        None
    }

    fn finish(self) -> ConditionResponse {
        // Covers "every child ignored" and the empty AND.
        if self.valid == 0 || self.ignored > 0 {
            ConditionResponse::ignore()
        } else {
            ConditionResponse::valid()
        }
    }
}

#[derive(Default)]
struct OrAcc {
    failing: Vec<ConditionResponse>,
}

impl OrAcc {
    /// Returns the acceptance that ends the scan, if any.
    fn push(&mut self, response: ConditionResponse) -> Option<ConditionResponse> {
        match response.verdict {
            Verdict::Valid => return Some(response),
            Verdict::Invalid => self.failing.push(response),
            Verdict::Ignore => {}
        }
        None
    }

    fn finish(mut self) -> ConditionResponse {
        match self.failing.len() {
            0 => ConditionResponse::ignore(),
            1 => self.failing.remove(0),
            _ => {
                let reason = self.failing[0].rejection_reason();
                let message = self
                    .failing
                    .iter()
                    .filter(|r| !r.message.is_empty())
                    .map(|r| r.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                ConditionResponse::invalid(reason, message).with_failing(self.failing)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Test = Expr<Verdict>;

    fn respond(verdict: &Verdict) -> ConditionResponse {
        match verdict {
            Verdict::Valid => ConditionResponse::valid(),
            Verdict::Ignore => ConditionResponse::ignore(),
            Verdict::Invalid => ConditionResponse::invalid(RejectionReason::RuleViolation, "no"),
        }
    }

    fn tree(expr: &Test) -> Verdict {
        expr.evaluate_with(&mut respond).verdict
    }

    fn compiled(expr: &Test) -> Verdict {
        expr.clone().compile().evaluate_with(&mut respond).verdict
    }

    fn leaves(verdicts: &[Verdict]) -> Vec<Test> {
        verdicts.iter().copied().map(Expr::leaf).collect()
    }

    use Verdict::{Ignore, Invalid, Valid};

    #[test]
    fn test_and_truth_table() {
        let cases = [
            (vec![Valid, Valid], Valid),
            (vec![Valid, Invalid], Invalid),
            (vec![Ignore, Ignore], Ignore),
            (vec![Valid, Ignore], Ignore),
            (vec![Ignore, Invalid], Invalid),
        ];
        for (children, expected) in cases {
            let expr = Expr::all(leaves(&children));
            assert_eq!(tree(&expr), expected, "AND {children:?}");
            assert_eq!(compiled(&expr), expected, "compiled AND {children:?}");
        }
    }

    #[test]
    fn test_or_truth_table() {
        let cases = [
            (vec![Invalid, Invalid], Invalid),
            (vec![Valid, Invalid], Valid),
            (vec![Ignore, Ignore], Ignore),
            (vec![Ignore, Invalid], Invalid),
            (vec![Ignore, Valid], Valid),
        ];
        for (children, expected) in cases {
            let expr = Expr::any(leaves(&children));
            assert_eq!(tree(&expr), expected, "OR {children:?}");
            assert_eq!(compiled(&expr), expected, "compiled OR {children:?}");
        }
    }

    #[test]
    fn test_not() {
        assert_eq!(tree(&Expr::leaf(Valid).negate()), Invalid);
        assert_eq!(tree(&Expr::leaf(Invalid).negate()), Valid);
        assert_eq!(tree(&Expr::leaf(Ignore).negate()), Ignore);
    }

    #[test]
    fn test_empty_composites_ignore() {
        assert_eq!(compiled(&Expr::all(Vec::new())), Ignore);
        assert_eq!(compiled(&Expr::any(Vec::new())), Ignore);
    }

    #[test]
    fn test_chained_and_is_flat() {
        let expr = Expr::leaf(Valid)
            .and(Expr::leaf(Valid))
            .and(Expr::leaf(Ignore));
        match &expr {
            Expr::And(children) => {
                assert_eq!(children.len(), 3);
                assert!(children.iter().all(|c| matches!(c, Expr::Leaf(_))));
            }
            other => panic!("expected flat AND, got {other:?}"),
        }
    }

    #[test]
    fn test_or_does_not_flatten_into_and() {
        let expr = Expr::leaf(Valid).and(Expr::leaf(Valid).or(Expr::leaf(Invalid)));
        match &expr {
            Expr::And(children) => assert!(matches!(children[1], Expr::Or(_))),
            other => panic!("expected AND, got {other:?}"),
        }
    }

    #[test]
    fn test_double_negation_cancels() {
        let expr = Expr::leaf(Valid).negate().negate();
        assert!(matches!(expr, Expr::Leaf(Valid)));
    }

    #[test]
    fn test_nested_not_keeps_reason_when_compiled() {
        let mut blocked = |verdict: &Verdict| match verdict {
            Valid => ConditionResponse::valid(),
            _ => ConditionResponse::invalid(RejectionReason::PathObstructed, "blocked"),
        };
        // the single-child AND unwraps to a literal double NOT
        let expr: Test = Expr::Not(Box::new(Expr::all([Expr::leaf(Invalid).negate()])));
        let walked = expr.evaluate_with(&mut blocked);
        let program = expr.compile().evaluate_with(&mut blocked);
        assert_eq!(walked.verdict, Invalid);
        assert_eq!(program.verdict, Invalid);
        assert_eq!(walked.rejection_reason(), RejectionReason::RuleViolation);
        assert_eq!(program.rejection_reason(), walked.rejection_reason());
    }

    #[test]
    fn test_fold_always() {
        let gate: Test = Expr::all([Expr::Always, Expr::Always]);
        assert!(gate.compile().is_always());

        let gate: Test = Expr::any([Expr::leaf(Invalid), Expr::Always]);
        assert!(gate.compile().is_always());

        let gate: Test = Expr::all([Expr::Always, Expr::leaf(Ignore)]);
        let program = gate.compile();
        assert_eq!(program.len(), 1);
        assert_eq!(program.evaluate_with(&mut respond).verdict, Ignore);
    }

    #[test]
    fn test_and_short_circuits_on_invalid() {
        let expr = Expr::all(leaves(&[Invalid, Valid, Valid])).compile();
        let mut calls = 0;
        let response = expr.evaluate_with(&mut |v: &Verdict| {
            calls += 1;
            respond(v)
        });
        assert!(response.is_invalid());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_or_short_circuits_on_valid() {
        let expr = Expr::any(leaves(&[Ignore, Valid, Invalid])).compile();
        let mut calls = 0;
        let response = expr.evaluate_with(&mut |v: &Verdict| {
            calls += 1;
            respond(v)
        });
        assert!(response.is_valid());
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_or_collects_failing_children() {
        let expr = Expr::any([
            Expr::leaf(ConditionResponse::invalid(RejectionReason::NotOwner, "not yours")),
            Expr::leaf(ConditionResponse::invalid(RejectionReason::PathObstructed, "blocked")),
        ]);
        let response = expr.compile().evaluate_with(&mut |r: &ConditionResponse| r.clone());

        assert!(response.is_invalid());
        assert_eq!(response.failing.len(), 2);
        assert_eq!(response.rejection_reason(), RejectionReason::NotOwner);
        assert_eq!(response.message, "not yours; blocked");
    }

    #[test]
    fn test_nested_program_skips_subtrees() {
        // (Invalid OR Valid) AND NOT(Ignore) AND (Valid AND Valid)
        let expr = Expr::all([
            Expr::any(leaves(&[Invalid, Valid])),
            Expr::leaf(Ignore).negate(),
            Expr::all(leaves(&[Valid, Valid])),
        ]);
        assert_eq!(tree(&expr), Ignore);
        assert_eq!(compiled(&expr), Ignore);
        assert_eq!(expr.leaf_count(), 5);
    }
}
