//! Structural unification over [`Type`] (spec §4.2).

use crate::error::AnalysisError;
use crate::ty::{compose, Substitution, Substitutable, Type, TV};
use quill_util::Span;

/// Attempt to unify `t1` and `t2`, producing the most general substitution
/// that makes them equal, or an error (spec §4.2 rules 1-6, tried in order).
pub fn unify(t1: &Type, t2: &Type, span: Span) -> Result<Substitution, AnalysisError> {
    match (t1, t2) {
        // Rule 1: identical types need no substitution.
        (a, b) if a == b => Ok(Substitution::empty()),

        // Rule 2: a bare variable binds to whatever it's matched against.
        (Type::Var(v), t) | (t, Type::Var(v)) => bind(*v, t, span),

        // Rule 3: same constructor, unify argument lists pairwise.
        (Type::Con(n1, a1), Type::Con(n2, a2)) if n1 == n2 && a1.len() == a2.len() => {
            unify_many(a1, a2, span)
        }

        // Rule 4: function types unify on return type, then parameters.
        (Type::Func(p1, r1), Type::Func(p2, r2)) if p1.len() == p2.len() => {
            let mut lhs = p1.clone();
            lhs.push((**r1).clone());
            let mut rhs = p2.clone();
            rhs.push((**r2).clone());
            unify_many(&lhs, &rhs, span)
        }

        // Rule 5: pointers unify on their pointee.
        (Type::Ptr(i1), Type::Ptr(i2)) => unify(i1, i2, span),

        // Rule 6: anything else is a mismatch.
        (a, b) => Err(AnalysisError::Mismatch {
            expected: a.clone(),
            found: b.clone(),
            span,
        }),
    }
}

fn bind(v: TV, t: &Type, span: Span) -> Result<Substitution, AnalysisError> {
    if t.tvs().contains(&v) {
        return Err(AnalysisError::InfiniteType {
            var: v,
            ty: t.clone(),
            span,
        });
    }
    Ok(Substitution::singleton(v, t.clone()))
}

/// Unify two equal-length type lists pairwise, left to right, threading the
/// substitution from each pair into the rest before recursing.
pub fn unify_many(a: &[Type], b: &[Type], span: Span) -> Result<Substitution, AnalysisError> {
    match (a.split_first(), b.split_first()) {
        (None, None) => Ok(Substitution::empty()),
        (Some((a0, arest)), Some((b0, brest))) => {
            let s1 = unify(a0, b0, span)?;
            let arest: Vec<Type> = arest.to_vec().apply(&s1);
            let brest: Vec<Type> = brest.to_vec().apply(&s1);
            let s2 = unify_many(&arest, &brest, span)?;
            Ok(compose(&s2, &s1))
        }
        _ => unreachable!("unify_many called with mismatched lengths"),
    }
}
