//! Equality constraints and the solver that discharges them (spec §4.3).

use crate::error::AnalysisError;
use crate::ty::{compose, Substitution, Substitutable, Type};
use crate::unify::unify;
use quill_util::Span;

/// `CEqual(t1, t2)`: a deferred obligation that two types must unify.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub lhs: Type,
    pub rhs: Type,
    pub span: Span,
}

impl Constraint {
    pub fn new(lhs: Type, rhs: Type, span: Span) -> Self {
        Self { lhs, rhs, span }
    }
}

/// Starting from the empty substitution, unify each constraint in turn and
/// apply the result to every constraint still waiting before moving on.
pub fn solve(constraints: &[Constraint]) -> Result<Substitution, AnalysisError> {
    let mut acc = Substitution::empty();
    let mut rest = constraints.to_vec();
    while let Some((first, tail)) = rest.split_first() {
        let step = unify(&first.lhs, &first.rhs, first.span)?;
        acc = compose(&step, &acc);
        rest = tail
            .iter()
            .map(|c| Constraint::new(c.lhs.apply(&step), c.rhs.apply(&step), c.span))
            .collect();
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{FreshVars, TV};
    use quill_util::{FileId, Symbol};

    fn dummy_span() -> Span {
        Span::new(FileId(0), 0, 0)
    }

    fn tv(s: &str) -> TV {
        TV(Symbol::intern(s))
    }

    #[test]
    fn solving_no_constraints_gives_empty_substitution() {
        let sub = solve(&[]).unwrap();
        assert!(sub.is_empty());
    }

    #[test]
    fn earlier_solutions_propagate_to_later_constraints() {
        let constraints = vec![
            Constraint::new(Type::Var(tv("a")), Type::int32(), dummy_span()),
            Constraint::new(Type::Var(tv("b")), Type::Var(tv("a")), dummy_span()),
        ];
        let sub = solve(&constraints).unwrap();
        assert_eq!(sub.get(&tv("a")), Some(&Type::int32()));
        assert_eq!(sub.get(&tv("b")), Some(&Type::int32()));
    }

    #[test]
    fn conflicting_constraints_fail() {
        let constraints = vec![
            Constraint::new(Type::Var(tv("a")), Type::int32(), dummy_span()),
            Constraint::new(Type::Var(tv("a")), Type::bool_(), dummy_span()),
        ];
        let err = solve(&constraints).unwrap_err();
        assert!(matches!(err, AnalysisError::Mismatch { .. }));
    }

    #[test]
    fn unrelated_fresh_variables_stay_unconstrained() {
        let mut fresh = FreshVars::new();
        let a = fresh.next_type();
        let sub = solve(&[Constraint::new(a.clone(), Type::unit(), dummy_span())]).unwrap();
        assert_eq!(a.apply(&sub), Type::unit());
    }
}
