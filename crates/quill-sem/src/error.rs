//! The error taxonomy (spec §7). Analysis is fail-fast: the first error
//! raised by either the resolver or the inferrer aborts the run.

use crate::name::Name;
use crate::ty::{Type, TV};
use quill_util::{Span, Symbol};
use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum AnalysisError {
    #[error("`{name}` is already defined in this scope")]
    Redefinition { name: Name, span: Span },

    #[error("`{name}` is not defined")]
    Undefined { name: Name, span: Span },

    #[error("`{name}` is ambiguous: it could refer to {candidates:?}")]
    Ambiguous {
        name: Name,
        candidates: Vec<Name>,
        span: Span,
    },

    #[error("type variable `{var}` does not appear in `{type_name}`'s parameter list")]
    UndefinedTypeVariable {
        type_name: Symbol,
        var: Symbol,
        span: Span,
    },

    #[error("cannot assign to immutable binding `{name}`")]
    ImmutableAssign { name: Name, span: Span },

    #[error("left-hand side of an assignment must be a variable or a dereference")]
    NonLValue { span: Span },

    #[error("`&` can only be applied to a variable")]
    NonReferencable { span: Span },

    #[error("match expression has no arms")]
    EmptyMatch { span: Span },

    #[error("expected type `{expected}`, found `{found}`")]
    Mismatch {
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("infinite type: `{var}` occurs in `{ty}`")]
    InfiniteType { var: TV, ty: Type, span: Span },

    #[error("closures are not supported by this version of the analyzer")]
    NotImplemented { span: Span },
}

impl AnalysisError {
    pub fn span(&self) -> Span {
        match self {
            AnalysisError::Redefinition { span, .. }
            | AnalysisError::Undefined { span, .. }
            | AnalysisError::Ambiguous { span, .. }
            | AnalysisError::UndefinedTypeVariable { span, .. }
            | AnalysisError::ImmutableAssign { span, .. }
            | AnalysisError::NonLValue { span }
            | AnalysisError::NonReferencable { span }
            | AnalysisError::EmptyMatch { span }
            | AnalysisError::Mismatch { span, .. }
            | AnalysisError::InfiniteType { span, .. }
            | AnalysisError::NotImplemented { span } => *span,
        }
    }
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
