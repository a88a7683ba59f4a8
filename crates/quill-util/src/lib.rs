//! quill-util - foundation types shared by the quill compiler crates.
//!
//! This crate carries the ambient concerns every other crate in the
//! workspace leans on: interned identifiers ([`Symbol`]), source locations
//! ([`Span`] / [`SourceMap`]), and diagnostic rendering. None of it is
//! specific to the language's semantics — `quill-sem` is where the actual
//! name resolution and type inference live.

pub mod diagnostic;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::{is_base_type_name, Symbol};

pub use rustc_hash::{FxHashMap, FxHashSet};
