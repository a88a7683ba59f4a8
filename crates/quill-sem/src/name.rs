//! Identifiers, before and after name resolution (spec §3).

use quill_util::Symbol;
use std::fmt;

/// An identifier as it appears at a use site, or a binding once resolved.
///
/// The resolver's whole job is rewriting every `Unqualified` it finds at a
/// use site into a `Qualified` one; everything downstream of resolution
/// (the inferrer, the typed tree) only ever sees `Qualified` names.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Name {
    /// An identifier as written by hand, not yet tied to a definition site.
    Unqualified(Symbol),
    /// A definition's full path: the defining module's path segments, then
    /// the identifier itself.
    Qualified(Vec<Symbol>, Symbol),
}

impl Name {
    pub fn text(&self) -> Symbol {
        match self {
            Name::Unqualified(s) => *s,
            Name::Qualified(_, s) => *s,
        }
    }

    pub fn qualified(path: &[Symbol], text: Symbol) -> Self {
        Name::Qualified(path.to_vec(), text)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Unqualified(s) => write!(f, "{s}"),
            Name::Qualified(path, s) => {
                for seg in path {
                    write!(f, "{seg}::")?;
                }
                write!(f, "{s}")
            }
        }
    }
}
