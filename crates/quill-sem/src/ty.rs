//! The type algebra and the substitution monoid it carries (spec §4.1).
//!
//! `Type` is a small algebraic sum — a type variable, a named constructor
//! applied to arguments, a function type, or a pointer — plus a handful of
//! "distinguished constants" that are just pre-built zero-argument
//! constructors for the literal types the language actually produces at
//! runtime. A [`Substitution`] is a finite map from type variables to types;
//! `apply` and `compose` are the two operations the unifier and solver are
//! built out of.

use crate::name::Name;
use quill_util::{FxHashMap, FxHashSet, Symbol};
use std::fmt;

/// A fresh type-variable tag, generated as `_a, _b, … _z, _aa, _ab, …`
/// (spec §3). Distinctness within a run is all that is required; the
/// specific naming scheme is not observable outside debug output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TV(pub Symbol);

impl fmt::Debug for TV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TV {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates the pairwise-distinct `TV`s used throughout one inference run.
#[derive(Default)]
pub struct FreshVars {
    count: u32,
}

impl FreshVars {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    pub fn next(&mut self) -> TV {
        let tag = bijective_base26(self.count);
        self.count += 1;
        TV(Symbol::intern(&format!("_{tag}")))
    }

    pub fn next_type(&mut self) -> Type {
        Type::Var(self.next())
    }
}

/// Bijective base-26: 0 -> "a", 25 -> "z", 26 -> "aa", 27 -> "ab", ...
fn bijective_base26(mut n: u32) -> String {
    let mut letters = Vec::new();
    loop {
        let rem = n % 26;
        letters.push((b'a' + rem as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// A type in the language's type system (spec §3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    /// An inference variable.
    Var(TV),
    /// A named type constructor applied to zero or more arguments.
    /// Equality is structural, matched on `name` then pairwise on `args`.
    Con(Name, Vec<Type>),
    /// A function type; arity is fixed by `params.len()`.
    Func(Vec<Type>, Box<Type>),
    /// A reference/pointer type. Always targets a previously existing
    /// variable location (spec §4.5 `&e`).
    Ptr(Box<Type>),
}

impl Type {
    fn con(name: &str) -> Type {
        Type::Con(Name::Unqualified(Symbol::intern(name)), Vec::new())
    }

    pub fn int32() -> Type {
        Type::con("i32")
    }

    pub fn float64() -> Type {
        Type::con("f64")
    }

    pub fn str_() -> Type {
        Type::con("str")
    }

    pub fn char_() -> Type {
        Type::con("char")
    }

    pub fn bool_() -> Type {
        Type::con("bool")
    }

    pub fn unit() -> Type {
        Type::con("unit")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Var(v) => write!(f, "{v}"),
            Type::Con(name, args) if args.is_empty() => write!(f, "{name}"),
            Type::Con(name, args) => {
                write!(f, "{name}<")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ">")
            }
            Type::Func(params, ret) => {
                write!(f, "fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {ret}")
            }
            Type::Ptr(inner) => write!(f, "&{inner}"),
        }
    }
}

/// A (possibly) quantified type. Monomorphic schemes have an empty
/// quantifier set — per spec §9, this implementation never generalizes
/// beyond that skeleton.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeScheme {
    pub quantified: FxHashSet<TV>,
    pub body: Type,
}

impl TypeScheme {
    pub fn monomorphic(body: Type) -> Self {
        Self {
            quantified: FxHashSet::default(),
            body,
        }
    }
}

/// A finite map from type variables to types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution(FxHashMap<TV, Type>);

impl Substitution {
    pub fn empty() -> Self {
        Self(FxHashMap::default())
    }

    pub fn singleton(v: TV, t: Type) -> Self {
        let mut map = FxHashMap::default();
        map.insert(v, t);
        Self(map)
    }

    pub fn get(&self, v: &TV) -> Option<&Type> {
        self.0.get(v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TV, &Type)> {
        self.0.iter()
    }
}

/// `compose(a, b)` applies `a` to the range of `b` and then lets `a`'s own
/// bindings shadow `b`'s. Associative, not commutative (spec §4.1).
pub fn compose(a: &Substitution, b: &Substitution) -> Substitution {
    let mut merged: FxHashMap<TV, Type> =
        b.0.iter().map(|(v, t)| (*v, t.apply(a))).collect();
    for (v, t) in a.0.iter() {
        merged.insert(*v, t.clone());
    }
    Substitution(merged)
}

/// Anything that types live inside: applying a substitution rewrites every
/// free type variable; `tvs` collects the free variables.
pub trait Substitutable {
    fn apply(&self, sub: &Substitution) -> Self;
    fn tvs(&self) -> FxHashSet<TV>;
}

impl Substitutable for Type {
    fn apply(&self, sub: &Substitution) -> Self {
        match self {
            Type::Var(v) => sub.get(v).cloned().unwrap_or_else(|| self.clone()),
            Type::Con(name, args) => Type::Con(name.clone(), args.apply(sub)),
            Type::Func(params, ret) => Type::Func(params.apply(sub), Box::new(ret.apply(sub))),
            Type::Ptr(inner) => Type::Ptr(Box::new(inner.apply(sub))),
        }
    }

    fn tvs(&self) -> FxHashSet<TV> {
        match self {
            Type::Var(v) => {
                let mut s = FxHashSet::default();
                s.insert(*v);
                s
            }
            Type::Con(_, args) => args.tvs(),
            Type::Func(params, ret) => {
                let mut s = params.tvs();
                s.extend(ret.tvs());
                s
            }
            Type::Ptr(inner) => inner.tvs(),
        }
    }
}

impl<T: Substitutable> Substitutable for Vec<T> {
    fn apply(&self, sub: &Substitution) -> Self {
        self.iter().map(|t| t.apply(sub)).collect()
    }

    fn tvs(&self) -> FxHashSet<TV> {
        self.iter().fold(FxHashSet::default(), |mut acc, t| {
            acc.extend(t.tvs());
            acc
        })
    }
}

impl Substitutable for TypeScheme {
    /// Quantified variables are removed from the substitution before the
    /// body is rewritten, so a scheme's own binders are never captured.
    fn apply(&self, sub: &Substitution) -> Self {
        let narrowed = Substitution(
            sub.0
                .iter()
                .filter(|(v, _)| !self.quantified.contains(v))
                .map(|(v, t)| (*v, t.clone()))
                .collect(),
        );
        TypeScheme {
            quantified: self.quantified.clone(),
            body: self.body.apply(&narrowed),
        }
    }

    fn tvs(&self) -> FxHashSet<TV> {
        self.body
            .tvs()
            .difference(&self.quantified)
            .copied()
            .collect()
    }
}

/// Replace a scheme's quantified variables with fresh ones.
pub fn instantiate(scheme: &TypeScheme, fresh: &mut FreshVars) -> Type {
    let sub = Substitution(
        scheme
            .quantified
            .iter()
            .map(|v| (*v, fresh.next_type()))
            .collect(),
    );
    scheme.body.apply(&sub)
}
