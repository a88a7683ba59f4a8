//! The analysis environment: the map from resolved names to their bindings,
//! and the stack-discipline helper that extends and restores it around a
//! nested scope (spec §3, §9).

use crate::name::Name;
use crate::ty::TypeScheme;
use quill_util::FxHashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub scheme: TypeScheme,
    pub is_mutable: bool,
}

#[derive(Clone, Debug, Default)]
pub struct AEnv(FxHashMap<Name, Binding>);

impl AEnv {
    pub fn new() -> Self {
        Self(FxHashMap::default())
    }

    pub fn lookup(&self, name: &Name) -> Option<&Binding> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: Name, binding: Binding) {
        self.0.insert(name, binding);
    }
}

/// Extend `env` for the duration of `action`, then restore it exactly to
/// its prior contents — on every return path, including an `Err`. Rust's
/// `Result` makes this a plain snapshot/restore rather than a `Drop` guard:
/// nothing unwinds past the restore on the way out.
pub fn scoped<T>(
    env: &mut AEnv,
    extend: impl FnOnce(&mut AEnv),
    action: impl FnOnce(&mut AEnv) -> T,
) -> T {
    let snapshot = env.clone();
    extend(env);
    let result = action(env);
    *env = snapshot;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Type;
    use quill_util::Symbol;

    fn name(s: &str) -> Name {
        Name::Unqualified(Symbol::intern(s))
    }

    #[test]
    fn scoped_restores_environment_after_action() {
        let mut env = AEnv::new();
        env.insert(
            name("outer"),
            Binding {
                scheme: TypeScheme::monomorphic(Type::int32()),
                is_mutable: false,
            },
        );
        scoped(
            &mut env,
            |env| {
                env.insert(
                    name("inner"),
                    Binding {
                        scheme: TypeScheme::monomorphic(Type::bool_()),
                        is_mutable: false,
                    },
                );
            },
            |env| {
                assert!(env.lookup(&name("inner")).is_some());
            },
        );
        assert!(env.lookup(&name("inner")).is_none());
        assert!(env.lookup(&name("outer")).is_some());
    }

    #[test]
    fn scoped_restores_even_when_action_signals_failure() {
        let mut env = AEnv::new();
        let result: Result<(), ()> = scoped(
            &mut env,
            |env| {
                env.insert(
                    name("temp"),
                    Binding {
                        scheme: TypeScheme::monomorphic(Type::unit()),
                        is_mutable: false,
                    },
                );
            },
            |_env| Err(()),
        );
        assert!(result.is_err());
        assert!(env.lookup(&name("temp")).is_none());
    }
}
