//! Two-pass name resolution (spec §4.4).
//!
//! Pass 0 walks every module's top-level signatures (never bodies) and
//! seeds `name_set`/`pub_map` so that forward references and mutual
//! recursion, both within and across modules, resolve correctly. Pass 1
//! then walks every body, rewriting each `Name::Unqualified` use site into
//! the `Name::Qualified` it refers to.

use crate::ast::*;
use crate::error::AnalysisError;
use crate::name::Name;
use quill_util::{is_base_type_name, FxHashMap, FxHashSet, Symbol};

pub struct Resolver {
    name_set: FxHashSet<Name>,
    pub_map: FxHashMap<Name, bool>,
    imports_map: FxHashMap<Vec<Symbol>, Vec<Import>>,
    /// Top-level qualified names already seen in the module currently being
    /// walked in pass 1 — catches duplicate function/operator definitions.
    extra_set: FxHashSet<Name>,
    cur_mod: Vec<Symbol>,
    /// Nested-scope path segments (function name, then one per block),
    /// appended to `cur_mod` to qualify locally-introduced names.
    local_scope: Vec<Symbol>,
    tmp_scope_count: u32,
    /// Import paths visible for unqualified lookup from `cur_mod`, computed
    /// once per module (spec §9: memoize to avoid re-walking import DAGs).
    visible_imports: Vec<Vec<Symbol>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            name_set: FxHashSet::default(),
            pub_map: FxHashMap::default(),
            imports_map: FxHashMap::default(),
            extra_set: FxHashSet::default(),
            cur_mod: Vec::new(),
            local_scope: Vec::new(),
            tmp_scope_count: 0,
            visible_imports: Vec::new(),
        }
    }

    pub fn resolve_program(&mut self, program: &mut Program) -> Result<(), AnalysisError> {
        self.seed_globals(program);
        for module in &mut program.modules {
            self.resolve_module(module)?;
        }
        Ok(())
    }

    fn seed_globals(&mut self, program: &Program) {
        for module in &program.modules {
            let full = module.full_path();
            self.imports_map.insert(full.clone(), module.imports.clone());
            for tl in &module.top_levels {
                match tl {
                    TopLevel::Func(f) => self.seed(&full, f.name, f.is_pub),
                    TopLevel::Oper(o) => self.seed(&full, o.symbol, o.is_pub),
                    TopLevel::Type(t) => {
                        self.seed(&full, t.name, t.is_pub);
                        for (ctor, _) in &t.constructors {
                            self.seed(&full, *ctor, t.is_pub);
                        }
                    }
                    TopLevel::Extern(e) => {
                        self.name_set.insert(Name::qualified(&full, e.name));
                    }
                }
            }
        }
    }

    fn seed(&mut self, full: &[Symbol], text: Symbol, is_pub: bool) {
        let qualified = Name::qualified(full, text);
        self.pub_map.insert(qualified.clone(), is_pub);
        self.name_set.insert(qualified);
    }

    fn resolve_module(&mut self, module: &mut Module) -> Result<(), AnalysisError> {
        self.cur_mod = module.full_path();
        self.extra_set = FxHashSet::default();
        self.tmp_scope_count = 0;
        self.visible_imports = self.gather_all_pub_imports(&self.cur_mod.clone());

        for tl in &mut module.top_levels {
            self.resolve_top_level(tl)?;
        }
        Ok(())
    }

    fn resolve_top_level(&mut self, tl: &mut TopLevel) -> Result<(), AnalysisError> {
        match tl {
            TopLevel::Func(f) => {
                self.check_top_level_duplicate(f.name, f.span)?;
                self.resolve_fn_like(&mut f.params, &mut f.ret_annot, &mut f.body, f.name)
            }
            TopLevel::Oper(o) => {
                self.check_top_level_duplicate(o.symbol, o.span)?;
                self.resolve_fn_like(&mut o.params, &mut o.ret_annot, &mut o.body, o.symbol)
            }
            TopLevel::Type(t) => {
                for (_, arg_types) in &mut t.constructors {
                    for arg in arg_types {
                        self.resolve_type_expr(arg)?;
                    }
                }
                Ok(())
            }
            // Extern: unchanged — no resolution performed on it at all.
            TopLevel::Extern(_) => Ok(()),
        }
    }

    fn check_top_level_duplicate(
        &mut self,
        text: Symbol,
        span: quill_util::Span,
    ) -> Result<(), AnalysisError> {
        let qualified = Name::qualified(&self.cur_mod, text);
        if !self.extra_set.insert(qualified.clone()) {
            return Err(AnalysisError::Redefinition {
                name: qualified,
                span,
            });
        }
        Ok(())
    }

    fn resolve_fn_like(
        &mut self,
        params: &mut [Param],
        ret_annot: &mut Option<TypeExpr>,
        body: &mut Expr,
        fn_text: Symbol,
    ) -> Result<(), AnalysisError> {
        if let Some(ret) = ret_annot {
            self.resolve_type_expr(ret)?;
        }
        self.local_scope.push(fn_text);
        let result = (|| {
            for param in params.iter_mut() {
                self.declare_local(&mut param.name, param.span)?;
                if let Some(annot) = &mut param.annot {
                    self.resolve_type_expr(annot)?;
                }
            }
            self.resolve_expr(body)
        })();
        self.local_scope.pop();
        result
    }

    /// Turn a freshly-written `Name::Unqualified` binding site into a
    /// `Qualified` one scoped to the current nesting path, rejecting exact
    /// re-declarations within that same scope.
    fn declare_local(&mut self, name: &mut Name, span: quill_util::Span) -> Result<(), AnalysisError> {
        let text = name.text();
        let qualified = Name::qualified(&self.full_scope(), text);
        if !self.name_set.insert(qualified.clone()) {
            return Err(AnalysisError::Redefinition {
                name: qualified,
                span,
            });
        }
        *name = qualified;
        Ok(())
    }

    fn full_scope(&self) -> Vec<Symbol> {
        let mut full = self.cur_mod.clone();
        full.extend(self.local_scope.iter().copied());
        full
    }

    fn resolve_expr(&mut self, expr: &mut Expr) -> Result<(), AnalysisError> {
        match expr {
            Expr::Lit(..) => Ok(()),
            Expr::Var(name, span) => self.resolve_use(name, *span),
            Expr::Assign(l, r, _) => {
                self.resolve_expr(l)?;
                self.resolve_expr(r)
            }
            Expr::Block(decls, trailing, _) => self.resolve_block(decls, trailing),
            Expr::If(c, t, e, _) => {
                self.resolve_expr(c)?;
                self.resolve_expr(t)?;
                self.resolve_expr(e)
            }
            Expr::Match(scrutinee, arms, span) => {
                self.resolve_expr(scrutinee)?;
                if arms.is_empty() {
                    return Err(AnalysisError::EmptyMatch { span: *span });
                }
                for arm in arms {
                    self.resolve_arm(arm)?;
                }
                Ok(())
            }
            Expr::BinOp(op, l, r, span) => {
                if let BinOpKind::Custom(name) = op {
                    self.resolve_use(name, *span)?;
                }
                self.resolve_expr(l)?;
                self.resolve_expr(r)
            }
            Expr::UnOp(UnOpKind::Custom(name), e, span) => {
                self.resolve_use(name, *span)?;
                self.resolve_expr(e)
            }
            Expr::Call(f, args, _) => {
                self.resolve_expr(f)?;
                for a in args {
                    self.resolve_expr(a)?;
                }
                Ok(())
            }
            Expr::Deref(e, _) | Expr::Ref(e, _) => self.resolve_expr(e),
            Expr::Cast(e, ty, _) => {
                self.resolve_expr(e)?;
                self.resolve_type_expr(ty)
            }
            Expr::SizeOf(ty, _) => self.resolve_type_expr(ty),
            Expr::Closure(params, body, _) => {
                let tmp = self.next_tmp_scope_name();
                self.local_scope.push(tmp);
                let result = (|| {
                    for param in params.iter_mut() {
                        self.declare_local(&mut param.name, param.span)?;
                        if let Some(annot) = &mut param.annot {
                            self.resolve_type_expr(annot)?;
                        }
                    }
                    self.resolve_expr(body)
                })();
                self.local_scope.pop();
                result
            }
            Expr::While(c, b, _) => {
                self.resolve_expr(c)?;
                self.resolve_expr(b)
            }
            Expr::Return(Some(e), _) => self.resolve_expr(e),
            Expr::Return(None, _) => Ok(()),
        }
    }

    fn resolve_block(&mut self, decls: &mut [Decl], trailing: &mut Expr) -> Result<(), AnalysisError> {
        let tmp = self.next_tmp_scope_name();
        self.local_scope.push(tmp);
        let result = (|| {
            for decl in decls {
                match decl {
                    Decl::Var {
                        name,
                        annot,
                        init,
                        span,
                        ..
                    } => {
                        self.resolve_expr(init)?;
                        if let Some(annot) = annot {
                            self.resolve_type_expr(annot)?;
                        }
                        self.declare_local(name, *span)?;
                    }
                    Decl::Expr(e) => self.resolve_expr(e)?,
                }
            }
            self.resolve_expr(trailing)
        })();
        self.local_scope.pop();
        result
    }

    fn resolve_arm(&mut self, arm: &mut Arm) -> Result<(), AnalysisError> {
        let tmp = self.next_tmp_scope_name();
        self.local_scope.push(tmp);
        let result = (|| {
            match &mut arm.pattern {
                Pattern::Var(name) => self.declare_local(name, arm.span)?,
                Pattern::Wild | Pattern::Lit(_) => {}
                Pattern::Con(ctor, bound) => {
                    self.resolve_use(ctor, arm.span)?;
                    for b in bound {
                        self.declare_local(b, arm.span)?;
                    }
                }
            }
            self.resolve_expr(&mut arm.body)
        })();
        self.local_scope.pop();
        result
    }

    fn next_tmp_scope_name(&mut self) -> Symbol {
        let tag = format!("_scope{}", self.tmp_scope_count);
        self.tmp_scope_count += 1;
        Symbol::intern(&tag)
    }

    fn resolve_type_expr(&mut self, ty: &mut TypeExpr) -> Result<(), AnalysisError> {
        match ty {
            // Type variables are placeholders bound by an enclosing type's
            // parameter list; whether they're in scope is checked later, by
            // the inferrer's pre-pass (spec §4.5), not here.
            TypeExpr::Var(_) => Ok(()),
            TypeExpr::Named(name, args) => {
                if let Name::Unqualified(s) = name {
                    if is_base_type_name(s.as_str()) {
                        for a in args {
                            self.resolve_type_expr(a)?;
                        }
                        return Ok(());
                    }
                }
                self.resolve_use(name, quill_util::Span::DUMMY)?;
                for a in args {
                    self.resolve_type_expr(a)?;
                }
                Ok(())
            }
            TypeExpr::Func(params, ret) => {
                for p in params {
                    self.resolve_type_expr(p)?;
                }
                self.resolve_type_expr(ret)
            }
            TypeExpr::Ptr(inner) => self.resolve_type_expr(inner),
        }
    }

    /// Resolve a use-site name: walk the local scope chain innermost-first,
    /// then fall back to imports (spec §4.4).
    fn resolve_use(&mut self, name: &mut Name, span: quill_util::Span) -> Result<(), AnalysisError> {
        if let Name::Qualified(_, _) = name {
            return if self.name_set.contains(name) {
                Ok(())
            } else {
                Err(AnalysisError::Undefined {
                    name: name.clone(),
                    span,
                })
            };
        }
        let text = name.text();

        for i in (0..=self.local_scope.len()).rev() {
            let mut prefix = self.cur_mod.clone();
            prefix.extend(self.local_scope[..i].iter().copied());
            let candidate = Name::qualified(&prefix, text);
            if self.name_set.contains(&candidate) {
                *name = candidate;
                return Ok(());
            }
        }

        let mut candidates: Vec<Name> = Vec::new();
        for path in &self.visible_imports {
            let candidate = Name::qualified(path, text);
            if self.name_set.contains(&candidate) && self.pub_map.get(&candidate).copied() == Some(true)
            {
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }

        match candidates.len() {
            0 => Err(AnalysisError::Undefined {
                name: name.clone(),
                span,
            }),
            1 => {
                *name = candidates.into_iter().next().unwrap();
                Ok(())
            }
            _ => Err(AnalysisError::Ambiguous {
                name: name.clone(),
                candidates,
                span,
            }),
        }
    }

    /// The transitive closure of import paths visible for unqualified
    /// lookup from `start`: every path `start` imports directly (public or
    /// private), plus every path reachable by following *public* imports
    /// onward. Private imports are never followed past their own module.
    fn gather_all_pub_imports(&self, start: &[Symbol]) -> Vec<Vec<Symbol>> {
        let mut result = Vec::new();
        let mut visited: FxHashSet<Vec<Symbol>> = FxHashSet::default();

        let direct = self.imports_map.get(start).cloned().unwrap_or_default();
        let mut stack: Vec<Vec<Symbol>> = Vec::new();
        for imp in &direct {
            result.push(imp.path.clone());
            if imp.is_public {
                stack.push(imp.path.clone());
            }
        }

        while let Some(path) = stack.pop() {
            if !visited.insert(path.clone()) {
                continue;
            }
            if let Some(imports) = self.imports_map.get(&path) {
                // Beyond the direct level, only a module's *public* imports
                // are re-exported onward; a private import reached this way
                // must not leak into `start`'s visible set at all.
                for imp in imports.iter().filter(|imp| imp.is_public) {
                    result.push(imp.path.clone());
                    stack.push(imp.path.clone());
                }
            }
        }

        result
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_util::Span;

    fn sp() -> Span {
        Span::DUMMY
    }

    fn module(path: &[&str], name: &str, imports: Vec<Import>, top_levels: Vec<TopLevel>) -> Module {
        Module {
            path: path.iter().map(|s| Symbol::intern(s)).collect(),
            name: Symbol::intern(name),
            imports,
            top_levels,
        }
    }

    fn func(name: &str, is_pub: bool, body: Expr) -> TopLevel {
        TopLevel::Func(TlFunc {
            is_pub,
            name: Symbol::intern(name),
            params: Vec::new(),
            ret_annot: None,
            body,
            span: sp(),
        })
    }

    fn var_use(text: &str) -> Expr {
        Expr::Var(Name::Unqualified(Symbol::intern(text)), sp())
    }

    #[test]
    fn resolves_call_to_sibling_top_level_in_same_module() {
        let mut program = Program {
            modules: vec![module(
                &[],
                "main",
                vec![],
                vec![
                    func("helper", false, Expr::Lit(Literal::Unit, sp())),
                    func(
                        "main",
                        true,
                        Expr::Call(Box::new(var_use("helper")), vec![], sp()),
                    ),
                ],
            )],
        };
        let mut resolver = Resolver::new();
        resolver.resolve_program(&mut program).unwrap();
        let TopLevel::Func(f) = &program.modules[0].top_levels[1] else {
            panic!()
        };
        match &f.body {
            Expr::Call(callee, _, _) => match &**callee {
                Expr::Var(Name::Qualified(path, text), _) => {
                    assert!(path.is_empty());
                    assert_eq!(text.as_str(), "helper");
                }
                other => panic!("expected resolved var, got {other:?}"),
            },
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn undefined_name_is_reported() {
        let mut program = Program {
            modules: vec![module(
                &[],
                "main",
                vec![],
                vec![func("main", true, var_use("nonexistent"))],
            )],
        };
        let mut resolver = Resolver::new();
        let err = resolver.resolve_program(&mut program).unwrap_err();
        assert!(matches!(err, AnalysisError::Undefined { .. }));
    }

    #[test]
    fn duplicate_top_level_definitions_are_rejected() {
        let mut program = Program {
            modules: vec![module(
                &[],
                "main",
                vec![],
                vec![
                    func("dup", false, Expr::Lit(Literal::Unit, sp())),
                    func("dup", false, Expr::Lit(Literal::Unit, sp())),
                ],
            )],
        };
        let mut resolver = Resolver::new();
        let err = resolver.resolve_program(&mut program).unwrap_err();
        assert!(matches!(err, AnalysisError::Redefinition { .. }));
    }

    #[test]
    fn private_import_is_not_transitively_re_exported() {
        // `a` privately imports `b`; `c` publicly imports `a`.
        // `helper` defined in `b` must not be visible from `c`.
        let a = module(
            &[],
            "a",
            vec![Import {
                is_public: false,
                path: vec![Symbol::intern("b")],
            }],
            vec![],
        );
        let b = module(
            &[],
            "b",
            vec![],
            vec![func("helper", true, Expr::Lit(Literal::Unit, sp()))],
        );
        let c = module(
            &[],
            "c",
            vec![Import {
                is_public: true,
                path: vec![Symbol::intern("a")],
            }],
            vec![func("main", true, var_use("helper"))],
        );
        let mut program = Program {
            modules: vec![a, b, c],
        };
        let mut resolver = Resolver::new();
        let err = resolver.resolve_program(&mut program).unwrap_err();
        assert!(matches!(err, AnalysisError::Undefined { .. }));
    }

    #[test]
    fn public_import_is_transitively_visible() {
        let b = module(
            &[],
            "b",
            vec![],
            vec![func("helper", true, Expr::Lit(Literal::Unit, sp()))],
        );
        let a = module(
            &[],
            "a",
            vec![Import {
                is_public: true,
                path: vec![Symbol::intern("b")],
            }],
            vec![],
        );
        let c = module(
            &[],
            "c",
            vec![Import {
                is_public: true,
                path: vec![Symbol::intern("a")],
            }],
            vec![func("main", true, var_use("helper"))],
        );
        let mut program = Program {
            modules: vec![b, a, c],
        };
        let mut resolver = Resolver::new();
        resolver.resolve_program(&mut program).unwrap();
    }
}
