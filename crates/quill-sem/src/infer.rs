//! Constraint-generating type inference (spec §4.5).
//!
//! The inferrer never unifies directly: every expression rule produces a
//! type plus zero or more [`Constraint`]s appended to a single running log,
//! which the [`crate::constraint::solve`] fold discharges afterwards. The
//! only local exception is a top-level binding's own body, which is solved
//! immediately so its monotype can be pinned down and inserted into the
//! environment for later bindings to see (spec §4.5, "Top-level pre-pass").

use crate::ast;
use crate::constraint::{solve, Constraint};
use crate::env::{scoped, AEnv, Binding};
use crate::error::{AnalysisError, AnalysisResult};
use crate::hir;
use crate::name::Name;
use crate::ty::{instantiate, FreshVars, Substitutable, Type, TypeScheme, TV};
use quill_util::{FxHashMap, Span, Symbol};

pub struct Inferrer {
    env: AEnv,
    fresh: FreshVars,
    /// Placeholder monotypes for every top-level binding, installed before
    /// any body is inferred so mutual recursion resolves regardless of
    /// declaration order (spec §3, §8 property 5).
    top_lvl_tmps: FxHashMap<Name, Type>,
    /// Every constraint generated so far, across every top-level inferred.
    /// Never truncated — it feeds the whole-program solve in `analyze`.
    constraints: Vec<Constraint>,
    main_exists: bool,
}

impl Inferrer {
    pub fn new() -> Self {
        Self {
            env: AEnv::new(),
            fresh: FreshVars::new(),
            top_lvl_tmps: FxHashMap::default(),
            constraints: Vec::new(),
            main_exists: false,
        }
    }

    pub fn main_exists(&self) -> bool {
        self.main_exists
    }

    /// Run inference over every module's top-levels and return the typed
    /// tree plus the final, whole-program substitution already applied.
    pub fn infer_program(&mut self, program: &ast::Program) -> AnalysisResult<hir::Program> {
        self.pre_pass(program)?;

        let mut modules = Vec::with_capacity(program.modules.len());
        for module in &program.modules {
            let full = module.full_path();
            let mut top_levels = Vec::with_capacity(module.top_levels.len());
            for tl in &module.top_levels {
                if let Some(typed) = self.infer_top_level(tl, &full)? {
                    top_levels.push(typed);
                }
            }
            modules.push(hir::Module {
                path: module.path.clone(),
                name: module.name,
                top_levels,
            });
        }

        let sub = solve(&self.constraints)?;
        let program = hir::Program { modules };
        Ok(hir::apply_sub_program(&program, &sub))
    }

    fn pre_pass(&mut self, program: &ast::Program) -> AnalysisResult<()> {
        for module in &program.modules {
            for tl in &module.top_levels {
                match tl {
                    ast::TopLevel::Func(f) => {
                        if f.name.as_str() == "main" {
                            self.main_exists = true;
                        }
                        let placeholder = self.fresh.next_type();
                        self.top_lvl_tmps
                            .insert(Name::qualified(&module.full_path(), f.name), placeholder);
                    }
                    ast::TopLevel::Oper(o) => {
                        let placeholder = self.fresh.next_type();
                        self.top_lvl_tmps
                            .insert(Name::qualified(&module.full_path(), o.symbol), placeholder);
                    }
                    ast::TopLevel::Type(t) => self.register_type_decl(module, t)?,
                    ast::TopLevel::Extern(e) => {
                        let full = module.full_path();
                        let tv_map = FxHashMap::default();
                        let param_types: Vec<Type> = e
                            .param_types
                            .iter()
                            .map(|p| self.type_expr_to_type(p, &tv_map))
                            .collect();
                        let ret_type = self.type_expr_to_type(&e.ret_type, &tv_map);
                        self.env.insert(
                            Name::qualified(&full, e.name),
                            Binding {
                                scheme: TypeScheme::monomorphic(Type::Func(
                                    param_types,
                                    Box::new(ret_type),
                                )),
                                is_mutable: false,
                            },
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn register_type_decl(&mut self, module: &ast::Module, t: &ast::TlType) -> AnalysisResult<()> {
        let full = module.full_path();
        let mut tv_map: FxHashMap<Symbol, TV> = FxHashMap::default();
        for param in &t.type_params {
            tv_map.insert(*param, self.fresh.next());
        }

        let type_name = Name::qualified(&full, t.name);
        let owner = Type::Con(
            type_name.clone(),
            t.type_params
                .iter()
                .map(|p| Type::Var(tv_map[p]))
                .collect(),
        );

        for (ctor_text, arg_exprs) in &t.constructors {
            self.check_type_vars_declared(t, arg_exprs)?;
            let arg_types: Vec<Type> = arg_exprs
                .iter()
                .map(|a| self.type_expr_to_type(a, &tv_map))
                .collect();
            let ctor_ty = if arg_types.is_empty() {
                owner.clone()
            } else {
                Type::Func(arg_types, Box::new(owner.clone()))
            };
            self.env.insert(
                Name::qualified(&full, *ctor_text),
                Binding {
                    scheme: TypeScheme::monomorphic(ctor_ty),
                    is_mutable: false,
                },
            );
        }
        Ok(())
    }

    fn check_type_vars_declared(
        &self,
        t: &ast::TlType,
        arg_exprs: &[ast::TypeExpr],
    ) -> AnalysisResult<()> {
        for expr in arg_exprs {
            self.check_type_vars_in_expr(t, expr)?;
        }
        Ok(())
    }

    fn check_type_vars_in_expr(&self, t: &ast::TlType, expr: &ast::TypeExpr) -> AnalysisResult<()> {
        match expr {
            ast::TypeExpr::Var(v) => {
                if !t.type_params.contains(v) {
                    return Err(AnalysisError::UndefinedTypeVariable {
                        type_name: t.name,
                        var: *v,
                        span: t.span,
                    });
                }
                Ok(())
            }
            ast::TypeExpr::Named(_, args) => {
                for a in args {
                    self.check_type_vars_in_expr(t, a)?;
                }
                Ok(())
            }
            ast::TypeExpr::Func(params, ret) => {
                for p in params {
                    self.check_type_vars_in_expr(t, p)?;
                }
                self.check_type_vars_in_expr(t, ret)
            }
            ast::TypeExpr::Ptr(inner) => self.check_type_vars_in_expr(t, inner),
        }
    }

    fn infer_top_level(
        &mut self,
        tl: &ast::TopLevel,
        module_path: &[Symbol],
    ) -> AnalysisResult<Option<hir::TopLevel>> {
        match tl {
            ast::TopLevel::Func(f) => Ok(Some(hir::TopLevel::Func(self.infer_fn(
                &f.params,
                &f.ret_annot,
                &f.body,
                &Name::qualified(module_path, f.name),
                None,
                f.is_pub,
                f.span,
            )?))),
            ast::TopLevel::Oper(o) => Ok(Some(hir::TopLevel::Func(self.infer_fn(
                &o.params,
                &o.ret_annot,
                &o.body,
                &Name::qualified(module_path, o.symbol),
                Some(o.op_def.clone()),
                o.is_pub,
                o.span,
            )?))),
            ast::TopLevel::Type(t) => Ok(Some(self.finalize_type_decl(t, module_path))),
            ast::TopLevel::Extern(e) => Ok(Some(self.finalize_extern(e, module_path))),
        }
    }

    fn finalize_type_decl(&self, t: &ast::TlType, module_path: &[Symbol]) -> hir::TopLevel {
        // The binding's scheme already carries the constructor types,
        // registered in `register_type_decl`; pull them back out for the
        // typed tree rather than recomputing them.
        hir::TopLevel::Type(hir::TypeItem {
            name: Name::qualified(module_path, t.name),
            is_pub: t.is_pub,
            type_params: t.type_params.clone(),
            constructors: t
                .constructors
                .iter()
                .map(|(ctor, _)| {
                    let qualified = Name::qualified(module_path, *ctor);
                    let ty = self.env.lookup(&qualified).map(|b| b.scheme.body.clone());
                    let arg_types = match ty {
                        Some(Type::Func(args, _)) => args,
                        _ => Vec::new(),
                    };
                    (qualified, arg_types)
                })
                .collect(),
            span: t.span,
        })
    }

    fn finalize_extern(&self, e: &ast::TlExtern, module_path: &[Symbol]) -> hir::TopLevel {
        let tv_map = FxHashMap::default();
        hir::TopLevel::Extern(hir::ExternItem {
            name: Name::qualified(module_path, e.name),
            param_types: e
                .param_types
                .iter()
                .map(|p| type_expr_to_type_readonly(p, &tv_map))
                .collect(),
            ret_type: type_expr_to_type_readonly(&e.ret_type, &tv_map),
            span: e.span,
        })
    }

    /// Infer a function or operator body (spec §4.5, "Function inference").
    #[allow(clippy::too_many_arguments)]
    fn infer_fn(
        &mut self,
        params: &[ast::Param],
        ret_annot: &Option<ast::TypeExpr>,
        body: &ast::Expr,
        name: &Name,
        op_def: Option<ast::OpDef>,
        is_pub: bool,
        span: Span,
    ) -> AnalysisResult<hir::FnItem> {
        let param_vars: Vec<Type> = params.iter().map(|_| self.fresh.next_type()).collect();

        let start = self.constraints.len();
        let typed_body = {
            let mut result = None;
            let env = &mut self.env;
            let fresh = &mut self.fresh;
            let constraints = &mut self.constraints;
            let top_lvl_tmps = &self.top_lvl_tmps;
            scoped(
                env,
                |env| {
                    for (p, t) in params.iter().zip(param_vars.iter()) {
                        env.insert(
                            p.name.clone(),
                            Binding {
                                scheme: TypeScheme::monomorphic(t.clone()),
                                is_mutable: false,
                            },
                        );
                    }
                },
                |env| {
                    let mut infer = BodyInferrer {
                        env,
                        fresh,
                        constraints,
                        top_lvl_tmps,
                    };
                    result = Some(infer.infer_expr(body));
                },
            );
            result.unwrap()?
        };

        let local_constraints = self.constraints[start..].to_vec();
        let sigma = solve(&local_constraints)?;

        let params_final: Vec<Type> = param_vars.apply(&sigma);
        let body_ty = typed_body.ty().apply(&sigma);

        if let Some(ret) = ret_annot {
            let tv_map = FxHashMap::default();
            let ann_ty = self.type_expr_to_type(ret, &tv_map);
            self.constraints.push(Constraint::new(body_ty.clone(), ann_ty, span));
        }
        for (p, t) in params.iter().zip(params_final.iter()) {
            if let Some(annot) = &p.annot {
                let tv_map = FxHashMap::default();
                let ann_ty = self.type_expr_to_type(annot, &tv_map);
                self.constraints.push(Constraint::new(t.clone(), ann_ty, p.span));
            }
        }

        let mut return_types = Vec::new();
        hir::collect_return_types(&typed_body, &mut return_types);
        for rt in return_types {
            self.constraints
                .push(Constraint::new(body_ty.clone(), rt.apply(&sigma), span));
        }

        let fn_ty = Type::Func(params_final.clone(), Box::new(body_ty.clone()));
        self.top_lvl_tmps.remove(name);
        self.env.insert(
            name.clone(),
            Binding {
                scheme: TypeScheme::monomorphic(fn_ty.clone()),
                is_mutable: false,
            },
        );

        Ok(hir::FnItem {
            name: name.clone(),
            is_pub,
            op_def,
            params: params
                .iter()
                .zip(params_final.into_iter())
                .map(|(p, t)| (p.name.clone(), t))
                .collect(),
            ret_type: body_ty,
            body: typed_body,
            span,
        })
    }

    fn type_expr_to_type(&mut self, te: &ast::TypeExpr, tv_map: &FxHashMap<Symbol, TV>) -> Type {
        type_expr_to_type_impl(te, tv_map, Some(&mut self.fresh))
    }
}

impl Default for Inferrer {
    fn default() -> Self {
        Self::new()
    }
}

fn type_expr_to_type_readonly(te: &ast::TypeExpr, tv_map: &FxHashMap<Symbol, TV>) -> Type {
    type_expr_to_type_impl(te, tv_map, None)
}

/// Convert a surface `TypeExpr` into a semantic `Type`. Base type names
/// short-circuit to the distinguished constants (spec §4.4); a bare type
/// variable not found in `tv_map` falls back to a fresh variable when one
/// is available, otherwise to itself via a zero-arity constructor name.
fn type_expr_to_type_impl(
    te: &ast::TypeExpr,
    tv_map: &FxHashMap<Symbol, TV>,
    mut fresh: Option<&mut FreshVars>,
) -> Type {
    match te {
        ast::TypeExpr::Var(sym) => match tv_map.get(sym) {
            Some(tv) => Type::Var(*tv),
            None => match fresh.as_deref_mut() {
                Some(f) => f.next_type(),
                None => Type::Var(TV(*sym)),
            },
        },
        ast::TypeExpr::Named(name, args) => {
            if let Name::Unqualified(s) = name {
                if let Some(base) = base_type_constant(s.as_str()) {
                    return base;
                }
            }
            let args = args
                .iter()
                .map(|a| type_expr_to_type_impl(a, tv_map, fresh.as_deref_mut()))
                .collect();
            Type::Con(name.clone(), args)
        }
        ast::TypeExpr::Func(params, ret) => Type::Func(
            params
                .iter()
                .map(|p| type_expr_to_type_impl(p, tv_map, fresh.as_deref_mut()))
                .collect(),
            Box::new(type_expr_to_type_impl(ret, tv_map, fresh)),
        ),
        ast::TypeExpr::Ptr(inner) => {
            Type::Ptr(Box::new(type_expr_to_type_impl(inner, tv_map, fresh)))
        }
    }
}

fn base_type_constant(s: &str) -> Option<Type> {
    match s {
        "i32" => Some(Type::int32()),
        "f64" => Some(Type::float64()),
        "str" => Some(Type::str_()),
        "char" => Some(Type::char_()),
        "bool" => Some(Type::bool_()),
        "unit" => Some(Type::unit()),
        _ => None,
    }
}

fn literal_type(lit: &ast::Literal) -> Type {
    match lit {
        ast::Literal::Int(_) => Type::int32(),
        ast::Literal::Float(_) => Type::float64(),
        ast::Literal::Str(_) => Type::str_(),
        ast::Literal::Char(_) => Type::char_(),
        ast::Literal::Bool(_) => Type::bool_(),
        ast::Literal::Unit => Type::unit(),
    }
}

/// Infers one function body's expressions, borrowing the shared environment
/// and fresh-variable/constraint state from the owning [`Inferrer`].
struct BodyInferrer<'a> {
    env: &'a mut AEnv,
    fresh: &'a mut FreshVars,
    constraints: &'a mut Vec<Constraint>,
    top_lvl_tmps: &'a FxHashMap<Name, Type>,
}

impl<'a> BodyInferrer<'a> {
    fn push(&mut self, lhs: Type, rhs: Type, span: Span) {
        self.constraints.push(Constraint::new(lhs, rhs, span));
    }

    fn lookup(&mut self, name: &Name) -> AnalysisResult<Type> {
        if let Some(t) = self.top_lvl_tmps.get(name) {
            return Ok(t.clone());
        }
        if let Some(binding) = self.env.lookup(name) {
            return Ok(instantiate(&binding.scheme, self.fresh));
        }
        // The resolver guarantees every use site is bound; reaching this
        // means a name escaped resolution unresolved.
        Err(AnalysisError::Undefined {
            name: name.clone(),
            span: Span::DUMMY,
        })
    }

    fn infer_expr(&mut self, expr: &ast::Expr) -> AnalysisResult<hir::Expr> {
        match expr {
            ast::Expr::Lit(lit, span) => Ok(hir::Expr::Lit {
                lit: lit.clone(),
                ty: literal_type(lit),
                span: *span,
            }),

            ast::Expr::Var(name, span) => {
                let ty = self.lookup(name)?;
                Ok(hir::Expr::Var {
                    name: name.clone(),
                    ty,
                    span: *span,
                })
            }

            ast::Expr::Assign(l, r, span) => {
                self.check_lvalue(l)?;
                let tl = self.infer_expr(l)?;
                let tr = self.infer_expr(r)?;
                self.push(tl.ty(), tr.ty(), *span);
                Ok(hir::Expr::Assign {
                    ty: tl.ty(),
                    l: Box::new(tl),
                    r: Box::new(tr),
                    span: *span,
                })
            }

            ast::Expr::Block(decls, trailing, span) => {
                // A block's own `let`s are only in scope for the rest of the
                // block (spec §4.5 "inferred in an extended scope that is
                // popped on exit"); `scoped` restores `env` on the way out
                // whether inference below succeeds or fails.
                let env = &mut *self.env;
                let fresh = &mut *self.fresh;
                let constraints = &mut *self.constraints;
                let top_lvl_tmps = self.top_lvl_tmps;
                let mut result = None;
                scoped(
                    env,
                    |_env| {},
                    |env| {
                        let mut infer = BodyInferrer {
                            env,
                            fresh,
                            constraints,
                            top_lvl_tmps,
                        };
                        result = Some(infer.infer_block(decls, trailing, *span));
                    },
                );
                result.unwrap()
            }

            ast::Expr::If(c, t, e, span) => {
                let tc = self.infer_expr(c)?;
                self.push(tc.ty(), Type::bool_(), *span);
                let tt = self.infer_expr(t)?;
                let te = self.infer_expr(e)?;
                self.push(tt.ty(), te.ty(), *span);
                Ok(hir::Expr::If {
                    ty: tt.ty(),
                    cond: Box::new(tc),
                    then_branch: Box::new(tt),
                    else_branch: Box::new(te),
                    span: *span,
                })
            }

            ast::Expr::Match(scrutinee, arms, span) => {
                if arms.is_empty() {
                    return Err(AnalysisError::EmptyMatch { span: *span });
                }
                let t_scrutinee = self.infer_expr(scrutinee)?;
                let mut hir_arms = Vec::with_capacity(arms.len());
                let mut overall_ty = None;
                for arm in arms {
                    let (pat_ty, bindings) = self.infer_pattern(&arm.pattern)?;
                    self.push(t_scrutinee.ty(), pat_ty, arm.span);
                    let env = &mut *self.env;
                    let fresh = &mut *self.fresh;
                    let constraints = &mut *self.constraints;
                    let top_lvl_tmps = self.top_lvl_tmps;
                    let mut result = None;
                    scoped(
                        env,
                        |env| {
                            for (n, t) in &bindings {
                                env.insert(
                                    n.clone(),
                                    Binding {
                                        scheme: TypeScheme::monomorphic(t.clone()),
                                        is_mutable: false,
                                    },
                                );
                            }
                        },
                        |env| {
                            let mut infer = BodyInferrer {
                                env,
                                fresh,
                                constraints,
                                top_lvl_tmps,
                            };
                            result = Some(infer.infer_expr(&arm.body));
                        },
                    );
                    let t_body = result.unwrap()?;
                    match &overall_ty {
                        None => overall_ty = Some(t_body.ty()),
                        Some(first) => self.push(first.clone(), t_body.ty(), arm.span),
                    }
                    hir_arms.push(hir::Arm {
                        pattern: arm.pattern.clone(),
                        body: t_body,
                        span: arm.span,
                    });
                }
                Ok(hir::Expr::Match {
                    ty: overall_ty.unwrap(),
                    scrutinee: Box::new(t_scrutinee),
                    arms: hir_arms,
                    span: *span,
                })
            }

            ast::Expr::BinOp(op, l, r, span) => {
                let tl = self.infer_expr(l)?;
                let tr = self.infer_expr(r)?;
                let ty = match op {
                    ast::BinOpKind::Arith(_) => tl.ty(),
                    ast::BinOpKind::Cmp(_) => Type::bool_(),
                    ast::BinOpKind::Bool(_) => {
                        self.push(tl.ty(), Type::bool_(), *span);
                        self.push(tr.ty(), Type::bool_(), *span);
                        Type::bool_()
                    }
                    ast::BinOpKind::Custom(name) => {
                        let op_ty = self.lookup(name)?;
                        let result = self.fresh.next_type();
                        self.push(
                            op_ty,
                            Type::Func(vec![tl.ty(), tr.ty()], Box::new(result.clone())),
                            *span,
                        );
                        result
                    }
                };
                Ok(hir::Expr::BinOp {
                    op: op.clone(),
                    l: Box::new(tl),
                    r: Box::new(tr),
                    ty,
                    span: *span,
                })
            }

            ast::Expr::UnOp(ast::UnOpKind::Custom(name), e, span) => {
                let te = self.infer_expr(e)?;
                let op_ty = self.lookup(name)?;
                let result = self.fresh.next_type();
                self.push(
                    op_ty,
                    Type::Func(vec![te.ty()], Box::new(result.clone())),
                    *span,
                );
                Ok(hir::Expr::UnOp {
                    op: ast::UnOpKind::Custom(name.clone()),
                    e: Box::new(te),
                    ty: result,
                    span: *span,
                })
            }

            ast::Expr::Call(f, args, span) => {
                let tf = self.infer_expr(f)?;
                let mut targs = Vec::with_capacity(args.len());
                for a in args {
                    targs.push(self.infer_expr(a)?);
                }
                let result = self.fresh.next_type();
                self.push(
                    tf.ty(),
                    Type::Func(targs.iter().map(|t| t.ty()).collect(), Box::new(result.clone())),
                    *span,
                );
                Ok(hir::Expr::Call {
                    func: Box::new(tf),
                    args: targs,
                    ty: result,
                    span: *span,
                })
            }

            ast::Expr::Deref(e, span) => {
                let te = self.infer_expr(e)?;
                let result = self.fresh.next_type();
                self.push(te.ty(), Type::Ptr(Box::new(result.clone())), *span);
                Ok(hir::Expr::Deref {
                    e: Box::new(te),
                    ty: result,
                    span: *span,
                })
            }

            ast::Expr::Ref(e, span) => {
                if !matches!(**e, ast::Expr::Var(_, _)) {
                    return Err(AnalysisError::NonReferencable { span: *span });
                }
                let te = self.infer_expr(e)?;
                let ty = Type::Ptr(Box::new(te.ty()));
                Ok(hir::Expr::Ref {
                    e: Box::new(te),
                    ty,
                    span: *span,
                })
            }

            ast::Expr::Cast(e, ty_annot, span) => {
                let te = self.infer_expr(e)?;
                let tv_map = FxHashMap::default();
                let ty = type_expr_to_type_impl(ty_annot, &tv_map, Some(self.fresh));
                Ok(hir::Expr::Cast {
                    e: Box::new(te),
                    ty,
                    span: *span,
                })
            }

            ast::Expr::SizeOf(ty_annot, span) => {
                let tv_map = FxHashMap::default();
                let target = type_expr_to_type_impl(ty_annot, &tv_map, Some(self.fresh));
                Ok(hir::Expr::SizeOf {
                    target,
                    ty: Type::int32(),
                    span: *span,
                })
            }

            ast::Expr::Closure(_, _, span) => Err(AnalysisError::NotImplemented { span: *span }),

            ast::Expr::While(c, b, span) => {
                let tc = self.infer_expr(c)?;
                self.push(tc.ty(), Type::bool_(), *span);
                let tb = self.infer_expr(b)?;
                Ok(hir::Expr::While {
                    cond: Box::new(tc),
                    body: Box::new(tb),
                    ty: Type::unit(),
                    span: *span,
                })
            }

            ast::Expr::Return(value, span) => {
                let t_value = match value {
                    Some(e) => self.infer_expr(e)?,
                    None => hir::Expr::Lit {
                        lit: ast::Literal::Unit,
                        ty: Type::unit(),
                        span: *span,
                    },
                };
                Ok(hir::Expr::Return {
                    ty: t_value.ty(),
                    value: Box::new(t_value),
                    span: *span,
                })
            }
        }
    }

    /// Infer a block's declarations in order, each one visible to the rest
    /// of the block, then its trailing expression (spec §4.5 "Block").
    fn infer_block(
        &mut self,
        decls: &[ast::Decl],
        trailing: &ast::Expr,
        span: Span,
    ) -> AnalysisResult<hir::Expr> {
        let mut hir_decls = Vec::with_capacity(decls.len());
        for decl in decls {
            match decl {
                ast::Decl::Var {
                    name,
                    is_mutable,
                    annot,
                    init,
                    span: decl_span,
                } => {
                    let t_init = self.infer_expr(init)?;
                    if let Some(annot) = annot {
                        let tv_map = FxHashMap::default();
                        let ann_ty = type_expr_to_type_impl(annot, &tv_map, Some(self.fresh));
                        self.push(t_init.ty(), ann_ty, *decl_span);
                    }
                    self.env.insert(
                        name.clone(),
                        Binding {
                            scheme: TypeScheme::monomorphic(t_init.ty()),
                            is_mutable: *is_mutable,
                        },
                    );
                    hir_decls.push(hir::Decl::Var {
                        name: name.clone(),
                        ty: t_init.ty(),
                        is_mutable: *is_mutable,
                        init: t_init,
                        span: *decl_span,
                    });
                }
                ast::Decl::Expr(e) => {
                    let te = self.infer_expr(e)?;
                    hir_decls.push(hir::Decl::Expr(te));
                }
            }
        }
        let t_trailing = self.infer_expr(trailing)?;
        Ok(hir::Expr::Block {
            decls: hir_decls,
            ty: t_trailing.ty(),
            expr: Box::new(t_trailing),
            span,
        })
    }

    fn check_lvalue(&self, expr: &ast::Expr) -> AnalysisResult<()> {
        match expr {
            ast::Expr::Var(name, span) => {
                if let Some(binding) = self.env.lookup(name) {
                    if binding.is_mutable {
                        Ok(())
                    } else {
                        Err(AnalysisError::ImmutableAssign {
                            name: name.clone(),
                            span: *span,
                        })
                    }
                } else if self.top_lvl_tmps.contains_key(name) {
                    Err(AnalysisError::ImmutableAssign {
                        name: name.clone(),
                        span: *span,
                    })
                } else {
                    Err(AnalysisError::Undefined {
                        name: name.clone(),
                        span: *span,
                    })
                }
            }
            ast::Expr::Deref(_, _) => Ok(()),
            other => Err(AnalysisError::NonLValue { span: other.span() }),
        }
    }

    /// Infer a pattern's type and the bindings it introduces (spec §4.5,
    /// "Pattern inference").
    fn infer_pattern(&mut self, pat: &ast::Pattern) -> AnalysisResult<(Type, Vec<(Name, Type)>)> {
        match pat {
            ast::Pattern::Var(name) => {
                let alpha = self.fresh.next_type();
                Ok((alpha.clone(), vec![(name.clone(), alpha)]))
            }
            ast::Pattern::Wild => Ok((self.fresh.next_type(), Vec::new())),
            ast::Pattern::Lit(lit) => Ok((literal_type(lit), Vec::new())),
            ast::Pattern::Con(ctor, bound) => {
                let tc = self.lookup(ctor)?;
                let beta = self.fresh.next_type();
                if bound.is_empty() {
                    self.push(beta.clone(), tc, Span::DUMMY);
                    Ok((beta, Vec::new()))
                } else {
                    let alphas: Vec<Type> = bound.iter().map(|_| self.fresh.next_type()).collect();
                    self.push(
                        Type::Func(alphas.clone(), Box::new(beta.clone())),
                        tc,
                        Span::DUMMY,
                    );
                    let bindings = bound.iter().cloned().zip(alphas).collect();
                    Ok((beta, bindings))
                }
            }
        }
    }
}
