//! The typed output tree: the same shape as [`crate::ast`], but every
//! expression node carries a concrete [`Type`] and every name is
//! fully [`Name::Qualified`] (spec §3 invariants, §6 output).

use crate::ast::{self, Literal, OpDef};
use crate::name::Name;
use crate::ty::{Substitutable, Substitution, Type};
use quill_util::{Span, Symbol};

#[derive(Clone, Debug, PartialEq)]
pub enum Decl {
    Var {
        name: Name,
        ty: Type,
        is_mutable: bool,
        init: Expr,
        span: Span,
    },
    Expr(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Arm {
    pub pattern: ast::Pattern,
    pub body: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Lit {
        lit: Literal,
        ty: Type,
        span: Span,
    },
    Var {
        name: Name,
        ty: Type,
        span: Span,
    },
    Assign {
        l: Box<Expr>,
        r: Box<Expr>,
        ty: Type,
        span: Span,
    },
    Block {
        decls: Vec<Decl>,
        expr: Box<Expr>,
        ty: Type,
        span: Span,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        ty: Type,
        span: Span,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<Arm>,
        ty: Type,
        span: Span,
    },
    BinOp {
        op: ast::BinOpKind,
        l: Box<Expr>,
        r: Box<Expr>,
        ty: Type,
        span: Span,
    },
    UnOp {
        op: ast::UnOpKind,
        e: Box<Expr>,
        ty: Type,
        span: Span,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        ty: Type,
        span: Span,
    },
    Deref {
        e: Box<Expr>,
        ty: Type,
        span: Span,
    },
    Ref {
        e: Box<Expr>,
        ty: Type,
        span: Span,
    },
    Cast {
        e: Box<Expr>,
        ty: Type,
        span: Span,
    },
    SizeOf {
        target: Type,
        ty: Type,
        span: Span,
    },
    While {
        cond: Box<Expr>,
        body: Box<Expr>,
        ty: Type,
        span: Span,
    },
    Return {
        value: Box<Expr>,
        ty: Type,
        span: Span,
    },
}

impl Expr {
    pub fn ty(&self) -> Type {
        match self {
            Expr::Lit { ty, .. }
            | Expr::Var { ty, .. }
            | Expr::Assign { ty, .. }
            | Expr::Block { ty, .. }
            | Expr::If { ty, .. }
            | Expr::Match { ty, .. }
            | Expr::BinOp { ty, .. }
            | Expr::UnOp { ty, .. }
            | Expr::Call { ty, .. }
            | Expr::Deref { ty, .. }
            | Expr::Ref { ty, .. }
            | Expr::Cast { ty, .. }
            | Expr::SizeOf { ty, .. }
            | Expr::While { ty, .. }
            | Expr::Return { ty, .. } => ty.clone(),
        }
    }
}

impl Substitutable for Expr {
    fn apply(&self, sub: &Substitution) -> Self {
        match self {
            Expr::Lit { lit, ty, span } => Expr::Lit {
                lit: lit.clone(),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::Var { name, ty, span } => Expr::Var {
                name: name.clone(),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::Assign { l, r, ty, span } => Expr::Assign {
                l: Box::new(l.apply(sub)),
                r: Box::new(r.apply(sub)),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::Block {
                decls,
                expr,
                ty,
                span,
            } => Expr::Block {
                decls: decls.iter().map(|d| d.apply(sub)).collect(),
                expr: Box::new(expr.apply(sub)),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::If {
                cond,
                then_branch,
                else_branch,
                ty,
                span,
            } => Expr::If {
                cond: Box::new(cond.apply(sub)),
                then_branch: Box::new(then_branch.apply(sub)),
                else_branch: Box::new(else_branch.apply(sub)),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::Match {
                scrutinee,
                arms,
                ty,
                span,
            } => Expr::Match {
                scrutinee: Box::new(scrutinee.apply(sub)),
                arms: arms.iter().map(|a| a.apply(sub)).collect(),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::BinOp { op, l, r, ty, span } => Expr::BinOp {
                op: op.clone(),
                l: Box::new(l.apply(sub)),
                r: Box::new(r.apply(sub)),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::UnOp { op, e, ty, span } => Expr::UnOp {
                op: op.clone(),
                e: Box::new(e.apply(sub)),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::Call {
                func,
                args,
                ty,
                span,
            } => Expr::Call {
                func: Box::new(func.apply(sub)),
                args: args.iter().map(|a| a.apply(sub)).collect(),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::Deref { e, ty, span } => Expr::Deref {
                e: Box::new(e.apply(sub)),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::Ref { e, ty, span } => Expr::Ref {
                e: Box::new(e.apply(sub)),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::Cast { e, ty, span } => Expr::Cast {
                e: Box::new(e.apply(sub)),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::SizeOf { target, ty, span } => Expr::SizeOf {
                target: target.apply(sub),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::While {
                cond,
                body,
                ty,
                span,
            } => Expr::While {
                cond: Box::new(cond.apply(sub)),
                body: Box::new(body.apply(sub)),
                ty: ty.apply(sub),
                span: *span,
            },
            Expr::Return { value, ty, span } => Expr::Return {
                value: Box::new(value.apply(sub)),
                ty: ty.apply(sub),
                span: *span,
            },
        }
    }

    fn tvs(&self) -> quill_util::FxHashSet<crate::ty::TV> {
        self.ty().tvs()
    }
}

impl Substitutable for Decl {
    fn apply(&self, sub: &Substitution) -> Self {
        match self {
            Decl::Var {
                name,
                ty,
                is_mutable,
                init,
                span,
            } => Decl::Var {
                name: name.clone(),
                ty: ty.apply(sub),
                is_mutable: *is_mutable,
                init: init.apply(sub),
                span: *span,
            },
            Decl::Expr(e) => Decl::Expr(e.apply(sub)),
        }
    }

    fn tvs(&self) -> quill_util::FxHashSet<crate::ty::TV> {
        match self {
            Decl::Var { ty, init, .. } => {
                let mut s = ty.tvs();
                s.extend(init.tvs());
                s
            }
            Decl::Expr(e) => e.tvs(),
        }
    }
}

impl Substitutable for Arm {
    fn apply(&self, sub: &Substitution) -> Self {
        Arm {
            pattern: self.pattern.clone(),
            body: self.body.apply(sub),
            span: self.span,
        }
    }

    fn tvs(&self) -> quill_util::FxHashSet<crate::ty::TV> {
        self.body.tvs()
    }
}

/// Collect the type of every `return` expression reachable from `expr`
/// without crossing into a nested function (spec §4.5 step 5: return-type
/// agreement). Closures are the only nested-function boundary in this
/// grammar, and they are rejected before reaching typed form.
pub fn collect_return_types(expr: &Expr, out: &mut Vec<Type>) {
    if let Expr::Return { value, .. } = expr {
        out.push(value.ty());
    }
    match expr {
        Expr::Lit { .. } | Expr::Var { .. } => {}
        Expr::Assign { l, r, .. } => {
            collect_return_types(l, out);
            collect_return_types(r, out);
        }
        Expr::Block { decls, expr, .. } => {
            for d in decls {
                match d {
                    Decl::Var { init, .. } => collect_return_types(init, out),
                    Decl::Expr(e) => collect_return_types(e, out),
                }
            }
            collect_return_types(expr, out);
        }
        Expr::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            collect_return_types(cond, out);
            collect_return_types(then_branch, out);
            collect_return_types(else_branch, out);
        }
        Expr::Match {
            scrutinee, arms, ..
        } => {
            collect_return_types(scrutinee, out);
            for arm in arms {
                collect_return_types(&arm.body, out);
            }
        }
        Expr::BinOp { l, r, .. } => {
            collect_return_types(l, out);
            collect_return_types(r, out);
        }
        Expr::UnOp { e, .. } => collect_return_types(e, out),
        Expr::Call { func, args, .. } => {
            collect_return_types(func, out);
            for a in args {
                collect_return_types(a, out);
            }
        }
        Expr::Deref { e, .. } | Expr::Ref { e, .. } | Expr::Cast { e, .. } => {
            collect_return_types(e, out)
        }
        Expr::SizeOf { .. } => {}
        Expr::While { cond, body, .. } => {
            collect_return_types(cond, out);
            collect_return_types(body, out);
        }
        Expr::Return { value, .. } => collect_return_types(value, out),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FnItem {
    pub name: Name,
    pub is_pub: bool,
    pub op_def: Option<OpDef>,
    pub params: Vec<(Name, Type)>,
    pub ret_type: Type,
    pub body: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeItem {
    pub name: Name,
    pub is_pub: bool,
    pub type_params: Vec<Symbol>,
    pub constructors: Vec<(Name, Vec<Type>)>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExternItem {
    pub name: Name,
    pub param_types: Vec<Type>,
    pub ret_type: Type,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TopLevel {
    Func(FnItem),
    Type(TypeItem),
    Extern(ExternItem),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    pub path: Vec<Symbol>,
    pub name: Symbol,
    pub top_levels: Vec<TopLevel>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub modules: Vec<Module>,
}

pub fn apply_sub_program(program: &Program, sub: &Substitution) -> Program {
    Program {
        modules: program
            .modules
            .iter()
            .map(|m| Module {
                path: m.path.clone(),
                name: m.name,
                top_levels: m.top_levels.iter().map(|tl| apply_sub_tl(tl, sub)).collect(),
            })
            .collect(),
    }
}

fn apply_sub_tl(tl: &TopLevel, sub: &Substitution) -> TopLevel {
    match tl {
        TopLevel::Func(f) => TopLevel::Func(FnItem {
            name: f.name.clone(),
            is_pub: f.is_pub,
            op_def: f.op_def.clone(),
            params: f
                .params
                .iter()
                .map(|(n, t)| (n.clone(), t.apply(sub)))
                .collect(),
            ret_type: f.ret_type.apply(sub),
            body: f.body.apply(sub),
            span: f.span,
        }),
        TopLevel::Type(t) => TopLevel::Type(TypeItem {
            name: t.name.clone(),
            is_pub: t.is_pub,
            type_params: t.type_params.clone(),
            constructors: t
                .constructors
                .iter()
                .map(|(n, args)| (n.clone(), args.apply(sub)))
                .collect(),
            span: t.span,
        }),
        TopLevel::Extern(e) => TopLevel::Extern(ExternItem {
            name: e.name.clone(),
            param_types: e.param_types.apply(sub),
            ret_type: e.ret_type.apply(sub),
            span: e.span,
        }),
    }
}
