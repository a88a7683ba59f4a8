//! A hand-built sample program exercised by the `check` subcommand.
//!
//! `quill-sem` takes an already-parsed [`quill_sem::ast::Program`] — lexing
//! and parsing a `.quill` source file is out of scope for this workspace
//! (see DESIGN.md). Until a front end exists upstream, `quillc check` proves
//! out the resolver/inferrer pipeline and the rest of the driver's ambient
//! stack (config, logging) against this embedded AST rather than against
//! arbitrary files.

use quill_sem::ast::*;
use quill_util::{Span, Symbol};

fn sp() -> Span {
    Span::DUMMY
}

fn var(name: &str) -> Expr {
    Expr::Var(Name::Unqualified(Symbol::intern(name)), sp())
}

fn param(name: &str) -> Param {
    Param {
        name: Name::Unqualified(Symbol::intern(name)),
        annot: None,
        span: sp(),
    }
}

/// `fn pow(base, exp) { if exp == 0 { 1 } else { base * pow(base, exp - 1) } }`
pub fn sample_program() -> Program {
    let body = Expr::If(
        Box::new(Expr::BinOp(
            BinOpKind::Cmp(CmpOp::Eq),
            Box::new(var("exp")),
            Box::new(Expr::Lit(Literal::Int(0), sp())),
            sp(),
        )),
        Box::new(Expr::Lit(Literal::Int(1), sp())),
        Box::new(Expr::BinOp(
            BinOpKind::Arith(ArithOp::Mul),
            Box::new(var("base")),
            Box::new(Expr::Call(
                Box::new(var("pow")),
                vec![
                    var("base"),
                    Expr::BinOp(
                        BinOpKind::Arith(ArithOp::Sub),
                        Box::new(var("exp")),
                        Box::new(Expr::Lit(Literal::Int(1), sp())),
                        sp(),
                    ),
                ],
                sp(),
            )),
            sp(),
        )),
        sp(),
    );
    Program {
        modules: vec![Module {
            path: Vec::new(),
            name: Symbol::intern("main"),
            imports: Vec::new(),
            top_levels: vec![TopLevel::Func(TlFunc {
                is_pub: true,
                name: Symbol::intern("pow"),
                params: vec![param("base"), param("exp")],
                ret_annot: None,
                body,
                span: sp(),
            })],
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_program_type_checks() {
        let typed = quill_sem::analyze(sample_program()).expect("sample program should check");
        let quill_sem::hir::TopLevel::Func(f) = &typed.modules[0].top_levels[0] else {
            panic!("expected a function")
        };
        assert_eq!(f.body.ty(), quill_sem::ty::Type::int32());
    }
}
