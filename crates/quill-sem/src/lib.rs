//! quill-sem - the semantic core of the quill compiler: name resolution
//! and Hindley-Milner type inference.
//!
//! This crate owns exactly two passes, run in order by [`analyze`]:
//!
//! 1. [`resolver::Resolver`] rewrites every unqualified identifier in the
//!    input tree into the fully-qualified name it refers to.
//! 2. [`infer::Inferrer`] walks the resolved tree generating equality
//!    constraints, then discharges them with [`constraint::solve`] to
//!    produce a fully typed tree.
//!
//! Lexing, parsing, dependency-cycle checking between modules, and code
//! generation all live upstream or downstream of this crate.

pub mod ast;
pub mod constraint;
pub mod env;
pub mod error;
pub mod hir;
pub mod infer;
pub mod name;
pub mod resolver;
pub mod ty;
pub mod unify;

pub use error::{AnalysisError, AnalysisResult};

/// Resolve names and infer types for a whole program.
pub fn analyze(mut program: ast::Program) -> AnalysisResult<hir::Program> {
    resolver::Resolver::new().resolve_program(&mut program)?;
    infer::Inferrer::new().infer_program(&program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use quill_util::{Span, Symbol};

    fn sp() -> Span {
        Span::DUMMY
    }

    fn module(top_levels: Vec<TopLevel>) -> Program {
        Program {
            modules: vec![Module {
                path: Vec::new(),
                name: Symbol::intern("main"),
                imports: Vec::new(),
                top_levels,
            }],
        }
    }

    fn tfunc(name: &str, is_pub: bool, params: Vec<Param>, body: Expr) -> TopLevel {
        TopLevel::Func(TlFunc {
            is_pub,
            name: Symbol::intern(name),
            params,
            ret_annot: None,
            body,
            span: sp(),
        })
    }

    fn param(name: &str) -> Param {
        Param {
            name: Name::Unqualified(Symbol::intern(name)),
            annot: None,
            span: sp(),
        }
    }

    fn var(name: &str) -> Expr {
        Expr::Var(Name::Unqualified(Symbol::intern(name)), sp())
    }

    /// An ordinary recursive function (not the spec's S1 operator scenario,
    /// see `power_operator_with_mutable_state_and_while_loop` below) type-checks
    /// and infers a consistent Int32 result.
    #[test]
    fn recursive_function_infers_consistent_type() {
        // fn pow(base, exp) { if exp == 0 { 1 } else { base * pow(base, exp - 1) } }
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
        let program = module(vec![tfunc(
            "pow",
            true,
            vec![param("base"), param("exp")],
            body,
        )]);
        let typed = analyze(program).expect("pow should type-check");
        let hir::TopLevel::Func(f) = &typed.modules[0].top_levels[0] else {
            panic!("expected a function")
        };
        assert_eq!(f.body.ty(), crate::ty::Type::int32());
    }

    /// Scenario: assigning to an immutable binding is rejected.
    #[test]
    fn assigning_to_immutable_binding_is_rejected() {
        let body = Expr::Block(
            vec![Decl::Var {
                name: Name::Unqualified(Symbol::intern("x")),
                is_mutable: false,
                annot: None,
                init: Expr::Lit(Literal::Int(1), sp()),
                span: sp(),
            }],
            Box::new(Expr::Assign(
                Box::new(var("x")),
                Box::new(Expr::Lit(Literal::Int(2), sp())),
                sp(),
            )),
            sp(),
        );
        let program = module(vec![tfunc("main", true, vec![], body)]);
        let err = analyze(program).unwrap_err();
        assert!(matches!(err, AnalysisError::ImmutableAssign { .. }));
    }

    /// Scenario: mutating through a mutable local and reading it back.
    #[test]
    fn mutable_binding_can_be_reassigned() {
        let body = Expr::Block(
            vec![Decl::Var {
                name: Name::Unqualified(Symbol::intern("x")),
                is_mutable: true,
                annot: None,
                init: Expr::Lit(Literal::Int(1), sp()),
                span: sp(),
            }],
            Box::new(Expr::Assign(
                Box::new(var("x")),
                Box::new(Expr::Lit(Literal::Int(2), sp())),
                sp(),
            )),
            sp(),
        );
        let program = module(vec![tfunc("main", true, vec![], body)]);
        let typed = analyze(program).expect("reassignment should type-check");
        let hir::TopLevel::Func(f) = &typed.modules[0].top_levels[0] else {
            panic!("expected a function")
        };
        assert_eq!(f.body.ty(), crate::ty::Type::int32());
    }

    /// Scenario: `&e` is rejected unless `e` is a plain variable.
    #[test]
    fn reference_to_non_variable_is_rejected() {
        let body = Expr::Ref(Box::new(Expr::Lit(Literal::Int(1), sp())), sp());
        let program = module(vec![tfunc("main", true, vec![], body)]);
        let err = analyze(program).unwrap_err();
        assert!(matches!(err, AnalysisError::NonReferencable { .. }));
    }

    /// Scenario: a match with no arms is rejected outright.
    #[test]
    fn empty_match_is_rejected() {
        let body = Expr::Match(Box::new(Expr::Lit(Literal::Int(1), sp())), vec![], sp());
        let program = module(vec![tfunc("main", true, vec![], body)]);
        let err = analyze(program).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyMatch { .. }));
    }

    /// Scenario S5 (spec §8): mutual recursion type-checks regardless of
    /// declaration order.
    #[test]
    fn mutual_recursion_type_checks() {
        // fn even(n) { if n == 0 { true } else { odd(n - 1) } }
        // fn odd(n)  { if n == 0 { false } else { even(n - 1) } }
        fn dec_call(callee: &str) -> Expr {
            Expr::Call(
                Box::new(var(callee)),
                vec![Expr::BinOp(
                    BinOpKind::Arith(ArithOp::Sub),
                    Box::new(var("n")),
                    Box::new(Expr::Lit(Literal::Int(1), sp())),
                    sp(),
                )],
                sp(),
            )
        }
        fn branch(base_case: bool, callee: &str) -> Expr {
            Expr::If(
                Box::new(Expr::BinOp(
                    BinOpKind::Cmp(CmpOp::Eq),
                    Box::new(var("n")),
                    Box::new(Expr::Lit(Literal::Int(0), sp())),
                    sp(),
                )),
                Box::new(Expr::Lit(Literal::Bool(base_case), sp())),
                Box::new(dec_call(callee)),
                sp(),
            )
        }
        let program = module(vec![
            tfunc("even", true, vec![param("n")], branch(true, "odd")),
            tfunc("odd", true, vec![param("n")], branch(false, "even")),
        ]);
        let typed = analyze(program).expect("mutual recursion should type-check");
        for tl in &typed.modules[0].top_levels {
            let hir::TopLevel::Func(f) = tl else {
                panic!("expected a function")
            };
            assert_eq!(f.body.ty(), crate::ty::Type::bool_());
        }
    }

    /// Scenario S1 (spec §8): a user-declared infix operator with mutable
    /// local state and a `while` loop type-checks, and `main` calling it
    /// with Int32 arguments yields an Int32 result.
    ///
    /// ```text
    /// op infixr 10 ** (base: i32, exp: i32) {
    ///     mut res := 1; mut e2 := exp;
    ///     while e2 > 0 { res = res * base; e2 = e2 - 1; };
    ///     res
    /// };
    /// fn main() { 2 ** 12; };
    /// ```
    #[test]
    fn power_operator_with_mutable_state_and_while_loop() {
        let res = Name::Unqualified(Symbol::intern("res"));
        let e2 = Name::Unqualified(Symbol::intern("e2"));

        let while_body = Expr::Block(
            vec![
                Decl::Expr(Expr::Assign(
                    Box::new(var("res")),
                    Box::new(Expr::BinOp(
                        BinOpKind::Arith(ArithOp::Mul),
                        Box::new(var("res")),
                        Box::new(var("base")),
                        sp(),
                    )),
                    sp(),
                )),
                Decl::Expr(Expr::Assign(
                    Box::new(var("e2")),
                    Box::new(Expr::BinOp(
                        BinOpKind::Arith(ArithOp::Sub),
                        Box::new(var("e2")),
                        Box::new(Expr::Lit(Literal::Int(1), sp())),
                        sp(),
                    )),
                    sp(),
                )),
            ],
            Box::new(Expr::Lit(Literal::Unit, sp())),
            sp(),
        );

        let op_body = Expr::Block(
            vec![
                Decl::Var {
                    name: res,
                    is_mutable: true,
                    annot: None,
                    init: Expr::Lit(Literal::Int(1), sp()),
                    span: sp(),
                },
                Decl::Var {
                    name: e2,
                    is_mutable: true,
                    annot: None,
                    init: var("exp"),
                    span: sp(),
                },
                Decl::Expr(Expr::While(
                    Box::new(Expr::BinOp(
                        BinOpKind::Cmp(CmpOp::Gt),
                        Box::new(var("e2")),
                        Box::new(Expr::Lit(Literal::Int(0), sp())),
                        sp(),
                    )),
                    Box::new(while_body),
                    sp(),
                )),
            ],
            Box::new(var("res")),
            sp(),
        );

        let op = TopLevel::Oper(TlOper {
            is_pub: true,
            op_def: OpDef {
                assoc: Assoc::Right,
                precedence: 10,
            },
            symbol: Symbol::intern("**"),
            params: vec![param("base"), param("exp")],
            ret_annot: None,
            body: op_body,
            span: sp(),
        });

        let call_op = Expr::BinOp(
            BinOpKind::Custom(Name::Unqualified(Symbol::intern("**"))),
            Box::new(Expr::Lit(Literal::Int(2), sp())),
            Box::new(Expr::Lit(Literal::Int(12), sp())),
            sp(),
        );
        let main = tfunc("main", true, vec![], call_op);

        let program = module(vec![op, main]);
        let typed = analyze(program).expect("power operator should type-check");

        let hir::TopLevel::Func(op_fn) = &typed.modules[0].top_levels[0] else {
            panic!("expected the operator to lower to a function")
        };
        assert_eq!(op_fn.body.ty(), crate::ty::Type::int32());
    }
}
