use rustpython_ast::{self as ast, Expr, Stmt};

/// Skip reason attached to callables that cannot be invoked without values.
pub const REQUIRES_ARGUMENTS: &str = "requires arguments";

/// Whether a discovered callable can be invoked with zero arguments.
///
/// The inspector never synthesizes values for required parameters: wrong
/// synthetic values could mask real bugs or trigger unrelated side effects,
/// so anything that demands a value is classified ineligible instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// The callable can be invoked as `f()`.
    Eligible,
    /// The callable demands at least one value; carries the skip reason.
    Ineligible { reason: String },
}

impl Eligibility {
    /// Returns true if the callable will be invoked.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Classifies a function's parameter list.
///
/// Policy:
/// - zero declared parameters → eligible;
/// - every positional (incl. positional-only) and keyword-only parameter
///   carries a default → eligible;
/// - any parameter without a default → ineligible ("requires arguments").
///
/// `*args` / `**kwargs` demand nothing by themselves, so they never make a
/// function ineligible.
pub fn classify(args: &ast::Arguments) -> Eligibility {
    let needs_value = args
        .posonlyargs
        .iter()
        .chain(args.args.iter())
        .chain(args.kwonlyargs.iter())
        .any(|arg| arg.default.is_none());

    if needs_value {
        Eligibility::Ineligible {
            reason: REQUIRES_ARGUMENTS.to_string(),
        }
    } else {
        Eligibility::Eligible
    }
}

/// Detects whether a function body makes the function a generator factory.
///
/// A generator factory is still eligible: calling it only constructs the
/// generator, the body does not run and the produced sequence is never
/// consumed by the runner. The flag is recorded so reports can show that
/// only the call itself was exercised.
///
/// `yield` inside a nested `def`, `lambda`, or class body belongs to that
/// inner scope, so the walk does not descend into them.
pub fn is_generator(body: &[Stmt]) -> bool {
    body.iter().any(stmt_yields)
}

fn stmt_yields(stmt: &Stmt) -> bool {
    match stmt {
        // Nested scopes own their yields.
        Stmt::FunctionDef(_) | Stmt::AsyncFunctionDef(_) | Stmt::ClassDef(_) => false,
        Stmt::Expr(node) => expr_yields(&node.value),
        Stmt::Assign(node) => expr_yields(&node.value),
        Stmt::AugAssign(node) => expr_yields(&node.value),
        Stmt::AnnAssign(node) => node.value.as_deref().map_or(false, expr_yields),
        Stmt::Return(node) => node.value.as_deref().map_or(false, expr_yields),
        Stmt::If(node) => {
            expr_yields(&node.test)
                || node.body.iter().any(stmt_yields)
                || node.orelse.iter().any(stmt_yields)
        }
        Stmt::For(node) => {
            expr_yields(&node.iter)
                || node.body.iter().any(stmt_yields)
                || node.orelse.iter().any(stmt_yields)
        }
        Stmt::AsyncFor(node) => {
            expr_yields(&node.iter)
                || node.body.iter().any(stmt_yields)
                || node.orelse.iter().any(stmt_yields)
        }
        Stmt::While(node) => {
            expr_yields(&node.test)
                || node.body.iter().any(stmt_yields)
                || node.orelse.iter().any(stmt_yields)
        }
        Stmt::With(node) => {
            node.items.iter().any(|item| expr_yields(&item.context_expr))
                || node.body.iter().any(stmt_yields)
        }
        Stmt::AsyncWith(node) => {
            node.items.iter().any(|item| expr_yields(&item.context_expr))
                || node.body.iter().any(stmt_yields)
        }
        Stmt::Try(node) => {
            node.body.iter().any(stmt_yields)
                || node.handlers.iter().any(|handler| {
                    let ast::ExceptHandler::ExceptHandler(handler_node) = handler;
                    handler_node.body.iter().any(stmt_yields)
                })
                || node.orelse.iter().any(stmt_yields)
                || node.finalbody.iter().any(stmt_yields)
        }
        Stmt::TryStar(node) => {
            node.body.iter().any(stmt_yields)
                || node.handlers.iter().any(|handler| {
                    let ast::ExceptHandler::ExceptHandler(handler_node) = handler;
                    handler_node.body.iter().any(stmt_yields)
                })
                || node.orelse.iter().any(stmt_yields)
                || node.finalbody.iter().any(stmt_yields)
        }
        _ => false,
    }
}

fn expr_yields(expr: &Expr) -> bool {
    match expr {
        Expr::Yield(_) | Expr::YieldFrom(_) => true,
        // Lambdas own their scope; comprehensions cannot contain yield.
        Expr::Lambda(_) => false,
        Expr::BoolOp(node) => node.values.iter().any(expr_yields),
        Expr::BinOp(node) => expr_yields(&node.left) || expr_yields(&node.right),
        Expr::UnaryOp(node) => expr_yields(&node.operand),
        Expr::IfExp(node) => {
            expr_yields(&node.test) || expr_yields(&node.body) || expr_yields(&node.orelse)
        }
        Expr::Dict(node) => {
            node.keys
                .iter()
                .any(|key| key.as_ref().map_or(false, expr_yields))
                || node.values.iter().any(expr_yields)
        }
        Expr::Set(node) => node.elts.iter().any(expr_yields),
        Expr::List(node) => node.elts.iter().any(expr_yields),
        Expr::Tuple(node) => node.elts.iter().any(expr_yields),
        Expr::Compare(node) => {
            expr_yields(&node.left) || node.comparators.iter().any(expr_yields)
        }
        Expr::Call(node) => {
            expr_yields(&node.func)
                || node.args.iter().any(expr_yields)
                || node.keywords.iter().any(|keyword| expr_yields(&keyword.value))
        }
        Expr::Attribute(node) => expr_yields(&node.value),
        Expr::Subscript(node) => expr_yields(&node.value) || expr_yields(&node.slice),
        Expr::Starred(node) => expr_yields(&node.value),
        Expr::Await(node) => expr_yields(&node.value),
        Expr::NamedExpr(node) => expr_yields(&node.value),
        Expr::FormattedValue(node) => expr_yields(&node.value),
        Expr::JoinedStr(node) => node.values.iter().any(expr_yields),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustpython_parser::{parse, Mode};

    /// Parses `source` and returns the first top-level function definition.
    fn first_function(source: &str) -> ast::StmtFunctionDef {
        let tree = parse(source, Mode::Module, "test.py").expect("Failed to parse");
        if let ast::Mod::Module(module) = tree {
            for stmt in module.body {
                if let Stmt::FunctionDef(node) = stmt {
                    return node;
                }
            }
        }
        panic!("No function definition in source");
    }

    #[test]
    fn test_zero_parameters_is_eligible() {
        let func = first_function("def f(): pass");
        assert_eq!(classify(&func.args), Eligibility::Eligible);
    }

    #[test]
    fn test_all_defaults_is_eligible() {
        let func = first_function("def f(a=1, b='x', *, c=None): pass");
        assert_eq!(classify(&func.args), Eligibility::Eligible);
    }

    #[test]
    fn test_required_positional_is_ineligible() {
        let func = first_function("def f(x): return x");
        assert_eq!(
            classify(&func.args),
            Eligibility::Ineligible {
                reason: REQUIRES_ARGUMENTS.to_string()
            }
        );
    }

    #[test]
    fn test_required_keyword_only_is_ineligible() {
        let func = first_function("def f(*, key): return key");
        assert!(!classify(&func.args).is_eligible());
    }

    #[test]
    fn test_positional_only_without_default_is_ineligible() {
        let func = first_function("def f(a, /): return a");
        assert!(!classify(&func.args).is_eligible());
    }

    #[test]
    fn test_variadics_alone_are_eligible() {
        let func = first_function("def f(*args, **kwargs): pass");
        assert_eq!(classify(&func.args), Eligibility::Eligible);
    }

    #[test]
    fn test_variadics_with_required_positional_is_ineligible() {
        let func = first_function("def f(x, *args): pass");
        assert!(!classify(&func.args).is_eligible());
    }

    #[test]
    fn test_generator_detection() {
        let func = first_function("def f():\n    yield 1\n");
        assert!(is_generator(&func.body));

        let func = first_function("def f():\n    for i in range(3):\n        yield i\n");
        assert!(is_generator(&func.body));

        let func = first_function("def f():\n    yield from range(3)\n");
        assert!(is_generator(&func.body));
    }

    #[test]
    fn test_plain_function_is_not_generator() {
        let func = first_function("def f():\n    return [1, 2, 3]\n");
        assert!(!is_generator(&func.body));
    }

    #[test]
    fn test_nested_def_yield_is_not_generator() {
        let source = r#"
def f():
    def inner():
        yield 1
    return inner
"#;
        let func = first_function(source);
        assert!(!is_generator(&func.body));
    }
}
