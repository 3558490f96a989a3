//! Expression tree for the result operation chain.
//!
//! The chain is folded into an [`Expr`] first and rendered to C++ in one
//! pass afterwards, so the folding can be tested apart from formatting.

use std::fmt;

use torchgen_domain::{Argument, Computation, Literal, ResultSettings};

/// Name of the network output variable in the handler skeleton.
pub const OUTPUT_SYMBOL: &str = "output";

/// A C++ expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A variable reference.
    Symbol(String),
    /// A literal argument value.
    Literal(Literal),
    /// A function call.
    Call {
        /// Called function.
        function: String,
        /// Positional arguments.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// A variable reference.
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// A call of `function` with `args`.
    #[must_use]
    pub fn call(function: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            function: function.into(),
            args,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(name) => f.write_str(name),
            Self::Literal(literal) => f.write_str(&literal.to_source()),
            Self::Call { function, args } => {
                write!(f, "{function}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Left-folds `operations` over `base`.
///
/// Step `i` calls `operations[i]` with the previous expression first, then
/// the literals of `arguments[i]` if that position exists.
#[must_use]
pub fn fold_chain(base: Expr, operations: &[String], arguments: Option<&[Argument]>) -> Expr {
    operations
        .iter()
        .enumerate()
        .fold(base, |previous, (i, operation)| {
            let mut args = vec![previous];
            if let Some(argument) = arguments.and_then(|arguments| arguments.get(i)) {
                args.extend(argument.literals().iter().cloned().map(Expr::Literal));
            }
            Expr::call(operation.as_str(), args)
        })
}

/// Renders the expression producing the result, empty without a result.
#[must_use]
pub fn result_expression(result: Option<&ResultSettings>) -> String {
    let Some(result) = result else {
        return String::new();
    };
    match &result.computation {
        Computation::Code { code } => code.clone(),
        Computation::Chain {
            operations,
            arguments,
        } => fold_chain(
            Expr::symbol(OUTPUT_SYMBOL),
            operations,
            arguments.as_deref(),
        )
        .to_string(),
    }
}
