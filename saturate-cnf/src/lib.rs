//! A minimal reader/writer for the restricted TPTP subset used to drive the Saturate prover
//! end-to-end.
//!
//! This is explicitly *not* a TPTP parser: arbitrary boolean connectives, nested quantifiers,
//! Skolemization, `include` directives, SInE selection and sort inference stay out of scope.
//! What is accepted is just enough surface to exercise the saturation loop and answer-literal
//! machinery from a file: `cnf(name, role, (literals)).` annotated clauses and
//! `fof(name, conjecture, ?[Vars]: (L1 & ... & Lk)).` flat existential conjectures.
pub mod ast;
pub mod lexer;
pub mod load;
pub mod parser;
pub mod write;

use thiserror::Error;

pub use ast::Unit;
pub use load::{load, LoadedProblem};
pub use parser::parse;
pub use write::{format_clause, szs_status_line, write_answer_tuple, write_derivation};

/// Errors while tokenizing or parsing a problem file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: unexpected character '{unexpected}'")]
    UnexpectedChar { line: usize, unexpected: char },
    #[error("line {line}: expected {expected}, found {found}")]
    Unexpected { line: usize, found: String, expected: String },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
    #[error("line {line}: unknown formula role '{role}'")]
    UnknownRole { line: usize, role: String },
    #[error("line {line}: unsupported fof role '{role}' (only 'conjecture' is accepted)")]
    UnsupportedFofRole { line: usize, role: String },
    #[error("line {line}: unknown formula kind '{kind}' (only 'cnf' and 'fof' are accepted)")]
    UnknownFormulaKind { line: usize, kind: String },
}

/// Errors while loading a parsed problem into a [`saturate::Context`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("a 'cnf' unit with role 'conjecture' is not supported; use 'negated_conjecture', or a 'fof' conjecture")]
    UnsupportedCnfConjecture,
}

/// Parse and load a complete problem file in one call.
pub fn load_str(ctx: &mut saturate::Context, input: &str) -> Result<LoadedProblem, LoadError> {
    let units = parse(input)?;
    load(ctx, &units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturate::config::SolverConfig;
    use saturate::context::Context;
    use saturate::saturation::{self, Outcome};
    use std::sync::atomic::AtomicBool;

    #[test]
    fn parses_basic_propositional_refutation() {
        let units = parse("cnf(a1, axiom, p).\ncnf(a2, axiom, ~p).\n").unwrap();
        assert_eq!(units.len(), 2);
    }

    #[test]
    fn end_to_end_propositional_refutation() {
        let mut ctx = Context::new(SolverConfig::default());
        let loaded = load_str(&mut ctx, "cnf(a1, axiom, p).\ncnf(a2, axiom, ~p).\n").unwrap();

        let interrupted = AtomicBool::new(false);
        let outcome = saturation::run(&mut ctx, loaded.clause_ids, &interrupted, &|| 0);
        assert!(matches!(outcome, Outcome::Refutation(_)));
    }

    #[test]
    fn end_to_end_equality_refutation() {
        let mut ctx = Context::new(SolverConfig::default());
        let loaded = load_str(
            &mut ctx,
            "cnf(e, axiom, a = b).\ncnf(f, axiom, f(a) != f(b)).\n",
        )
        .unwrap();

        let interrupted = AtomicBool::new(false);
        let outcome = saturation::run(&mut ctx, loaded.clause_ids, &interrupted, &|| 0);
        assert!(matches!(outcome, Outcome::Refutation(_)));
    }

    #[test]
    fn end_to_end_conjunctive_answer_extraction() {
        let mut ctx = Context::new(SolverConfig::default());
        let loaded = load_str(
            &mut ctx,
            "fof(a, axiom, p(c)).\nfof(b, axiom, q(c)).\nfof(g, conjecture, ?[X]: (p(X) & q(X))).\n",
        )
        .unwrap();

        let interrupted = AtomicBool::new(false);
        let outcome = saturation::run(&mut ctx, loaded.clause_ids, &interrupted, &|| 0);
        let refutation = match outcome {
            Outcome::Refutation(id) => id,
            other => panic!("expected a refutation, got {:?}", other),
        };

        let inference = ctx.clauses.get(refutation).inference;
        let predicate = loaded.answer_predicates[0];
        let answer = ctx
            .answer_manager
            .conjunctive_extraction(&mut ctx.term_store, &ctx.proof, &ctx.clauses, inference, predicate);
        assert!(answer.is_some());
    }
}
