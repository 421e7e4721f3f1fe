//! Turn a parsed [`crate::ast::Unit`] list into clauses inserted into a [`saturate::Context`].
use std::collections::HashMap;

use saturate_formula::{PredicateId, TermId, TermStore, Var};
use saturate_proof::{Inference, RuleTag};

use saturate::clause::{Clause, ClauseId, InputType};
use saturate::context::Context;

use crate::ast::{self, Role, Unit};
use crate::LoadError;

/// Clauses inserted by [`load`], plus every answer predicate minted while loading FOF
/// conjectures (so a caller can drive conjunctive-goal extraction per predicate afterwards).
pub struct LoadedProblem {
    pub clause_ids: Vec<ClauseId>,
    pub answer_predicates: Vec<PredicateId>,
}

/// Per-unit variable environment: TPTP variables are local to the formula they appear in, so each
/// unit gets a fresh name-to-[`Var`] map, variables numbered in first-appearance order.
#[derive(Default)]
struct VarEnv {
    by_name: HashMap<String, Var>,
}

impl VarEnv {
    fn resolve(&mut self, name: &str) -> Var {
        let next = Var::from_index(self.by_name.len());
        *self.by_name.entry(name.to_owned()).or_insert(next)
    }
}

fn build_term(store: &mut TermStore, env: &mut VarEnv, term: &ast::Term) -> TermId {
    match term {
        ast::Term::Var(name) => {
            let var = env.resolve(name);
            store.mk_var(var)
        }
        ast::Term::App(name, args) => {
            let arg_ids: Vec<TermId> = args.iter().map(|arg| build_term(store, env, arg)).collect();
            let functor = store.signature_mut().declare_function(name, arg_ids.len());
            store.create(functor, arg_ids)
        }
    }
}

fn build_literal(store: &mut TermStore, env: &mut VarEnv, literal: &ast::Literal) -> saturate_formula::Literal {
    match &literal.atom {
        ast::Atom::Equality(lhs, rhs) => {
            let lhs_id = build_term(store, env, lhs);
            let rhs_id = build_term(store, env, rhs);
            store.create_literal(PredicateId::equality(), literal.positive, true, vec![lhs_id, rhs_id])
        }
        ast::Atom::Pred(name, args) => {
            let arg_ids: Vec<TermId> = args.iter().map(|arg| build_term(store, env, arg)).collect();
            let pred = store.signature_mut().declare_predicate(name, arg_ids.len());
            store.create_literal(pred, literal.positive, false, arg_ids)
        }
    }
}

fn build_literals(store: &mut TermStore, literals: &[ast::Literal]) -> Vec<saturate_formula::Literal> {
    let mut env = VarEnv::default();
    literals.iter().map(|lit| build_literal(store, &mut env, lit)).collect()
}

/// Load every parsed unit into `ctx`, inserting one clause per `cnf` unit and one negated-goal
/// clause (carrying a freshly minted, positively-disjoined answer literal) per `fof` conjecture.
pub fn load(ctx: &mut Context, units: &[Unit]) -> Result<LoadedProblem, LoadError> {
    let mut clause_ids = Vec::new();
    let mut answer_predicates = Vec::new();

    for unit in units {
        match unit {
            Unit::Cnf { role, literals, .. } => {
                if *role == Role::Conjecture {
                    return Err(LoadError::UnsupportedCnfConjecture);
                }
                let built = build_literals(&mut ctx.term_store, literals);
                let (input_type, rule) = match role {
                    Role::Axiom => (InputType::Axiom, RuleTag::Axiom),
                    Role::Hypothesis => (InputType::Hypothesis, RuleTag::Input),
                    Role::Assumption => (InputType::Assumption, RuleTag::Input),
                    Role::NegatedConjecture => (InputType::NegatedConjecture, RuleTag::NegatedConjecture),
                    Role::Conjecture => unreachable!(),
                };
                let inference = ctx.proof.record(Inference::new(rule, vec![]));
                let clause = Clause::new(built, input_type, ctx.bdd.falsity(), 0, inference, &ctx.term_store, ctx.config.selection);
                clause_ids.push(ctx.clauses.insert(clause));
            }
            Unit::FofConjecture { vars, literals, .. } => {
                let mut env = VarEnv::default();
                let goal_vars: Vec<Var> = vars.iter().map(|name| env.resolve(name)).collect();
                let goal_literals: Vec<saturate_formula::Literal> =
                    literals.iter().map(|lit| build_literal(&mut ctx.term_store, &mut env, lit)).collect();

                let ans_literal = ctx.answer_manager.inject(&mut ctx.term_store, goal_vars, goal_literals.clone());
                answer_predicates.push(ans_literal.predicate());

                // `~L1, ..., ~Lk, ans(vars)`: the standard answer-extraction clausal form. A
                // refutation must resolve away every `~Li` against the matching axioms, so the
                // only way a clause survives with *just* the (positive) answer literal is by
                // having proved the goal for some substitution of `vars`, which is exactly the
                // capture condition the answer manager checks for.
                let mut clause_literals: Vec<saturate_formula::Literal> = goal_literals.iter().map(|lit| lit.negate()).collect();
                clause_literals.push(ans_literal);

                let inference = ctx.proof.record(Inference::new(RuleTag::NegatedConjecture, vec![]));
                let clause = Clause::new(
                    clause_literals,
                    InputType::NegatedConjecture,
                    ctx.bdd.falsity(),
                    0,
                    inference,
                    &ctx.term_store,
                    ctx.config.selection,
                );
                clause_ids.push(ctx.clauses.insert(clause));
            }
        }
    }

    Ok(LoadedProblem { clause_ids, answer_predicates })
}
