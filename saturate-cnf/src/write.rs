//! TPTP-style derivation, SZS status and answer-tuple output.
use std::collections::HashSet;
use std::io::{self, Write};

use saturate_formula::{Literal, TermId, TermStore};
use saturate_proof::{InferenceStore, UnitId};

use saturate::clause::{ClauseId, InputType};
use saturate::context::Context;

fn role_name(input_type: InputType) -> &'static str {
    match input_type {
        InputType::Axiom => "axiom",
        InputType::Hypothesis => "hypothesis",
        InputType::Assumption => "assumption",
        InputType::Conjecture => "conjecture",
        InputType::NegatedConjecture => "negated_conjecture",
    }
}

fn format_literal(store: &TermStore, lit: Literal) -> String {
    if lit.is_equality() {
        let args = lit.args(store);
        let op = if lit.is_positive() { "=" } else { "!=" };
        format!("{} {} {}", store.display(args[0]), op, store.display(args[1]))
    } else {
        let name = store.signature().predicate_name(lit.predicate());
        let args = lit.args(store);
        let atom = if args.is_empty() {
            name.to_owned()
        } else {
            let rendered: Vec<String> = args.iter().map(|&a| store.display(a)).collect();
            format!("{}({})", name, rendered.join(","))
        };
        if lit.is_positive() {
            atom
        } else {
            format!("~{}", atom)
        }
    }
}

/// Render a clause's literal multiset as a TPTP disjunction, `$false` for the empty clause.
pub fn format_clause(store: &TermStore, literals: &[Literal]) -> String {
    if literals.is_empty() {
        "$false".to_owned()
    } else {
        literals.iter().map(|&lit| format_literal(store, lit)).collect::<Vec<_>>().join(" | ")
    }
}

/// Parents-before-children order over the ancestors of `root`, so every printed derivation line
/// only references names already printed above it.
fn topological_order(proof: &InferenceStore, root: UnitId) -> Vec<UnitId> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![(root, false)];
    while let Some((unit, expanded)) = stack.pop() {
        if expanded {
            order.push(unit);
            continue;
        }
        if !visited.insert(unit) {
            continue;
        }
        stack.push((unit, true));
        for &parent in proof.parents(unit) {
            stack.push((parent, false));
        }
    }
    order
}

/// Write the full TPTP derivation leading to `refutation`: one `cnf(...)` line per proof-relevant
/// unit, parents printed before children
pub fn write_derivation(out: &mut dyn Write, ctx: &Context, refutation: ClauseId) -> io::Result<()> {
    let refutation_clause = ctx.clauses.get(refutation);
    let order = topological_order(&ctx.proof, refutation_clause.inference);

    for unit in order {
        let id = match ctx.clauses.by_inference(unit) {
            Some(id) => id,
            None => continue,
        };
        let clause = ctx.clauses.get(id);
        let name = format!("u{}", unit.index());
        let formula = format_clause(&ctx.term_store, &clause.literals);
        let rule = ctx.proof.rule(unit).expect("every printed unit is recorded");

        if rule.is_leaf_rule() {
            writeln!(out, "cnf({},{},({})).", name, role_name(clause.input_type), formula)?;
        } else {
            let parent_names: Vec<String> = ctx.proof.parents(unit).iter().map(|p| format!("u{}", p.index())).collect();
            writeln!(
                out,
                "cnf({},plain,({}),inference({},[status(thm)],[{}])).",
                name,
                formula,
                rule.tptp_name(),
                parent_names.join(",")
            )?;
        }
    }
    Ok(())
}

/// `% SZS answers Tuple [[t1,...,tn]|_] for <problem>`
pub fn write_answer_tuple(out: &mut dyn Write, store: &TermStore, problem_name: &str, terms: &[TermId]) -> io::Result<()> {
    let rendered: Vec<String> = terms.iter().map(|&t| store.display(t)).collect();
    writeln!(out, "% SZS answers Tuple [[{}]|_] for {}", rendered.join(","), problem_name)
}

/// `% SZS status <status> for <problem>`.
pub fn szs_status_line(problem_name: &str, status: &str) -> String {
    format!("% SZS status {} for {}", status, problem_name)
}
