use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use env_logger::{fmt, Builder, Target};
use log::{error, info, Level, LevelFilter, Record};

use saturate::clause::ClauseId;
use saturate::config::SolverConfig;
use saturate::context::Context;
use saturate::ordering::TermOrdering;
use saturate::saturation::{self, Outcome};
use saturate::selection::SelectionFunction;
use saturate::statistics::LimitReason;

/// A saturation-based prover for classical first-order logic with equality.
#[derive(Parser)]
#[command(name = "saturate", version, about)]
struct Cli {
    /// The input problem file to use (stdin if omitted).
    input: Option<PathBuf>,

    /// Term ordering used to orient equations and compare literals.
    #[arg(long, value_enum)]
    ordering: Option<OrderingArg>,

    /// Literal selection function restricting resolution/superposition to selected literals.
    #[arg(long, value_enum)]
    selection: Option<SelectionArg>,

    /// How often (out of every N given-clause picks) the passive set is popped by age rather
    /// than by weight.
    #[arg(long, value_name = "N")]
    age_weight_ratio: Option<u32>,

    /// Disable forward/backward subsumption.
    #[arg(long)]
    no_subsumption: bool,

    /// Disable demodulation.
    #[arg(long)]
    no_demodulation: bool,

    /// Disable clause splitting.
    #[arg(long)]
    no_splitting: bool,

    /// Maximum number of given clauses to process (0 for unlimited).
    #[arg(long, value_name = "N")]
    given_clause_limit: Option<u64>,

    /// Soft wall-clock limit, in deciseconds (0 for unlimited).
    #[arg(long, value_name = "DS")]
    time_limit: Option<u64>,

    /// Soft memory budget, in megabytes (0 for unlimited).
    #[arg(long, value_name = "MB")]
    memory_limit: Option<u64>,

    /// What to print once the run finishes.
    #[arg(long, value_enum, default_value_t = OutputMode::Proof)]
    output: OutputMode,
}

#[derive(Copy, Clone, ValueEnum)]
enum OrderingArg {
    Kbo,
    Lpo,
}

#[derive(Copy, Clone, ValueEnum)]
enum SelectionArg {
    None,
    AllNegative,
    FirstNegative,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputMode {
    /// Print the TPTP derivation plus the SZS status and answer tuples.
    Proof,
    /// Print only the solver's final statistics report.
    Statistics,
}

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "% {}", record.args())
        } else {
            writeln!(buf, "% {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder.target(Target::Stderr).format(format).filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = std::env::var("SATURATE_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn build_config(cli: &Cli) -> SolverConfig {
    let mut config = SolverConfig::default();

    if let Some(ordering) = cli.ordering {
        config.ordering = match ordering {
            OrderingArg::Kbo => TermOrdering::Kbo,
            OrderingArg::Lpo => TermOrdering::Lpo,
        };
    }
    if let Some(selection) = cli.selection {
        config.selection = match selection {
            SelectionArg::None => SelectionFunction::SelectNone,
            SelectionArg::AllNegative => SelectionFunction::SelectAllNegative,
            SelectionArg::FirstNegative => SelectionFunction::SelectFirstNegative,
        };
    }
    if let Some(ratio) = cli.age_weight_ratio {
        config.age_weight_ratio = ratio;
    }
    if cli.no_subsumption {
        config.subsumption = false;
    }
    if cli.no_demodulation {
        config.demodulation = false;
    }
    if cli.no_splitting {
        config.splitting = false;
    }
    if let Some(limit) = cli.given_clause_limit {
        config.given_clause_limit = limit;
    }
    if let Some(deciseconds) = cli.time_limit {
        config.time_limit_ms = deciseconds * 100;
    }
    if let Some(megabytes) = cli.memory_limit {
        config.memory_limit_bytes = megabytes * 1_000_000;
    }

    config
}

/// Resident set size of this process, in bytes, read from `/proc/self/status`. Returns `0`
/// (meaning "unknown") off Linux or if the file can't be parsed, which disables the memory
/// budget rather than tripping it spuriously.
fn memory_used_bytes() -> u64 {
    let status = match fs::read_to_string("/proc/self/status") {
        Ok(contents) => contents,
        Err(_) => return 0,
    };
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kib: u64 = rest.trim().trim_end_matches(" kB").trim().parse().unwrap_or(0);
            return kib * 1024;
        }
    }
    0
}

fn install_interrupt_handler() -> Arc<AtomicBool> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    let _ = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    });
    interrupted
}

fn problem_name(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.file_stem().and_then(|s| s.to_str()).unwrap_or("problem").to_owned(),
        None => "stdin".to_owned(),
    }
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    let mut contents = String::new();
    match path {
        Some(path) => {
            info!("reading file '{}'", path.display());
            fs::File::open(path)
                .with_context(|| format!("failed to open '{}'", path.display()))?
                .read_to_string(&mut contents)
                .with_context(|| format!("failed to read '{}'", path.display()))?;
        }
        None => {
            info!("reading from stdin");
            io::stdin().lock().read_to_string(&mut contents).context("failed to read stdin")?;
        }
    }
    Ok(contents)
}

/// Print the derivation, answer tuples (if any goal predicate captured one) and SZS status for a
/// refutation
fn report_refutation(ctx: &mut Context, refutation: ClauseId, answer_predicates: &[saturate_formula::PredicateId], problem: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    saturate_cnf::write_derivation(&mut out, ctx, refutation)?;

    let inference = ctx.clauses.get(refutation).inference;
    for &predicate in answer_predicates {
        if let Some(answer) = ctx.answer_manager.conjunctive_extraction(&mut ctx.term_store, &ctx.proof, &ctx.clauses, inference, predicate) {
            saturate_cnf::write_answer_tuple(&mut out, &ctx.term_store, problem, &answer.terms)?;
        }
    }

    writeln!(out, "{}", saturate_cnf::szs_status_line(problem, "Theorem"))?;
    Ok(())
}

fn main_with_err() -> Result<i32> {
    let cli = Cli::parse();
    init_logging();

    let problem = problem_name(&cli.input);
    let config = build_config(&cli);
    let input = read_input(&cli.input)?;

    let mut ctx = Context::new(config);
    let loaded = saturate_cnf::load_str(&mut ctx, &input).context("failed to load problem")?;

    let interrupted = install_interrupt_handler();
    let outcome = saturation::run(&mut ctx, loaded.clause_ids, &interrupted, &memory_used_bytes);

    if cli.output == OutputMode::Statistics {
        print!("{}", ctx.statistics);
        return Ok(match outcome {
            Outcome::Refutation(_) | Outcome::Saturated => 0,
            Outcome::Limit(_) => 1,
            Outcome::Running => unreachable!("run() never returns Running"),
        });
    }

    match outcome {
        Outcome::Refutation(refutation) => {
            report_refutation(&mut ctx, refutation, &loaded.answer_predicates, &problem)?;
            Ok(0)
        }
        Outcome::Saturated => {
            println!("{}", saturate_cnf::szs_status_line(&problem, "Satisfiable"));
            Ok(0)
        }
        Outcome::Limit(LimitReason::TimeLimit) | Outcome::Limit(LimitReason::GivenClauseLimit) => {
            println!("{}", saturate_cnf::szs_status_line(&problem, "Timeout"));
            Ok(1)
        }
        Outcome::Limit(LimitReason::MemoryLimit) | Outcome::Limit(LimitReason::Interrupted) => {
            println!("{}", saturate_cnf::szs_status_line(&problem, "GaveUp"));
            Ok(1)
        }
        Outcome::Running => unreachable!("run() never returns Running"),
    }
}
