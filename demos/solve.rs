use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::bail;

use spa_solver::lexer::LexOptions;
use spa_solver::problem::parse_problem;
use spa_solver::session::SessionConfig;
use spa_solver::solve::{solve_with_config, Input, SolveConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Minimize a linear objective over boolean variables")]
struct Cli {
    /// Problem file (`var`, `st` and `min` lines).
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Declare a variable.
    #[arg(long = "var", value_name = "NAME")]
    variables: Vec<String>,

    /// Add a constraint, e.g. "a + b >= 1".
    #[arg(long = "st", value_name = "CONSTRAINT")]
    constraints: Vec<String>,

    /// Objective to minimize, overrides the one in FILE.
    #[arg(long, value_name = "OBJECTIVE")]
    min: Option<String>,

    /// Read `!=` as "distinct" instead of equality.
    #[arg(long)]
    distinct_not_equal: bool,

    /// Give up after this many branching decisions.
    #[arg(long, value_name = "INT")]
    decision_limit: Option<u64>,

    /// Log level.
    #[arg(long, default_value = "info")]
    log: simplelog::LevelFilter,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let mut input = match &args.input {
        Some(path) => parse_problem(File::open(path)?)?,
        None => Input::default(),
    };
    input.variables.extend(args.variables.iter().cloned());
    input.constraints.extend(args.constraints.iter().cloned());
    if let Some(objective) = &args.min {
        input.objective = objective.clone();
    }
    if input.objective.is_empty() {
        bail!("no objective given, use --min or a `min` line");
    }

    print!("{}", input);

    let config = SolveConfig {
        session: SessionConfig {
            decision_limit: args.decision_limit,
        },
        lex: LexOptions {
            distinct_not_equal: args.distinct_not_equal,
        },
    };
    let output = solve_with_config(&input, &config);

    if output.success {
        for (name, value) in &output.assignment {
            println!("{} = {}", name, value);
        }
        if let Some(objective) = &output.objective {
            println!("objective = {}", objective);
        }
    } else {
        println!("failed: {}", output.message);
    }

    println!("\nAll done in {:.2} s", time_total.elapsed().as_secs_f64());

    Ok(())
}
