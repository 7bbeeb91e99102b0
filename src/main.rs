use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dancebots::compress::{TRACE_CAPACITY, candidates, compress, reproduces};
use dancebots::logging;
use dancebots::robot::realized_trace;
use dancebots::scoring::score;
use dancebots::tournament::{Tournament, TournamentConfig};
use dancebots::validate::check;

#[derive(Parser)]
#[command(name = "dancebots", about = "Leader/imitator dance simulation and loop compression")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that a program is well-formed.
    Validate { program: String },

    /// Print the flat move trace a program produces.
    Trace {
        program: String,

        /// Maximum number of moves to record.
        #[arg(long, default_value_t = TRACE_CAPACITY)]
        capacity: usize,
    },

    /// Score an imitator program against a leader program.
    Score { leader: String, imitator: String },

    /// Compress a leader trace into a shorter equivalent program.
    Compress {
        trace: String,

        /// Treat the input as a program and compress its realized trace.
        #[arg(long)]
        expand: bool,

        /// List every candidate, not only the winner.
        #[arg(long)]
        all: bool,
    },

    /// Play a batch of seeded rounds and print one CSV row per round.
    Tournament {
        /// Random seed for reproducibility.
        #[arg(long)]
        seed: u64,

        /// Number of rounds to play.
        #[arg(long, default_value_t = 64)]
        rounds: usize,

        /// Use random leader programs instead of the canned pool.
        #[arg(long)]
        random: bool,

        /// Maximum length of random leader programs.
        #[arg(long, default_value_t = 16)]
        program_length: usize,

        /// Run in benchmark mode: suppress CSV, print throughput stats.
        #[arg(long)]
        benchmark: bool,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Validate { program } => {
            check(&program).with_context(|| format!("invalid program {program:?}"))?;
            println!("valid");
        }
        Command::Trace { program, capacity } => {
            let trace = realized_trace(&program, capacity).context("run program")?;
            println!("{trace}");
        }
        Command::Score { leader, imitator } => {
            let result = score(&leader, &imitator).context("score programs")?;
            println!("penalty,steps,leader_finished,imitator_finished");
            println!(
                "{},{},{},{}",
                result.penalty_points,
                result.steps_taken,
                result.leader_finished,
                result.imitator_finished
            );
        }
        Command::Compress { trace, expand, all } => {
            let trace = if expand {
                realized_trace(&trace, TRACE_CAPACITY).context("expand program")?
            } else {
                trace
            };
            check(&trace).with_context(|| format!("invalid trace {trace:?}"))?;
            if all {
                for candidate in candidates(&trace) {
                    let verdict = if reproduces(&trace, &candidate.program) {
                        "ok"
                    } else {
                        "rejected"
                    };
                    eprintln!(
                        "{:<28} {:>4} {verdict:<8} {}",
                        candidate.heuristic.to_string(),
                        candidate.program.len(),
                        candidate.program
                    );
                }
            }
            match compress(&trace) {
                Some(best) => println!("{}", best.program),
                None => {
                    eprintln!("no shorter program found, keeping the trace");
                    println!("{trace}");
                }
            }
        }
        Command::Tournament {
            seed,
            rounds,
            random,
            program_length,
            benchmark,
        } => {
            if rounds == 0 {
                bail!("--rounds must be positive");
            }
            let config = TournamentConfig {
                rounds,
                random_leaders: random,
                program_length,
                ..Default::default()
            };
            if benchmark {
                run_benchmark(config, seed)?;
            } else {
                run_tournament(config, seed)?;
            }
        }
    }
    Ok(())
}

fn run_tournament(config: TournamentConfig, seed: u64) -> Result<()> {
    let tournament = Tournament::new(config, seed);
    let reports = tournament.run().context("play tournament")?;

    println!(
        "round,leader,trace_len,imitation,imitation_len,heuristic,penalty,loop_ratio,brotli_ratio"
    );
    for report in &reports {
        let heuristic = report
            .heuristic
            .map(|h| h.to_string())
            .unwrap_or_else(|| "none".to_owned());
        println!(
            "{},{},{},{},{},{},{},{:.6},{:.6}",
            report.round,
            report.leader,
            report.trace.len(),
            report.imitation,
            report.imitation.len(),
            heuristic,
            report.penalty,
            report.stats.loop_ratio(),
            report.stats.brotli_ratio()
        );
    }

    let imperfect = reports.iter().filter(|r| r.penalty > 0).count();
    if imperfect > 0 {
        eprintln!("{imperfect} of {} imitations were penalized", reports.len());
    }
    Ok(())
}

fn run_benchmark(config: TournamentConfig, seed: u64) -> Result<()> {
    let rounds = config.rounds;
    let tournament = Tournament::new(config, seed);

    let start = std::time::Instant::now();
    let reports = tournament.run().context("play tournament")?;
    let elapsed = start.elapsed();

    let compressed = reports.iter().filter(|r| r.heuristic.is_some()).count();
    let n = reports.len() as f64;
    let mean_loop = reports.iter().map(|r| r.stats.loop_ratio()).sum::<f64>() / n;
    let mean_brotli = reports.iter().map(|r| r.stats.brotli_ratio()).sum::<f64>() / n;
    let loops_win = reports
        .iter()
        .filter(|r| r.stats.loop_advantage() > 0.0)
        .count();
    let rounds_per_sec = rounds as f64 / elapsed.as_secs_f64();

    eprintln!("Benchmark results:");
    eprintln!("  Rounds:            {rounds}");
    eprintln!("  Compressed:        {compressed}");
    eprintln!("  Mean loop ratio:   {mean_loop:.3}");
    eprintln!("  Mean brotli ratio: {mean_brotli:.3}");
    eprintln!("  Loops beat brotli: {loops_win}");
    eprintln!("  Elapsed:           {elapsed:.2?}");
    eprintln!("  Rounds/sec:        {rounds_per_sec:.1}");
    Ok(())
}
