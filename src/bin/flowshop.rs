//! flowshop: command-line front end.
//!
//! Loads an instance file, runs the requested stages in the order
//! NEH → simulated annealing → adaptive annealing (each warm-starting the
//! next), and prints the final sequence and makespan.
//!
//! ```text
//! flowshop data/instance.txt neh+adaptive_sa --seed 3 --trace
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use u_flowshop::io::{load_instance, write_neh_step, write_result, write_trace};
use u_flowshop::{
    AdaptiveConfig, AnnealConfig, AnnealEvent, FlowShopError, Pipeline, PipelineEvent, Stage,
};

const ALGORITHMS: [&str; 3] = ["neh", "simulated_annealing", "adaptive_sa"];

#[derive(Parser, Debug)]
#[command(name = "flowshop", version, author)]
#[command(about = "SDST permutation flow-shop solver (NEH + simulated annealing)", long_about = None)]
struct Args {
    /// Instance file
    instance: PathBuf,

    /// Algorithms to run: neh, simulated_annealing, adaptive_sa
    /// (separate arguments or joined with '+')
    #[arg(required = true)]
    algorithms: Vec<String>,

    /// Annealing iterations per stage
    #[arg(long, default_value_t = 50_000)]
    iterations: usize,

    /// Initial temperature of the standard annealing stage
    #[arg(long, default_value_t = 100.0)]
    temperature: f64,

    /// Geometric cooling factor of the standard annealing stage
    #[arg(long, default_value_t = 0.9975)]
    cooling: f64,

    /// Random seed for annealing stages
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Disable the extra cooling decay at the end of adaptive runs
    #[arg(long)]
    no_late_decay: bool,

    /// Emit visualizer lines on stdout: NEH progress with a slot frame per
    /// insertion, then a final frame and result line per stage
    #[arg(long)]
    trace: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Which stages the algorithm tokens ask for.
#[derive(Debug, Default, PartialEq, Eq)]
struct Selection {
    neh: bool,
    anneal: bool,
    adaptive: bool,
}

fn parse_algorithms(tokens: &[String]) -> std::result::Result<Selection, String> {
    let mut selection = Selection::default();
    for token in tokens.iter().flat_map(|t| t.split('+')) {
        match token.trim() {
            "neh" => selection.neh = true,
            "simulated_annealing" => selection.anneal = true,
            "adaptive_sa" => selection.adaptive = true,
            "" => {}
            other => {
                return Err(format!(
                    "unknown algorithm `{other}` (available: {})",
                    ALGORITHMS.join(", ")
                ))
            }
        }
    }
    if selection == Selection::default() {
        return Err(format!("no algorithm given (available: {})", ALGORITHMS.join(", ")));
    }
    Ok(selection)
}

fn build_pipeline(args: &Args, selection: &Selection) -> Pipeline {
    let mut pipeline = Pipeline::new();
    if selection.neh {
        pipeline = pipeline.with_stage(Stage::Neh);
    }
    if selection.anneal {
        pipeline = pipeline.with_stage(Stage::Anneal(
            AnnealConfig::default()
                .with_iterations(args.iterations)
                .with_initial_temperature(args.temperature)
                .with_cooling_factor(args.cooling)
                .with_seed(args.seed),
        ));
    }
    if selection.adaptive {
        let mut config = AdaptiveConfig::default()
            .with_iterations(args.iterations)
            .with_seed(args.seed);
        if args.no_late_decay {
            config = config.with_late_decay(None);
        }
        pipeline = pipeline.with_stage(Stage::AdaptiveAnneal(config));
    }
    pipeline
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let selection = parse_algorithms(&args.algorithms).map_err(|e| anyhow!(e))?;
    let instance = load_instance(&args.instance)
        .with_context(|| format!("failed to load {}", args.instance.display()))?;
    info!(
        path = %args.instance.display(),
        jobs = instance.job_count(),
        machines = instance.machine_count(),
        "instance loaded"
    );

    let pipeline = build_pipeline(args, &selection);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut trace_error: Option<FlowShopError> = None;

    let result = pipeline.run_with_observer(&instance, |event| match event {
        PipelineEvent::Neh(step) => {
            debug!(step = step.step, job = step.job, position = step.position, makespan = step.makespan, "NEH step");
            if args.trace && trace_error.is_none() {
                if let Err(err) = write_neh_step(&mut out, &instance, step) {
                    trace_error = Some(err);
                }
            }
        }
        PipelineEvent::Anneal { event: AnnealEvent::NewBest { iteration, makespan, .. }, .. } => {
            debug!(iteration, makespan, "new best");
        }
        PipelineEvent::Anneal { event: AnnealEvent::Calibrated(calibration), .. } => {
            info!(
                temperature = calibration.initial_temperature,
                cooling = calibration.cooling_factor,
                "adaptive temperature calibrated"
            );
        }
        PipelineEvent::StageFinished { stage, report, schedule, .. } => {
            if !args.trace || trace_error.is_some() {
                return;
            }
            let written = schedule.replay(&instance).and_then(|trace| {
                write_trace(&mut out, &trace, "FINAL")?;
                write_result(&mut out, stage.result_prefix(), schedule, report.makespan)
            });
            if let Err(err) = written {
                trace_error = Some(err);
            }
        }
    })?;
    if let Some(err) = trace_error {
        return Err(err).context("failed to write trace");
    }

    let sequence = result
        .schedule
        .sequence()
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "Final best sequence: {sequence}")?;
    writeln!(out, "Final best makespan: {}", result.makespan)?;
    for report in &result.stages {
        writeln!(
            out,
            "  {:<20} makespan {:>8}  {:>8} ms",
            report.stage,
            report.makespan,
            report.elapsed.as_millis()
        )?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_joined_tokens() {
        let selection = parse_algorithms(&tokens(&["neh+adaptive_sa"])).unwrap();
        assert_eq!(selection, Selection { neh: true, anneal: false, adaptive: true });
    }

    #[test]
    fn test_parse_separate_tokens() {
        let selection = parse_algorithms(&tokens(&["simulated_annealing", "neh"])).unwrap();
        assert_eq!(selection, Selection { neh: true, anneal: true, adaptive: false });
    }

    #[test]
    fn test_unknown_token() {
        let err = parse_algorithms(&tokens(&["neh+tabu"])).unwrap_err();
        assert!(err.contains("tabu"));
        assert!(parse_algorithms(&tokens(&["+"])).is_err());
    }

    #[test]
    fn test_pipeline_order_is_canonical() {
        let args = Args::parse_from(["flowshop", "x.txt", "adaptive_sa+neh+simulated_annealing"]);
        let selection = parse_algorithms(&args.algorithms).unwrap();
        let names: Vec<_> = build_pipeline(&args, &selection)
            .stages()
            .iter()
            .map(Stage::name)
            .collect();
        assert_eq!(names, ALGORITHMS);
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::parse_from(["flowshop", "x.txt", "neh"]);
        assert_eq!(args.iterations, 50_000);
        assert_eq!(args.seed, 1);
        assert!(!args.trace);
    }
}
