use clap::{Parser, Subcommand};
use gd_app::{
    AppResult, RmsOptions, RmsSimulationDriver, RunTiming, SmallSignalDriver, SmallSignalOptions,
    load_case, modes_table, participation_table, prepare_case, summarize_case,
    write_trajectory_csv,
};
use gd_sim::Method;
use gd_stability::Eigenbasis;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridyn")]
#[command(
    about = "gridyn - RMS simulation and small-signal stability of power systems",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a case file and assemble its model
    Validate {
        /// Path to the case YAML or JSON file
        case_path: PathBuf,
    },
    /// Run an RMS time simulation
    Simulate {
        /// Path to the case YAML or JSON file
        case_path: PathBuf,
        /// End time in seconds (defaults to the case's run settings)
        #[arg(long)]
        t_end: Option<f64>,
        /// Time step in seconds
        #[arg(long)]
        h: Option<f64>,
        /// Integration method: implicit-euler or trapezoidal
        #[arg(long)]
        method: Option<Method>,
        /// Re-solve the algebraic equations before integrating
        #[arg(long)]
        equilibrate: bool,
        /// Write the trajectory as CSV to this file ("-" for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Assess small-signal stability at an operating point
    SmallSignal {
        /// Path to the case YAML or JSON file
        case_path: PathBuf,
        /// Assessment time in seconds; the case is integrated up to it first
        #[arg(long)]
        t_assess: Option<f64>,
        /// Time step in seconds
        #[arg(long)]
        h: Option<f64>,
        /// Log the s-plane eigenvalue plot
        #[arg(long)]
        plot: bool,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Simulate {
            case_path,
            t_end,
            h,
            method,
            equilibrate,
            output,
        } => cmd_simulate(&case_path, t_end, h, method, equilibrate, output.as_deref()),
        Commands::SmallSignal {
            case_path,
            t_assess,
            h,
            plot,
        } => cmd_small_signal(&case_path, t_assess, h, plot),
    }
}

fn cmd_validate(case_path: &Path) -> AppResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = load_case(case_path)?;
    let summary = summarize_case(&case)?;
    println!("✓ Case '{}' is valid (version {})", summary.name, summary.version);
    println!(
        "  Network: {} buses, {} generators, {} lines, {} loads",
        summary.buses, summary.generators, summary.lines, summary.loads
    );
    println!("  Extra blocks: {}", summary.blocks);
    println!("  Events: {}", summary.events);
    println!(
        "  States: {}, algebraic: {}, parameters: {}",
        summary.n_x, summary.n_y, summary.n_p
    );
    Ok(())
}

fn cmd_simulate(
    case_path: &Path,
    t_end: Option<f64>,
    h: Option<f64>,
    method: Option<Method>,
    equilibrate: bool,
    output: Option<&Path>,
) -> AppResult<()> {
    let case = load_case(case_path)?;
    let (built, compile_time_s) = prepare_case(&case)?;

    let mut options = RmsOptions::from(&built.run);
    if let Some(t_end) = t_end {
        options = options.with_t_end(t_end);
    }
    if let Some(h) = h {
        options = options.with_h(h);
    }
    if let Some(method) = method {
        options = options.with_method(method);
    }
    if equilibrate {
        options = options.with_equilibrate(true);
    }

    println!("Running RMS simulation: {}", built.name);
    println!(
        "  h = {} s, t_end = {} s, method = {}",
        options.h, options.t_end, options.method
    );

    let driver = RmsSimulationDriver::new(&built.system, options);
    let mut response = driver.run(&built.vars, &built.params, &built.events)?;
    response.timing.compile_time_s = compile_time_s;

    let traj = &response.trajectory;
    println!("✓ Simulation completed");
    println!("  Samples: {}", traj.len());
    println!("  Max Newton iterations per step: {}", traj.max_newton_iterations());
    println!("  Max step residual: {:.3e}", traj.max_residual());
    print_timing_summary(&response.timing);

    if let Some(path) = output {
        if path.as_os_str() == "-" {
            write_trajectory_csv(io::stdout().lock(), traj, &response.var_names)?;
        } else {
            write_trajectory_csv(File::create(path)?, traj, &response.var_names)?;
            println!("✓ Exported {} samples to {}", traj.len(), path.display());
        }
    }
    Ok(())
}

fn cmd_small_signal(
    case_path: &Path,
    t_assess: Option<f64>,
    h: Option<f64>,
    plot: bool,
) -> AppResult<()> {
    let case = load_case(case_path)?;
    let (built, compile_time_s) = prepare_case(&case)?;

    let mut options = SmallSignalOptions::from(&built.run).with_plot(plot);
    if let Some(t) = t_assess {
        options = options.with_t_assess(t);
    }
    if let Some(h) = h {
        options = options.with_h(h);
    }

    let driver = SmallSignalDriver::new(&built.system, options);
    let mut response = driver.run(&built.vars, &built.params, &built.events)?;
    response.timing.compile_time_s = compile_time_s;

    let result = &response.result;
    println!(
        "Small-signal assessment of '{}' at t = {} s (sample {})",
        built.name, response.t_assess, response.sample_index
    );
    println!("  Verdict: {}", result.verdict);
    if result.basis == Eigenbasis::Defective {
        println!("  Note: defective eigenbasis, participation from the pseudo-inverse of V");
    }
    println!();
    println!("Modes:");
    print!("{}", modes_table(&result.modes, &result.state_names));
    println!();
    println!("Participation factors:");
    print!("{}", participation_table(&result.participation, &result.state_names));
    print_timing_summary(&response.timing);
    Ok(())
}

fn print_timing_summary(timing: &RunTiming) {
    println!("\nTiming:");
    println!("  Compile:  {:.3} s", timing.compile_time_s);
    println!("  Init:     {:.3} s", timing.init_time_s);
    println!("  Solve:    {:.3} s", timing.solve_time_s);
    if timing.analysis_time_s > 0.0 {
        println!("  Analysis: {:.3} s", timing.analysis_time_s);
    }
    println!("  Total:    {:.3} s", timing.total_time_s + timing.compile_time_s);
}
