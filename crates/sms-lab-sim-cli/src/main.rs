mod prompt;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use sms_lab_abstract::{ReportSink, RunResult, Scenario, SimConfig, SimConfigOverride};
use sms_lab_simulator::tui::{MemoryLogBuffer, TuiApp};
use sms_lab_simulator::{ChannelSink, CollectingSink, ConsoleSink, SimulationReport, Simulator};

use crate::prompt::Prompter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Bulk SMS delivery simulator")]
struct Args {
    /// Load a scenario (TOML) from disk. CLI flags override its values.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of messages to produce.
    #[arg(long)]
    messages: Option<u64>,

    /// Number of concurrent senders.
    #[arg(long)]
    senders: Option<usize>,

    /// Mean processing time per message, in seconds.
    #[arg(long)]
    mean: Option<f64>,

    /// Probability that a message is marked failed, in [0, 1).
    #[arg(long)]
    error_rate: Option<f64>,

    /// Seconds between progress reports.
    #[arg(long)]
    interval: Option<u64>,

    /// Seed every random stream for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Prompt for any setting not given, and offer to run again afterwards.
    #[arg(long, default_value_t = false)]
    interactive: bool,

    /// Launch the terminal dashboard.
    #[arg(long, default_value_t = false)]
    tui: bool,

    /// Write a JSON trace of the finished simulation.
    #[arg(long)]
    trace_out: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> SimConfigOverride {
        SimConfigOverride {
            message_count: self.messages,
            sender_count: self.senders,
            mean_processing_time: self.mean,
            error_rate: self.error_rate,
            report_interval: self.interval.map(|secs| secs as f64),
            seed: self.seed,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_buffer = init_logging(args.tui);
    info!("sms-lab-sim-cli starting…");

    let scenario = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => Scenario::default(),
    };
    let known = scenario.config.clone().merge(args.overrides());

    if args.interactive {
        println!("Welcome to use this SMS Simulation system!");
    }

    loop {
        let overrides = if args.interactive {
            println!("Please set up your customer system.");
            prompt_config(&known)?
        } else {
            known.clone()
        };

        let mut config = SimConfig::default();
        overrides.apply_to(&mut config);
        config
            .validate()
            .context("Invalid simulation configuration")?;

        let report = run_once(&args, scenario.name.clone(), config, log_buffer.clone()).await?;
        print_summary(&report.result);

        if let Some(trace_path) = &args.trace_out {
            write_trace(trace_path, &report)?;
        }

        if !args.interactive || !ask_again()? {
            break;
        }
    }

    if args.interactive {
        println!("Thank you for using the SMS Simulation system. Goodbye!");
    }
    Ok(())
}

fn init_logging(use_tui: bool) -> Option<MemoryLogBuffer> {
    if use_tui {
        let buffer = MemoryLogBuffer::new();
        let writer = buffer.clone();
        tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .init();
        Some(buffer)
    } else {
        // stdout carries the progress lines
        tracing_subscriber::fmt().with_writer(io::stderr).init();
        None
    }
}

fn prompt_config(known: &SimConfigOverride) -> Result<SimConfigOverride> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    prompter
        .fill_missing(known, SimConfig::default().message_count)
        .context("Failed to read configuration from stdin")
}

fn ask_again() -> Result<bool> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    prompter
        .yes_no("Do you want to start another simulation? (yes/no): ")
        .context("Failed to read answer from stdin")
}

async fn run_once(
    args: &Args,
    scenario_name: Option<String>,
    config: SimConfig,
    log_buffer: Option<MemoryLogBuffer>,
) -> Result<SimulationReport> {
    let collector = CollectingSink::new();

    let result = if args.tui {
        let (channel, rx) = ChannelSink::new();
        let sink: Arc<dyn ReportSink> = Arc::new((collector.clone(), channel));
        let sim = Simulator::new(config.clone())?.with_sink(sink);
        let run = tokio::spawn(async move { sim.run().await });

        let mut app = TuiApp::new(config.clone(), scenario_name.clone(), rx, log_buffer);
        tokio::task::spawn_blocking(move || app.run())
            .await
            .context("Dashboard task panicked")??;

        if !run.is_finished() {
            println!("Dashboard closed; waiting for the simulation to finish…");
        }
        run.await.context("Simulation task panicked")??
    } else {
        let sink: Arc<dyn ReportSink> = Arc::new((collector.clone(), ConsoleSink));
        println!("Monitor: SMS simulation is running...");
        Simulator::new(config.clone())?.with_sink(sink).run().await?
    };

    println!("Congratulations! The SMS simulation has completed.");
    Ok(SimulationReport::new(
        scenario_name,
        config,
        result,
        collector.reports(),
    ))
}

fn print_summary(result: &RunResult) {
    println!("\n=== Simulation Summary ===");
    println!("Duration: {:.2}s", result.elapsed_secs);
    println!("Sent: {}", result.sent);
    println!("Succeeded: {}", result.successfully_sent());
    println!("Failed: {}", result.failed);
    println!(
        "Average Time per Message: {:.4} seconds",
        result.average_processing_time()
    );
    println!();
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    let scenario: Scenario = toml::from_str(&content).context("Failed to parse scenario file")?;
    if let Some(name) = &scenario.name {
        info!("Loaded scenario: {}", name);
    }
    Ok(scenario)
}

fn write_trace(path: &Path, report: &SimulationReport) -> Result<()> {
    let data = serde_json::to_vec_pretty(report).context("Failed to serialize simulation trace")?;
    fs::write(path, &data)
        .with_context(|| format!("Failed to write trace file {}", path.display()))?;
    info!("Trace written to {}", path.display());
    Ok(())
}
