mod cli;

use ripforge::config;
use ripforge::pipeline::{Ripper, TrackDecision, TrackOutcome, TrackPolicy};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConfigOverrides};
use rf_av::{format_elapsed, HandBrake, MetadataExtractor, ToolRegistry};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "ripforge=debug,rf_av=debug,rf_core=debug".to_string()
        } else {
            "ripforge=info,rf_av=info,rf_core=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Rip {
            inputs,
            titles,
            dry_run,
            overrides,
        } => rip(inputs, titles, dry_run, overrides, cli.config.as_deref()),
        Commands::Probe {
            device,
            title,
            json,
            overrides,
        } => probe(device, title, json, overrides, cli.config.as_deref()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Version => {
            println!("ripforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Load the config file and lay the command-line overrides on top.
fn build_config(
    overrides: ConfigOverrides,
    config_path: Option<&Path>,
) -> Result<config::Config> {
    let mut config = config::load_config_or_default(config_path)?;
    overrides.apply(&mut config);

    for warning in config.validate() {
        tracing::warn!("Config: {warning}");
    }

    Ok(config)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

fn rip(
    inputs: Vec<PathBuf>,
    titles: Vec<String>,
    dry_run: bool,
    overrides: ConfigOverrides,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = build_config(overrides, config_path)?;
    let platform = rf_av::platform::detect(&config);

    let missing = ToolRegistry::for_platform(platform.kind(), &config.tools).missing();
    if !missing.is_empty() {
        tracing::warn!("Tools not found: {}", missing.join(", "));
    }

    tracing::info!("Output directory: {}", config.output_dir.display());

    let transcoder = Arc::new(HandBrake::new(config.tools.handbrake.clone()));
    let ripper = Ripper::new(config, platform, transcoder).dry_run(dry_run);
    let inputs = ripper.resolve_inputs(inputs)?;

    let report = runtime()?.block_on(ripper.run(&inputs, &titles))?;

    for input in &report.inputs {
        tracing::info!(
            "{} ({}): {} encoded, {} existing, {} too short",
            input.input.display(),
            input.title,
            input.count(TrackOutcome::Encoded),
            input.count(TrackOutcome::AlreadyExists),
            input.count(TrackOutcome::TooShort),
        );
    }
    tracing::info!("Run finished in {}", format_elapsed(report.elapsed));

    Ok(())
}

fn probe(
    device: Option<PathBuf>,
    title: Option<String>,
    json: bool,
    overrides: ConfigOverrides,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = build_config(overrides, config_path)?;
    let platform = rf_av::platform::detect(&config);

    let device = match device.or_else(|| platform.default_drive()) {
        Some(d) => d,
        None => anyhow::bail!("No device given and no default drive found"),
    };

    let extractor = MetadataExtractor::new(platform);
    let (disc_title, document) =
        runtime()?.block_on(extractor.extract(&device, title.as_deref()))?;

    let plans = TrackPolicy::new(&config).plan(&disc_title, &document);

    if json {
        let value = serde_json::json!({
            "device": device,
            "title": disc_title,
            "tracks": plans,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Device: {}", device.display());
    println!("Title: {disc_title}");
    println!("\nTracks: {}", plans.len());
    for plan in &plans {
        print!(
            "  [{:>2}] {} {}px",
            plan.track.index,
            format_elapsed(plan.track.duration()),
            plan.track.width
        );
        match &plan.decision {
            TrackDecision::TooShort => println!("  skip (too short)"),
            TrackDecision::Encode {
                destination,
                preset,
                ..
            } => println!("  {preset} -> {}", destination.display()),
        }
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let platform = rf_av::platform::detect(&config);

    println!("Checking external tools...\n");

    let tools = ToolRegistry::for_platform(platform.kind(), &config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        } else {
            print!(" (looked for {})", tool.configured.display());
        }

        println!();
    }

    if let Some(drive) = platform.default_drive() {
        println!("\nDefault drive: {}", drive.display());
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to rip discs.");
    }

    Ok(())
}
