//! dping - Main CLI Application
//!
//! Probes every candidate address of the domains in a catalog, ranks them by
//! loss-weighted latency, and reports which addresses passed and which are
//! blocked.

use clap::Parser;
use dping::{
    cli::Cli,
    config::{display_config_summary, load_config},
    error::{AppError, ErrorReporter, Result},
    App, Operation, BUILD_TIME, GIT_COMMIT, PKG_NAME, TARGET_TRIPLE, VERSION,
};
use std::process;

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue together with the output of 'dping --version'.");
        process::exit(99);
    }));

    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        process::exit(2);
    }

    let use_color = cli.use_colors();
    let verbose = cli.verbose;

    if let Err(e) = run_application(cli).await {
        ErrorReporter::new(use_color, verbose).report_error(&e);

        // Print suggestions for common errors
        print_error_suggestions(&e);

        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        println!("{} v{}", PKG_NAME, VERSION);
        println!("Build: {} ({}, {})", BUILD_TIME, GIT_COMMIT, TARGET_TRIPLE);
        println!("Debug mode enabled");
        println!();
    }

    let operation = cli.operation;
    let config = load_config(cli)?;

    if config.debug {
        println!("Configuration loaded successfully:");
        for line in display_config_summary(&config).lines() {
            println!("  {}", line);
        }
        println!();
    }

    let app = App::new(config).await?;

    if app.config().verbose && operation == Operation::Ping {
        println!(
            "Probing with {} strategy, up to {} concurrent probes per domain",
            app.strategy().name(),
            app.strategy().concurrency()
        );
    }

    let catalog = app.run(operation).await?;

    print!("{}", app.render_report(&catalog)?);

    if app.config().verbose {
        println!();
        println!("{}", "=".repeat(80));
        println!("{}", app.render_summary(&catalog)?);

        if operation == Operation::Ping {
            let stats = app.statistics();
            println!(
                "  Probes: {} ({} reachable, {} unreachable, {} degraded)",
                stats.probes, stats.reachable, stats.unreachable, stats.degraded
            );
            println!("  Snapshot: {}", app.config().snapshot_path);
        }
    }

    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format (see DPING_* variables)");
            eprintln!("  - --count must be 1-1000 and --wait 1-60 seconds");
            eprintln!("  - --concurrency 0 picks a pool size from the CPU count");
        }
        AppError::Format(_) => {
            eprintln!();
            eprintln!("Input file help:");
            eprintln!("  - The source catalog looks like {{\"group\": {{\"domain\": [\"1.2.3.4\"]}}}}");
            eprintln!("  - Snapshots are written by 'dping ping'; re-run it to regenerate one");
        }
        AppError::Io(_) => {
            eprintln!();
            eprintln!("File help:");
            eprintln!("  - Use --dns to point at the source catalog");
            eprintln!("  - 'dping show' needs a snapshot from an earlier 'dping ping' (see --out)");
        }
        AppError::ProbeParse(_) | AppError::Probe(_) => {
            eprintln!();
            eprintln!("Probe troubleshooting:");
            eprintln!("  - Run the ping command shown with --debug by hand");
            eprintln!("  - Without --strict, unparsable probes are recorded as unreachable");
            eprintln!("  - Check that extra --opt flags are valid for your ping");
        }
        AppError::Internal(_) => {}
    }
}
