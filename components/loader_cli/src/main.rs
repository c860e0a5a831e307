//! Corten Asset Loader CLI
//!
//! Entry point for the loader inspector. Parses CLI arguments and
//! delegates to a [`Session`] for planning and simulation.

use clap::Parser as ClapParser;
use loader_cli::{format_plan, Cli, CliResult, Outcome, Session};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns false when a simulated request did not load.
fn run(cli: &Cli) -> CliResult<bool> {
    let mut session = Session::new(cli.load_config()?)?;
    for target in &cli.fail {
        session.fail(target)?;
    }
    let exports = cli.exports.as_deref();

    if cli.repl {
        loader_cli::repl::run_repl(&mut session, exports)?;
        return Ok(true);
    }

    let Some(query) = cli.query.as_deref() else {
        print_usage();
        return Ok(true);
    };

    if cli.simulate {
        let report = session.simulate(query, exports)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", report);
        }
        return Ok(report.outcome != Outcome::Failed);
    }

    if cli.json {
        let plan = session.plan_json(query, exports)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", format_plan(&session.plan(query)?));
        if let Some(exports) = exports {
            for path in session.loader().export_paths(exports)? {
                println!("export {}", path);
            }
        }
    }
    Ok(true)
}

fn print_usage() {
    println!("Corten Asset Loader v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage:");
    println!("  corten-loader --query <REQUEST>              Show the load plan of a request");
    println!("  corten-loader --query <REQUEST> --simulate   Play a request out in memory");
    println!("  corten-loader --repl                         Start interactive REPL");
    println!();
    println!("Run 'corten-loader --help' for more options.");
}
