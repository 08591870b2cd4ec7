//! fragdoc CLI - fragment-based documentation site renderer.
//!
//! Provides commands for:
//! - `render`: Render one page to stdout
//! - `cgi`: Serve one request as a CGI front controller

mod commands;
mod error;
mod output;
mod shell;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CgiArgs, RenderArgs};
use output::Output;

/// fragdoc - fragment-based documentation site renderer.
#[derive(Parser)]
#[command(name = "fragdoc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one page to stdout.
    Render(RenderArgs),
    /// Serve the request described by the CGI environment.
    Cgi(CgiArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Render(args) => args.verbose,
        Commands::Cgi(args) => args.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN.
    // Logs go to stderr: stdout carries the page.
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Cgi(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
