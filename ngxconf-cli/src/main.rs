//! ngxconf - check, format and query nginx configuration files
//!
//! This is the main entry point for the ngxconf CLI.

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ngxconf::{Document, StubStatus};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::CliConfig;

/// ngxconf - nginx configuration toolkit
#[derive(Parser)]
#[command(name = "ngxconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a configuration file parses
    Validate {
        /// Configuration file, or "-" for stdin
        file: String,
    },

    /// Re-indent a configuration file
    Fmt {
        /// Configuration file, or "-" for stdin
        file: String,

        /// Rewrite the file in place
        #[arg(short, long, conflicts_with = "check")]
        write: bool,

        /// Exit with an error if the file is not formatted
        #[arg(long)]
        check: bool,
    },

    /// Print the directives matching a dotted path such as "server.listen"
    Query {
        /// Configuration file, or "-" for stdin
        file: String,

        /// Dotted directive path
        path: String,

        /// Only print the first match
        #[arg(long)]
        one: bool,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize a virtual host file
    Inspect {
        /// Configuration file, or "-" for stdin
        file: String,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a stub_status page
    Status {
        /// Saved status page, or "-" for stdin
        #[arg(default_value = "-")]
        file: String,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let settings = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate { file } => {
            let source = read_source(&file)?;
            let doc = parse_or_exit(&file, &source);
            tracing::info!(file = %file, directives = doc.directives.len(), "configuration is valid");
            println!("✅ Configuration '{}' is valid!", file);
        }

        Commands::Fmt { file, write, check } => {
            let source = read_source(&file)?;
            let doc = parse_or_exit(&file, &source);
            let formatted = ngxconf::render_with(&doc, &settings.render);

            if check {
                if formatted != source {
                    eprintln!("❌ '{}' is not formatted", file);
                    std::process::exit(1);
                }
            } else if write {
                anyhow::ensure!(file != "-", "--write needs a file path, not stdin");
                std::fs::write(&file, &formatted)
                    .with_context(|| format!("failed to write {}", file))?;
                tracing::info!(file = %file, "formatted in place");
            } else {
                print!("{}", formatted);
            }
        }

        Commands::Query {
            file,
            path,
            one,
            json,
        } => {
            let source = read_source(&file)?;
            let doc = parse_or_exit(&file, &source);
            let matches = if one {
                match doc.find_one(&path) {
                    Ok(directive) => vec![directive],
                    Err(e) if e.is_not_found() => Vec::new(),
                    Err(e) => return Err(e.into()),
                }
            } else {
                doc.find(&path)?
            };

            if matches.is_empty() {
                tracing::debug!(path = %path, "no directive matched");
                std::process::exit(1);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                for directive in matches {
                    print!("{}", ngxconf::render_directive(directive, &settings.render));
                }
            }
        }

        Commands::Inspect { file, json } => {
            let source = read_source(&file)?;
            let doc = parse_or_exit(&file, &source);
            let summary = doc.summary()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }

        Commands::Status { file } => {
            let source = read_source(&file)?;
            let status = StubStatus::parse(&source)?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }

        Commands::Version => {
            println!("ngxconf v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Read a file, or stdin for "-"
fn read_source(file: &str) -> anyhow::Result<String> {
    if file == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("failed to read stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(Path::new(file)).with_context(|| format!("failed to read {}", file))
}

/// Parse, or print an annotated report and exit
fn parse_or_exit(file: &str, source: &str) -> Document {
    match ngxconf::parse(source) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::debug!(file, error = %e, "parse failed");
            eprint!("{}", e.report(file, source));
            eprintln!("❌ Configuration Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_summary(summary: &ngxconf::SiteSummary) {
    let list = |items: &[String]| {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(" ")
        }
    };
    let flag = |on: bool| if on { "yes" } else { "no" };

    let listen: Vec<String> = summary.listen.iter().map(|l| l.join(" ")).collect();
    println!("listen:        {}", list(&listen));
    println!("server_name:   {}", list(&summary.server_name));
    println!("index:         {}", list(&summary.index));
    println!("root:          {}", summary.root.as_deref().unwrap_or("-"));
    println!("includes:      {}", list(&summary.includes));
    println!(
        "php:           {}",
        summary.php.map_or("-".to_string(), |v| v.to_string())
    );
    println!("https:         {}", flag(summary.https));
    println!("ocsp:          {}", flag(summary.ocsp));
    println!("hsts:          {}", flag(summary.hsts));
    println!("http redirect: {}", flag(summary.http_redirect));
    println!("access_log:    {}", summary.access_log.as_deref().unwrap_or("-"));
    println!("error_log:     {}", summary.error_log.as_deref().unwrap_or("-"));
}
