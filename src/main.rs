//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `ipeed` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting

use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use std::process;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use ipeed::config::{Cli, Command, Config};
use ipeed::display::{render, render_error, summary_line};
use ipeed::initialization::{init_logger_with, init_session};
use ipeed::{Ipv4, LastResult, LookupSession, RecordSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env from the current directory, then from next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let config = cli.to_config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("ipeed error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let session = init_session(config).context("Failed to initialize lookup session")?;

    match command {
        Command::Lookup {
            text,
            another,
            json,
        } => {
            let text = text.join(" ");
            let outcome = if another {
                session.try_another_provider(&text).await
            } else {
                session.lookup(&text).await
            }?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.record)?);
            } else {
                println!("{}", render(&outcome.record, &outcome.source));
            }
        }
        Command::Batch { file, json } => {
            run_batch(&session, &file, json, config.max_concurrency).await?;
        }
        Command::Last => match session.last_result().context("Failed to read last result")? {
            Some(LastResult::Error(message)) => println!("{}", render_error(&message)),
            Some(LastResult::Record { ip, record }) => {
                let source = cached_source(&session, &ip);
                println!("{}", render(&record, &source));
            }
            None => println!("No lookups yet"),
        },
        Command::ClearCache => {
            session.clear_cache().context("Failed to clear cache")?;
            println!("Cache cleared");
        }
        Command::Providers => {
            for (i, name) in session.resolver().registry().names().iter().enumerate() {
                println!("{}. {}", i + 1, name);
            }
        }
    }
    Ok(())
}

/// Cache status of the last displayed record, read from its cache entry.
fn cached_source(session: &LookupSession, ip: &str) -> RecordSource {
    let entry = ip
        .parse::<Ipv4>()
        .ok()
        .and_then(|ip| session.cache().entry(&ip).ok().flatten());
    match entry {
        Some(entry) => RecordSource::Cached {
            cached_at: entry.cached_at(),
        },
        None => RecordSource::Fresh,
    }
}

async fn run_batch(
    session: &LookupSession,
    source: &str,
    json: bool,
    max_concurrency: usize,
) -> Result<()> {
    let lines = read_lines(source).await?;
    log::info!("Looking up {} line(s) from {}", lines.len(), source);

    let mut results = stream::iter(lines)
        .map(|line| {
            let session = session.clone();
            async move {
                let result = session.lookup(&line).await;
                (line, result)
            }
        })
        .buffered(max_concurrency);

    let mut failed = 0usize;
    while let Some((line, result)) = results.next().await {
        match result {
            Ok(outcome) if json => println!("{}", serde_json::to_string(&outcome.record)?),
            Ok(outcome) => println!("{}", summary_line(&outcome.record)),
            Err(e) => {
                failed += 1;
                if json {
                    println!(
                        "{}",
                        serde_json::json!({ "input": line, "error": e.to_string() })
                    );
                } else {
                    println!("{}", render_error(&format!("{}: {}", line, e)));
                }
            }
        }
    }

    session.resolver().stats().log_summary();
    if failed > 0 {
        log::warn!("{} line(s) failed", failed);
    }
    Ok(())
}

async fn read_lines(source: &str) -> Result<Vec<String>> {
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = if source == "-" {
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        let file = tokio::fs::File::open(source)
            .await
            .with_context(|| format!("Failed to open {}", source))?;
        Box::new(BufReader::new(file))
    };

    let mut lines = reader.lines();
    let mut out = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            out.push(line.to_string());
        }
    }
    Ok(out)
}
