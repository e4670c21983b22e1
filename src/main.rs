use std::time::Instant;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use deepsub::cli::Cli;
use deepsub::output::{FileSink, ResultSink};
use deepsub::prober::HttpProber;
use deepsub::resolver::DnsResolver;
use deepsub::{DiscoveryEngine, ScanEvent, report};
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    report::print_banner();

    let settings = args.to_config().context("invalid configuration")?;
    let target = args.target()?;

    let started = Instant::now();
    report::print_target_header(&target, Local::now());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_c_tx.send(true);
        }
    });
    if let Some(limit) = settings.max_time {
        let timer_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            info!("Time limit of {:?} reached, stopping", limit);
            let _ = timer_tx.send(true);
        });
    }

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if let ScanEvent::Discovered(record) = event {
                report::print_discovered(&record);
            }
        }
    });

    let resolver = DnsResolver::new(settings.nameservers, settings.engine.dns_timeout);
    info!(
        "Resolving {} words per base domain via {:?}",
        settings.wordlist.len(),
        resolver.nameservers()
    );
    let prober = HttpProber::new(settings.engine.http_timeout)?;
    let engine = DiscoveryEngine::new(resolver, prober, settings.wordlist, settings.engine)
        .with_events(events_tx);

    let scan = engine.run(&target, shutdown_rx).await;
    drop(engine);
    let _ = printer.await;

    if scan.interrupted {
        report::print_interrupted();
    }

    let sink = FileSink::new(settings.text_output, settings.json_output);
    let saved = sink.persist(&scan.records);
    if let Ok(paths) = &saved {
        paths.iter().for_each(|path| report::print_saved(path));
    }

    report::print_summary(&scan.records);
    report::print_elapsed(started.elapsed());

    saved.context("failed to save results")?;
    Ok(())
}
