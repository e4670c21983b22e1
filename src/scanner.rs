use std::collections::VecDeque;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{Semaphore, mpsc, watch};
use tracing::{debug, info, warn};

use crate::batch::{BatchScheduler, DiscoveredSet, admit};
use crate::config::EngineConfig;
use crate::prober::Probe;
use crate::record::DiscoveredRecord;
use crate::resolver::Resolve;
use crate::wordlist::Wordlist;

/// Progress notifications for live display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Expanding { domain: String, depth: usize },
    Discovered(DiscoveredRecord),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    /// Base domains taken off the work queue.
    pub expansions: usize,
    /// Resolution rounds across all base domains.
    pub batches: usize,
    /// Candidates actually sent to the resolver.
    pub candidates: usize,
}

#[derive(Debug)]
pub struct ScanReport {
    pub target: String,
    /// Discovery order.
    pub records: Vec<DiscoveredRecord>,
    pub stats: ScanStats,
    pub interrupted: bool,
}

struct QueuedDomain {
    name: String,
    depth: usize,
}

/// Recursive subdomain discovery: every confirmed name is brute-forced again
/// as a base domain until the work queue drains.
pub struct DiscoveryEngine<R, P> {
    resolver: R,
    prober: P,
    wordlist: Wordlist,
    config: EngineConfig,
    gate: Semaphore,
    events: Option<mpsc::UnboundedSender<ScanEvent>>,
}

impl<R, P> DiscoveryEngine<R, P>
where
    R: Resolve,
    P: Probe,
{
    pub fn new(resolver: R, prober: P, wordlist: Wordlist, config: EngineConfig) -> Self {
        let gate = Semaphore::new(config.concurrency.max(1));
        Self {
            resolver,
            prober,
            wordlist,
            config,
            gate,
            events: None,
        }
    }

    pub fn with_events(mut self, events: mpsc::UnboundedSender<ScanEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn emit(&self, event: ScanEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    /// Runs discovery from `target` until the queue is empty or `shutdown`
    /// flips to `true`. Whatever was confirmed before a shutdown is returned.
    pub async fn run(&self, target: &str, mut shutdown: watch::Receiver<bool>) -> ScanReport {
        let target = normalize_domain(target);
        let mut discovered = DiscoveredSet::new();
        let mut queue = VecDeque::new();
        let mut records = Vec::new();
        let mut stats = ScanStats::default();
        let mut interrupted = false;

        discovered.insert(target.clone());
        queue.push_back(QueuedDomain {
            name: target.clone(),
            depth: 0,
        });

        'expand: loop {
            if *shutdown.borrow() {
                interrupted = true;
                break;
            }
            let Some(base) = queue.pop_front() else {
                break;
            };

            stats.expansions += 1;
            info!("Expanding {} (depth {}, {} queued)", base.name, base.depth, queue.len());
            self.emit(ScanEvent::Expanding {
                domain: base.name.clone(),
                depth: base.depth,
            });

            let mut batches = BatchScheduler::new(
                &self.resolver,
                &self.gate,
                self.wordlist.candidates(&base.name),
                self.config.batch_size,
            );

            loop {
                if *shutdown.borrow() {
                    interrupted = true;
                    break 'expand;
                }

                let batch = tokio::select! {
                    batch = batches.next_batch(&discovered) => batch,
                    _ = shutdown_requested(&mut shutdown) => {
                        interrupted = true;
                        break 'expand;
                    }
                };
                let Some(batch) = batch else {
                    break;
                };

                stats.batches += 1;
                stats.candidates += batch.len();

                let mut survivors = Vec::new();
                for resolution in batch {
                    let Some(address) = resolution.address else {
                        continue;
                    };
                    if discovered.insert(resolution.name.clone()) {
                        survivors.push((resolution.name, address));
                    }
                }
                if survivors.is_empty() {
                    continue;
                }

                // Probes finish in any order; results are kept per survivor so an
                // interrupt still records every host whose probe already returned.
                let mut probes = survivors
                    .iter()
                    .enumerate()
                    .map(|(idx, (name, _))| async move {
                        (idx, admit(&self.gate, self.prober.probe(name)).await.flatten())
                    })
                    .collect::<FuturesUnordered<_>>();
                let mut statuses = vec![None; survivors.len()];

                while !probes.is_empty() {
                    tokio::select! {
                        next = probes.next() => match next {
                            Some((idx, status)) => statuses[idx] = Some(status),
                            None => break,
                        },
                        _ = shutdown_requested(&mut shutdown) => {
                            interrupted = true;
                            break;
                        }
                    }
                    if *shutdown.borrow() {
                        interrupted = true;
                        break;
                    }
                }
                drop(probes);

                let depth = base.depth + 1;
                for ((name, address), status) in survivors.into_iter().zip(statuses) {
                    let Some(status) = status else {
                        debug!("Probe of {} abandoned on shutdown", name);
                        continue;
                    };
                    let record = DiscoveredRecord::new(name, address, status);
                    info!("Discovered {} -> {} [{}]", record.subdomain, record.ip, record.status);

                    if self.config.expands(depth) {
                        queue.push_back(QueuedDomain {
                            name: record.subdomain.clone(),
                            depth,
                        });
                    } else {
                        debug!("Not expanding {}: depth limit reached", record.subdomain);
                    }

                    self.emit(ScanEvent::Discovered(record.clone()));
                    records.push(record);
                }

                if interrupted {
                    break 'expand;
                }
            }
        }

        if interrupted {
            warn!(
                "Discovery interrupted with {} subdomains found and {} domains still queued",
                records.len(),
                queue.len()
            );
        } else {
            info!(
                "Discovery finished: {} subdomains, {} expansions, {} candidates",
                records.len(),
                stats.expansions,
                stats.candidates
            );
        }

        ScanReport {
            target,
            records,
            stats,
            interrupted,
        }
    }
}

/// Completes once shutdown is requested. Never completes if the sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_lowercase()
}
