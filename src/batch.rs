use std::collections::HashSet;
use std::future::Future;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::resolver::{Resolution, Resolve};

/// Every name confirmed live during a run, the seed target included.
pub type DiscoveredSet = HashSet<String>;

/// Runs `op` while holding one permit of the admission gate.
///
/// The future is created by the caller but not polled until a permit is held,
/// so no I/O escapes the gate. A closed gate yields `None`.
pub async fn admit<F: Future>(gate: &Semaphore, op: F) -> Option<F::Output> {
    let _permit = gate.acquire().await.ok()?;
    Some(op.await)
}

/// Resolves candidates in fixed-size rounds. Each round is gathered in full
/// before the next one is filled; within a round the gate bounds how many
/// lookups are actually in flight.
pub struct BatchScheduler<'a, R, I> {
    resolver: &'a R,
    gate: &'a Semaphore,
    candidates: I,
    batch_size: usize,
    rounds: usize,
}

impl<'a, R, I> BatchScheduler<'a, R, I>
where
    R: Resolve,
    I: Iterator<Item = String>,
{
    pub fn new(resolver: &'a R, gate: &'a Semaphore, candidates: I, batch_size: usize) -> Self {
        Self {
            resolver,
            gate,
            candidates,
            batch_size: batch_size.max(1),
            rounds: 0,
        }
    }

    /// Number of rounds issued so far.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Fills the next round, skipping names already in `discovered`, and
    /// resolves it. Results come back in submission order. `None` once the
    /// candidates are exhausted.
    pub async fn next_batch(&mut self, discovered: &DiscoveredSet) -> Option<Vec<Resolution>> {
        let mut pending = Vec::with_capacity(self.batch_size);
        while pending.len() < self.batch_size {
            match self.candidates.next() {
                Some(name) if discovered.contains(&name) => continue,
                Some(name) => pending.push(name),
                None => break,
            }
        }

        if pending.is_empty() {
            return None;
        }

        self.rounds += 1;
        debug!("Resolving round {} ({} candidates)", self.rounds, pending.len());

        let resolver = self.resolver;
        let gate = self.gate;
        let lookups = pending.into_iter().map(|name| async move {
            let address = admit(gate, resolver.resolve(&name)).await.flatten();
            Resolution { name, address }
        });

        Some(join_all(lookups).await)
    }
}
