//! Elitism and stagnation tracking.
//!
//! - [`EliteArchive`]: the E best distinct solutions seen so far, kept
//!   outside the population dynamics.
//! - [`GlobalBest`]: the single best solution of the run.
//! - [`StagnationMonitor`]: counts non-improving iterations and signals
//!   once per threshold crossing.
//!
//! Archive and best entries store the integer encoding of their
//! solution, so decoding an entry always reproduces the scored solution.

use serde::{Deserialize, Serialize};

use super::encoding::encode;
use super::population::Particle;

/// A preserved solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliteEntry {
    /// Integer-coordinate position.
    pub position: Vec<f64>,
    /// Discrete solution.
    pub solution: Vec<usize>,
    /// Fitness of `solution`.
    pub fitness: f64,
}

impl EliteEntry {
    /// Snapshots a particle's current solution.
    pub fn from_particle(particle: &Particle) -> Self {
        Self {
            position: encode(&particle.solution),
            solution: particle.solution.clone(),
            fitness: particle.fitness,
        }
    }
}

/// Fixed-capacity archive of the best distinct solutions.
///
/// Entries are sorted best-first. Slot `i` never gets worse: a
/// candidate enters only by being strictly better than what it
/// displaces, and duplicate solutions are kept once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EliteArchive {
    capacity: usize,
    entries: Vec<EliteEntry>,
}

impl EliteArchive {
    /// Creates an empty archive.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Entries, best first.
    pub fn entries(&self) -> &[EliteEntry] {
        &self.entries
    }

    /// Merges candidates into the archive. Returns `true` if it changed.
    pub fn update<'p>(&mut self, candidates: impl IntoIterator<Item = &'p Particle>) -> bool {
        if self.capacity == 0 {
            return false;
        }
        let mut pool = self.entries.clone();
        pool.extend(candidates.into_iter().map(EliteEntry::from_particle));
        // Stable: on ties, existing entries stay ahead of newcomers.
        pool.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));

        let mut kept: Vec<EliteEntry> = Vec::with_capacity(self.capacity);
        for entry in pool {
            if kept.len() == self.capacity {
                break;
            }
            if kept.iter().any(|k| k.solution == entry.solution) {
                continue;
            }
            kept.push(entry);
        }

        let changed = kept != self.entries;
        self.entries = kept;
        changed
    }
}

/// Best solution observed across the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalBest {
    /// Best entry so far.
    pub entry: EliteEntry,
}

impl GlobalBest {
    /// Starts from a particle.
    pub fn new(particle: &Particle) -> Self {
        Self {
            entry: EliteEntry::from_particle(particle),
        }
    }

    /// Best fitness so far.
    pub fn fitness(&self) -> f64 {
        self.entry.fitness
    }

    /// Replaces the best if `particle` is strictly better.
    pub fn offer(&mut self, particle: &Particle) -> bool {
        if particle.fitness < self.entry.fitness {
            self.entry = EliteEntry::from_particle(particle);
            true
        } else {
            false
        }
    }
}

/// Counts consecutive non-improving iterations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagnationMonitor {
    limit: usize,
    counter: usize,
    triggers: usize,
}

impl StagnationMonitor {
    /// Creates a monitor firing after `limit` stalled iterations.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            counter: 0,
            triggers: 0,
        }
    }

    /// Records one iteration. Returns `true` when the threshold is
    /// reached; the counter then restarts from zero.
    pub fn record(&mut self, improved: bool) -> bool {
        if improved {
            self.counter = 0;
            return false;
        }
        self.counter += 1;
        if self.counter >= self.limit {
            self.counter = 0;
            self.triggers += 1;
            true
        } else {
            false
        }
    }

    /// Current count of stalled iterations.
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Number of times the threshold was reached.
    pub fn triggers(&self) -> usize {
        self.triggers
    }
}
