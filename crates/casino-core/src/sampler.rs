//! Reveal sampling.
//!
//! Picks the handful of partner tasks shown on the wheel. When the pool
//! spans several categories the pick is spread across them so one prolific
//! category cannot crowd out the others.

use indexmap::IndexMap;
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Number of tasks revealed on the wheel.
pub const DEFAULT_REVEAL_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Tasks revealed per spin; also the minimum partner pool size.
    #[serde(default = "default_reveal_count")]
    pub reveal_count: usize,
    /// Random seed for reproducible reveals (None = entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_reveal_count() -> usize {
    DEFAULT_REVEAL_COUNT
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            reveal_count: DEFAULT_REVEAL_COUNT,
            seed: None,
        }
    }
}

/// Reveal sampler bound to a configuration.
pub struct TaskSampler {
    config: SamplerConfig,
}

impl TaskSampler {
    pub fn new() -> Self {
        Self {
            config: SamplerConfig::default(),
        }
    }

    pub fn with_config(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Generator for one reveal: seeded when configured.
    pub fn rng(&self) -> Mcg128Xsl64 {
        match self.config.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        }
    }

    pub fn sample(&self, tasks: &[Task]) -> Vec<Task> {
        select_random_tasks(tasks, self.config.reveal_count, &mut self.rng())
    }
}

impl Default for TaskSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Select up to `count` available tasks at random.
///
/// - Pools no larger than `count` come back whole, shuffled.
/// - With more than one category (uncategorized tasks form their own
///   group), each group gets `count / groups` picks and the first
///   `count % groups` groups one extra. A group smaller than its quota gives
///   everything it has; the gap is not made up elsewhere.
/// - A single group is sampled uniformly.
pub fn select_random_tasks<R: Rng + ?Sized>(
    tasks: &[Task],
    count: usize,
    rng: &mut R,
) -> Vec<Task> {
    let mut available: Vec<&Task> = tasks.iter().filter(|t| t.is_available()).collect();

    if available.len() <= count {
        available.shuffle(rng);
        return available.into_iter().cloned().collect();
    }

    let groups = group_by_category(&available);
    tracing::debug!(
        pool = available.len(),
        groups = groups.len(),
        count,
        "sampling reveal"
    );

    if groups.len() > 1 {
        return distributed_selection(groups, count, rng);
    }

    available.shuffle(rng);
    available.truncate(count);
    available.into_iter().cloned().collect()
}

/// The Spin: land on one of the revealed tasks.
pub fn spin_wheel<'a, R: Rng + ?Sized>(revealed: &'a [Task], rng: &mut R) -> Option<&'a Task> {
    revealed.choose(rng)
}

/// Groups keyed by category, in order of first appearance.
fn group_by_category<'a>(tasks: &[&'a Task]) -> IndexMap<Option<&'a str>, Vec<&'a Task>> {
    let mut groups: IndexMap<Option<&str>, Vec<&Task>> = IndexMap::new();
    for &task in tasks {
        groups
            .entry(task.category.as_deref())
            .or_default()
            .push(task);
    }
    groups
}

fn distributed_selection<R: Rng + ?Sized>(
    groups: IndexMap<Option<&str>, Vec<&Task>>,
    count: usize,
    rng: &mut R,
) -> Vec<Task> {
    let per_group = count / groups.len();
    let remainder = count % groups.len();

    let mut selected: Vec<&Task> = Vec::with_capacity(count);
    for (index, (_, mut members)) in groups.into_iter().enumerate() {
        let quota = per_group + usize::from(index < remainder);
        members.shuffle(rng);
        members.truncate(quota);
        selected.extend(members);
    }

    selected.shuffle(rng);
    selected.truncate(count);
    selected.into_iter().cloned().collect()
}
