//! Decorative status simulation.
//!
//! Statuses carry no information about any real system: they are drawn from a
//! seeded generator so a rendered map looks alive and stays reproducible.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::StatusConfig;
use crate::ir::{Status, Topology};

/// Status of every service node at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFrame {
    pub index: usize,
    pub statuses: BTreeMap<String, Status>,
}

impl StatusFrame {
    pub fn capture(topology: &Topology, index: usize) -> Self {
        let statuses = topology
            .nodes
            .values()
            .filter(|node| !node.is_infrastructure())
            .map(|node| (node.id.clone(), node.status))
            .collect();
        Self { index, statuses }
    }

    pub fn count(&self, status: Status) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }
}

pub struct StatusSimulator {
    rng: StdRng,
    config: StatusConfig,
    seed: u64,
}

impl StatusSimulator {
    /// Seeded from `config.seed`, or from entropy when unset.
    pub fn new(config: StatusConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        tracing::debug!(seed, "status simulator seeded");
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
            seed,
        }
    }

    pub fn with_seed(config: StatusConfig, seed: u64) -> Self {
        Self::new(StatusConfig {
            seed: Some(seed),
            ..config
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Give every service node a uniformly drawn status.
    pub fn randomize_all(&mut self, topology: &mut Topology) {
        for node in topology.nodes.values_mut() {
            if node.is_infrastructure() {
                continue;
            }
            node.status = Status::ALL[self.rng.gen_range(0..Status::ALL.len())];
        }
    }

    /// One timer step: each service node is redrawn with probability
    /// `change_probability`, using the weighted distribution. Returns how many
    /// statuses actually changed value.
    pub fn tick(&mut self, topology: &mut Topology) -> usize {
        let mut changed = 0;
        for node in topology.nodes.values_mut() {
            if node.is_infrastructure() {
                continue;
            }
            if !self.rng.gen_bool(self.config.change_probability.clamp(0.0, 1.0)) {
                continue;
            }
            let next = self.weighted_status();
            if next != node.status {
                changed += 1;
            }
            node.status = next;
        }
        changed
    }

    fn weighted_status(&mut self) -> Status {
        let [healthy, warning, critical] = self.config.weights;
        let total = healthy + warning + critical;
        if total <= 0.0 {
            return Status::Healthy;
        }
        let roll = self.rng.r#gen::<f64>() * total;
        if roll < critical {
            Status::Critical
        } else if roll < critical + warning {
            Status::Warning
        } else {
            Status::Healthy
        }
    }

    /// `count` frames: the current state followed by successive ticks.
    /// The topology is left in the state of the last frame.
    pub fn frames(&mut self, topology: &mut Topology, count: usize) -> Vec<StatusFrame> {
        let count = count.max(1);
        let mut frames = Vec::with_capacity(count);
        frames.push(StatusFrame::capture(topology, 0));
        for index in 1..count {
            let changed = self.tick(topology);
            tracing::trace!(frame = index, changed, "status tick");
            frames.push(StatusFrame::capture(topology, index));
        }
        frames
    }

    pub fn interval_ms(&self) -> u64 {
        self.config.interval_ms
    }
}
