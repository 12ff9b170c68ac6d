//! The `Sim` struct and its tick loop.

use std::time::Instant;

use tracing::info;

use sky_agent::Agent;
use sky_core::{SimConfig, SimRng, Tick};
use sky_env::Environment;
use sky_mechanism::Mechanism;

use crate::baseline::alone_in_the_sky;
use crate::history::{History, TickRecord};
use crate::owner::{IdSource, Owner};
use crate::{SimObserver, SimResult};

/// The reference driving loop.
///
/// Each tick:
///
/// 1. **Spawn**: every owner, in registration order, may produce agents.
/// 2. **Baseline** (optional): each new path agent is planned alone on a
///    clear copy of the world.
/// 3. **Allocate**: if anything spawned, or the mechanism asks for a pass,
///    the mechanism runs one round and commits it to the live environment.
/// 4. **Record**: the round goes into the [`History`].
///
/// Allocation failures are data and never stop the run; an `Err` from the
/// mechanism is an invariant violation and does.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config:    SimConfig,
    /// The live world.
    pub env:       Environment,
    pub mechanism: Mechanism,
    pub owners:    Vec<Box<dyn Owner>>,
    /// One stream per owner, index-aligned with `owners`.
    pub rngs:      Vec<SimRng>,
    pub ids:       IdSource,
    /// Next tick to process.
    pub tick:      Tick,
    pub history:   History,
    pub baselines: bool,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `config.total_ticks`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<&History> {
        while self.tick.0 < self.config.total_ticks {
            self.step(observer)?;
        }
        observer.on_sim_end(self.tick, &self.env);
        Ok(&self.history)
    }

    /// Run exactly `n` ticks from the current position (ignores `total_ticks`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.tick;
        observer.on_tick_start(now);
        let spawned = self.process_tick(now, observer)?;
        observer.on_tick_end(now, spawned);
        self.tick = now + 1;
        Ok(())
    }

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<usize> {
        let mut arrivals: Vec<Agent> = Vec::new();
        for (owner, rng) in self.owners.iter_mut().zip(self.rngs.iter_mut()) {
            arrivals.extend(owner.generate_agents(now, &self.env, &mut self.ids, rng)?);
        }
        let spawned = arrivals.len();
        if spawned == 0 && !self.mechanism.wants_to_reallocate(&self.env, now) {
            return Ok(0);
        }

        if self.baselines {
            let baselines = alone_in_the_sky(&self.env, &arrivals, now, self.mechanism.astar_config())?;
            self.history.baselines.extend(baselines);
        }

        let started = Instant::now();
        let allocations = self.mechanism.allocate(arrivals, &mut self.env, now)?;
        let record = TickRecord { tick: now, spawned, allocations, compute_time: started.elapsed() };

        info!(
            tick = %now,
            spawned,
            granted = record.granted(),
            failed = record.failed(),
            agents = self.env.agent_count(),
            elapsed_us = record.compute_time.as_micros() as u64,
            "tick allocated"
        );
        observer.on_allocations(now, &record.allocations);
        self.history.record(record);
        Ok(spawned)
    }
}
