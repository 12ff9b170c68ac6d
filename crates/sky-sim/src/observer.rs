//! Simulation observer trait for progress reporting and data collection.

use sky_agent::Allocation;
use sky_core::Tick;
use sky_env::Environment;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — failure counter
///
/// ```rust,ignore
/// struct Failures(usize);
///
/// impl SimObserver for Failures {
///     fn on_allocations(&mut self, _tick: Tick, allocations: &[Allocation]) {
///         self.0 += allocations.iter().filter(|a| a.is_failure()).count();
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any owner spawns.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called with the committed allocations of a tick that ran a round.
    fn on_allocations(&mut self, _tick: Tick, _allocations: &[Allocation]) {}

    /// Called at the end of each tick with the number of agents spawned.
    fn on_tick_end(&mut self, _tick: Tick, _spawned: usize) {}

    /// Called once after the final tick with the live environment.
    fn on_sim_end(&mut self, _final_tick: Tick, _env: &Environment) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
