//! Fluent builder for constructing a [`Sim`].

use sky_core::{SimConfig, SimRng, Tick};
use sky_env::Environment;
use sky_mechanism::Mechanism;

use crate::history::History;
use crate::owner::{IdSource, Owner};
use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks and seed
/// - [`Environment`]: the live world, usually from `Environment::from_config`
/// - [`Mechanism`]: allocator and payment rule
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                    |
/// |-----------------|----------------------------|
/// | `.owner(o)`     | no owners (nothing spawns) |
/// | `.baselines(b)` | `false`                    |
///
/// # Example
///
/// ```rust,ignore
/// let env = Environment::from_config(&world)?;
/// let mut sim = SimBuilder::new(SimConfig::default(), env, Mechanism::priority(AStarConfig::default(), 1.0))
///     .owner(ScheduledPathOwner::new("courier", stops, vec![3]).priority(0.5))
///     .build()?;
/// let history = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:    SimConfig,
    env:       Environment,
    mechanism: Mechanism,
    owners:    Vec<Box<dyn Owner>>,
    baselines: bool,
}

impl SimBuilder {
    pub fn new(config: SimConfig, env: Environment, mechanism: Mechanism) -> Self {
        Self {
            config,
            env,
            mechanism,
            owners: Vec::new(),
            baselines: false,
        }
    }

    pub fn owner(mut self, owner: impl Owner + 'static) -> Self {
        self.owners.push(Box::new(owner));
        self
    }

    pub fn owners(mut self, owners: Vec<Box<dyn Owner>>) -> Self {
        self.owners.extend(owners);
        self
    }

    /// Record each new path agent's "alone in the sky" allocation, planned
    /// with the mechanism's own search settings.
    pub fn baselines(mut self, enabled: bool) -> Self {
        self.baselines = enabled;
        self
    }

    pub fn build(self) -> SimResult<Sim> {
        let horizon = self.env.dimension().t;
        if self.config.total_ticks == 0 {
            return Err(SimError::Config("total_ticks must be positive".into()));
        }
        if self.config.total_ticks as i64 > horizon + 1 {
            return Err(SimError::Config(format!(
                "total_ticks {} runs past the world's last tick {horizon}",
                self.config.total_ticks
            )));
        }

        let mut root = SimRng::new(self.config.seed);
        let rngs = (0..self.owners.len()).map(|i| root.child(i as u64)).collect();

        Ok(Sim {
            config:    self.config,
            env:       self.env,
            mechanism: self.mechanism,
            owners:    self.owners,
            rngs,
            ids:       IdSource::new(),
            tick:      Tick::ZERO,
            history:   History::default(),
            baselines: self.baselines,
        })
    }
}
