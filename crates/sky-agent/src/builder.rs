//! Fluent builder for [`PathAgent`].
//!
//! # Usage
//!
//! ```rust
//! use sky_agent::PathAgentBuilder;
//! use sky_core::{AgentId, Coordinate4D};
//!
//! let agent = PathAgentBuilder::new(AgentId(0))
//!     .stop(Coordinate4D::new(3, 0, 3, 4))
//!     .stop(Coordinate4D::new(7, 0, 7, 4))
//!     .priority(0.1)
//!     .battery(100)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(agent.legs(), 1);
//! assert_eq!(agent.speed, 1);
//! ```

use sky_core::{AgentId, AgentIdentity, Coordinate4D};

use crate::agent::PathAgent;
use crate::error::{AgentError, AgentResult};

pub struct PathAgentBuilder {
    id:          AgentId,
    locations:   Vec<Coordinate4D>,
    stays:       Vec<i64>,
    speed:       i64,
    battery:     i64,
    near_radius: i64,
    priority:    f64,
}

impl PathAgentBuilder {
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            locations: Vec::new(),
            stays: Vec::new(),
            speed: PathAgent::DEFAULT_SPEED,
            battery: PathAgent::DEFAULT_BATTERY,
            near_radius: PathAgent::DEFAULT_NEAR_RADIUS,
            priority: 0.0,
        }
    }

    /// Append a stop; `t` is the desired departure (first stop) or arrival time.
    pub fn stop(mut self, location: Coordinate4D) -> Self {
        self.locations.push(location);
        self
    }

    pub fn stops(mut self, locations: impl IntoIterator<Item = Coordinate4D>) -> Self {
        self.locations.extend(locations);
        self
    }

    /// Dwell times; `stays[i]` is spent on arrival at `locations[i + 1]`,
    /// the `(i + 2)`-th stop.
    pub fn stays(mut self, stays: Vec<i64>) -> Self {
        self.stays = stays;
        self
    }

    pub fn speed(mut self, speed: i64) -> Self {
        self.speed = speed;
        self
    }

    pub fn battery(mut self, battery: i64) -> Self {
        self.battery = battery;
        self
    }

    pub fn near_radius(mut self, near_radius: i64) -> Self {
        self.near_radius = near_radius;
        self
    }

    pub fn priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn build(self) -> AgentResult<PathAgent> {
        if self.locations.len() < 2 {
            return Err(AgentError::Invalid(format!("{} needs at least two stops", self.id)));
        }
        if self.speed < 1 {
            return Err(AgentError::Invalid(format!("{} has speed {} (must be >= 1)", self.id, self.speed)));
        }
        if self.near_radius < 0 || self.battery < 0 {
            return Err(AgentError::Invalid(format!("{} has a negative radius or battery", self.id)));
        }
        if self.stays.iter().any(|&s| s < 0) {
            return Err(AgentError::Invalid(format!("{} has a negative stay", self.id)));
        }
        Ok(PathAgent {
            identity:           AgentIdentity::live(self.id),
            locations:          self.locations,
            stays:              self.stays,
            speed:              self.speed,
            battery:            self.battery,
            near_radius:        self.near_radius,
            priority:           self.priority,
            allocated_segments: Vec::new(),
        })
    }
}
