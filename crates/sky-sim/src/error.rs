use thiserror::Error;

use sky_agent::AgentError;
use sky_env::EnvError;
use sky_mechanism::MechanismError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("owner {owner} produced an invalid agent: {source}")]
    Owner {
        owner:  String,
        #[source]
        source: AgentError,
    },

    #[error(transparent)]
    Mechanism(#[from] MechanismError),

    #[error(transparent)]
    Env(#[from] EnvError),
}

pub type SimResult<T> = Result<T, SimError>;
