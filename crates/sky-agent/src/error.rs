//! Agent-model error type.

use thiserror::Error;

use sky_core::AgentId;

use crate::agent::Agent;
use crate::segment::Segment;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{agent} is a {agent_kind} agent but received a {segment_kind} segment")]
    KindMismatch {
        agent:        AgentId,
        agent_kind:   &'static str,
        segment_kind: &'static str,
    },

    #[error("invalid agent: {0}")]
    Invalid(String),
}

impl AgentError {
    pub fn kind_mismatch(agent: &Agent, segment: &Segment) -> Self {
        AgentError::KindMismatch { agent: agent.id(), agent_kind: agent.kind(), segment_kind: segment.kind() }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
