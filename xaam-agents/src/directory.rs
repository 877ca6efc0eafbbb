//! Agent directory: where agent records and their published public keys live.

use crate::agent::{Agent, AgentId};
use crate::error::{AgentError, AgentResult};
use std::collections::HashMap;
use std::sync::RwLock;
use xaam_crypto::PublicKeyPem;

/// Lookup and update of agent records.
///
/// Implementations are shared across tasks, so every method takes `&self`.
pub trait AgentDirectory: Send + Sync {
    fn get(&self, id: &AgentId) -> AgentResult<Option<Agent>>;

    /// Inserts a new agent. Fails with [`AgentError::AlreadyExists`] if the id is taken.
    fn insert(&self, agent: Agent) -> AgentResult<()>;

    /// Publishes `public_key` on the agent record.
    fn set_public_key(&self, id: &AgentId, public_key: PublicKeyPem) -> AgentResult<()>;
}

/// Process-local directory.
#[derive(Default)]
pub struct InMemoryAgentDirectory {
    agents: RwLock<HashMap<AgentId, Agent>>,
}

impl InMemoryAgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.agents.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// A poisoned lock still holds consistent records: every write is a single
// map operation.
impl AgentDirectory for InMemoryAgentDirectory {
    fn get(&self, id: &AgentId) -> AgentResult<Option<Agent>> {
        let agents = self.agents.read().unwrap_or_else(|e| e.into_inner());
        Ok(agents.get(id).cloned())
    }

    fn insert(&self, agent: Agent) -> AgentResult<()> {
        let mut agents = self.agents.write().unwrap_or_else(|e| e.into_inner());
        if agents.contains_key(&agent.id) {
            return Err(AgentError::AlreadyExists(agent.id));
        }
        agents.insert(agent.id, agent);
        Ok(())
    }

    fn set_public_key(&self, id: &AgentId, public_key: PublicKeyPem) -> AgentResult<()> {
        let mut agents = self.agents.write().unwrap_or_else(|e| e.into_inner());
        let agent = agents.get_mut(id).ok_or(AgentError::NotFound(*id))?;
        agent.public_key = Some(public_key);
        Ok(())
    }
}
