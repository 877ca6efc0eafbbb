#![allow(dead_code)]

use std::sync::Arc;
use xaam_agents::{Agent, AgentDirectory, AgentId, InMemoryAgentDirectory, KeyManager};
use xaam_crypto::EnvelopeEngine;
use xaam_keystore::{MemoryKeyStore, PrivateKeyStore};

pub struct Harness {
    pub manager: KeyManager,
    pub keys: Arc<dyn PrivateKeyStore>,
    pub agents: Arc<InMemoryAgentDirectory>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryKeyStore::new()))
    }

    pub fn with_store(keys: Arc<dyn PrivateKeyStore>) -> Self {
        let agents = Arc::new(InMemoryAgentDirectory::new());
        let manager = KeyManager::new(
            EnvelopeEngine::default(),
            Arc::clone(&keys),
            Arc::clone(&agents) as Arc<dyn AgentDirectory>,
        );
        Self {
            manager,
            keys,
            agents,
        }
    }

    /// Registers an agent without keys.
    pub fn register(&self, agent: Agent) -> AgentId {
        let id = agent.id;
        self.agents.insert(agent).unwrap();
        id
    }

    /// Registers an agent and generates its key pair.
    pub async fn onboard(&self, agent: Agent) -> AgentId {
        let id = self.register(agent);
        self.manager.generate_keys_for_agent(&id).await.unwrap();
        id
    }
}
