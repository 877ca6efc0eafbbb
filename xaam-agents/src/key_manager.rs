//! Per-agent key management.
//!
//! `KeyManager` generates agent key pairs, resolves recipient sets for task
//! payloads and decrypts on an agent's behalf. RSA work and key store I/O
//! run on the blocking pool so async callers are never stalled.

use crate::agent::{Agent, AgentId};
use crate::directory::AgentDirectory;
use crate::error::{AgentError, AgentResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};
use xaam_crypto::{
    EncryptedEnvelope, EnvelopeEngine, PrivateKeyPem, PublicKeyPem, RecipientKeys,
    SealedPayload, WrappedKeyMap,
};
use xaam_keystore::PrivateKeyStore;

/// Agent key lifecycle and payload encryption on behalf of agents.
#[derive(Clone)]
pub struct KeyManager {
    engine: EnvelopeEngine,
    keys: Arc<dyn PrivateKeyStore>,
    agents: Arc<dyn AgentDirectory>,
}

impl KeyManager {
    pub fn new(
        engine: EnvelopeEngine,
        keys: Arc<dyn PrivateKeyStore>,
        agents: Arc<dyn AgentDirectory>,
    ) -> Self {
        Self {
            engine,
            keys,
            agents,
        }
    }

    pub fn engine(&self) -> &EnvelopeEngine {
        &self.engine
    }

    /// Generates a key pair for an existing agent and returns its public key.
    ///
    /// The private key is stored before the public key is published, so an
    /// agent never advertises a key nobody can decrypt with. A store failure
    /// leaves the agent record untouched.
    pub async fn generate_keys_for_agent(&self, id: &AgentId) -> AgentResult<PublicKeyPem> {
        self.agent(id)?;

        let engine = self.engine.clone();
        let keys = Arc::clone(&self.keys);
        let owner = id.owner_key();
        let public_key = tokio::task::spawn_blocking(move || -> AgentResult<PublicKeyPem> {
            let (public_key, private_key) = engine.generate_key_pair()?.into_parts();
            keys.store_private_key(&owner, &private_key)?;
            Ok(public_key)
        })
        .await??;

        self.agents.set_public_key(id, public_key.clone())?;
        info!(agent = %id, bits = self.engine.config().key_bits, "generated agent key pair");
        Ok(public_key)
    }

    /// The agent's published public key.
    pub fn agent_public_key(&self, id: &AgentId) -> AgentResult<PublicKeyPem> {
        self.agent(id)?
            .public_key
            .ok_or(AgentError::MissingPublicKey(*id))
    }

    /// The agent's private key from the key store.
    pub async fn agent_private_key(&self, id: &AgentId) -> AgentResult<PrivateKeyPem> {
        let keys = Arc::clone(&self.keys);
        let owner = id.owner_key();
        tokio::task::spawn_blocking(move || keys.retrieve_private_key(&owner))
            .await??
            .ok_or(AgentError::MissingPrivateKey(*id))
    }

    /// Public keys for every agent in `ids`, keyed by owner key.
    ///
    /// Fails if any agent is unknown or has no published key; the recipient
    /// set is never silently shortened.
    pub fn recipient_keys(&self, ids: &[AgentId]) -> AgentResult<RecipientKeys> {
        self.collect_keys(ids, |_| Ok(()))
    }

    /// Like [`recipient_keys`](Self::recipient_keys), additionally requiring
    /// every agent to be a judge.
    pub fn judge_recipient_keys(&self, judge_ids: &[AgentId]) -> AgentResult<RecipientKeys> {
        self.collect_keys(judge_ids, |agent| {
            if agent.is_judge() {
                Ok(())
            } else {
                Err(AgentError::NotAJudge(agent.id))
            }
        })
    }

    /// Encrypts `payload` so that each agent in `ids` can decrypt it.
    pub async fn encrypt_for_agents<T>(&self, payload: T, ids: &[AgentId]) -> AgentResult<SealedPayload>
    where
        T: Serialize + Send + 'static,
    {
        let recipients = self.recipient_keys(ids)?;
        let engine = self.engine.clone();
        let sealed = tokio::task::spawn_blocking(move || {
            engine.encrypt_for_recipients(&payload, &recipients)
        })
        .await??;
        debug!(recipients = sealed.wrapped_keys.len(), "encrypted payload for agents");
        Ok(sealed)
    }

    /// Decrypts a payload as agent `id`, using its entry in `wrapped_keys`
    /// and its stored private key.
    pub async fn decrypt_as_agent<T>(
        &self,
        envelope: &EncryptedEnvelope,
        wrapped_keys: &WrappedKeyMap,
        id: &AgentId,
    ) -> AgentResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let owner = id.owner_key();
        let Some(wrapped) = wrapped_keys.get(&owner).cloned() else {
            warn!(agent = %id, "decryption attempted by non-recipient");
            return Err(AgentError::NotARecipient(*id));
        };

        let private_key = self.agent_private_key(id).await?;
        let engine = self.engine.clone();
        let envelope = envelope.clone();
        let payload = tokio::task::spawn_blocking(move || {
            engine.decrypt_for_recipient(&envelope, &wrapped, &private_key)
        })
        .await??;
        Ok(payload)
    }

    fn agent(&self, id: &AgentId) -> AgentResult<Agent> {
        self.agents.get(id)?.ok_or(AgentError::NotFound(*id))
    }

    fn collect_keys(
        &self,
        ids: &[AgentId],
        check: impl Fn(&Agent) -> AgentResult<()>,
    ) -> AgentResult<RecipientKeys> {
        let mut recipients = RecipientKeys::new();
        for id in ids {
            let agent = self.agent(id)?;
            check(&agent)?;
            let public_key = agent.public_key.ok_or(AgentError::MissingPublicKey(*id))?;
            recipients.insert(id.owner_key(), public_key);
        }
        Ok(recipients)
    }
}
