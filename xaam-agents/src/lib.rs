//! Agent records and key management for the XAAM marketplace.
//!
//! Ties the envelope engine, the private key store and the agent directory
//! together: agents get key pairs, task payloads are encrypted for a chosen
//! set of agents (typically the judges of a task), and each agent decrypts
//! with the private key held in its store.

pub mod agent;
pub mod directory;
mod error;
pub mod key_manager;

pub use agent::{Agent, AgentId, AgentRole, JudgeProfile};
pub use directory::{AgentDirectory, InMemoryAgentDirectory};
pub use error::{AgentError, AgentResult};
pub use key_manager::KeyManager;
