//! Agent records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use xaam_crypto::PublicKeyPem;

/// Unique agent identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(Uuid);

impl AgentId {
    /// Time-ordered id for a new agent.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Key under which this agent's private key and wrapped keys are stored.
    pub fn owner_key(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for AgentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeProfile {
    pub specialization: Option<String>,
}

/// What an agent does in the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "agent_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentRole {
    Worker,
    Judge(JudgeProfile),
}

impl AgentRole {
    pub fn is_judge(&self) -> bool {
        matches!(self, Self::Judge(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub role: AgentRole,
    pub wallet_address: String,
    /// Published once the private key is safely stored.
    pub public_key: Option<PublicKeyPem>,
    pub reputation_score: f64,
    pub completed_tasks: u32,
    pub successful_tasks: u32,
}

impl Agent {
    pub fn worker(name: impl Into<String>, wallet_address: impl Into<String>) -> Self {
        Self::with_role(name, wallet_address, AgentRole::Worker)
    }

    pub fn judge(
        name: impl Into<String>,
        wallet_address: impl Into<String>,
        specialization: Option<String>,
    ) -> Self {
        Self::with_role(
            name,
            wallet_address,
            AgentRole::Judge(JudgeProfile { specialization }),
        )
    }

    fn with_role(name: impl Into<String>, wallet_address: impl Into<String>, role: AgentRole) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            description: String::new(),
            role,
            wallet_address: wallet_address.into(),
            public_key: None,
            reputation_score: 0.0,
            completed_tasks: 0,
            successful_tasks: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_judge(&self) -> bool {
        self.role.is_judge()
    }
}
