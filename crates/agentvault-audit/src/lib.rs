//! AgentVault Audit - Immutable audit log
//!
//! Every successful state-changing operation produces exactly one audit
//! record. The log is append-only and hash-chained; it is the only
//! durable history of the system and the expected basis for off-chain
//! reconciliation.

use std::sync::Arc;

use agentvault_types::{Address, Amount, SecurityLimits, Selector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Hash of the empty chain head
const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Types of auditable actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// Agent bound to an owner via trusted-authority signature
    AgentRegistered,
    /// Funds deposited into the vault
    Deposited { asset: Address, amount: Amount },
    /// Funds withdrawn to a recipient (amount is the actual amount moved)
    Withdrawn {
        asset: Address,
        amount: Amount,
        recipient: Address,
    },
    /// Swap completed; amounts are the actual measured values
    SwapExecuted {
        venue: Address,
        input_asset: Address,
        output_asset: Address,
        input_amount: Amount,
        output_amount: Amount,
        nonce: u64,
    },
    /// Whitelist entry toggled
    WhitelistUpdated {
        venue: Address,
        selector: Selector,
        allowed: bool,
    },
    /// Security limits replaced
    LimitsUpdated { limits: SecurityLimits },
    /// Global pause engaged
    Paused,
    /// Global pause lifted
    Unpaused,
    /// Trusted-authority identity rotated
    AuthorityRotated { new_authority: Address },
    /// Stuck trade lock force-cleared by the administrator
    TradeLockCleared,
    /// Unattributed on-hand funds swept out by the administrator
    Swept {
        asset: Address,
        amount: Amount,
        recipient: Address,
    },
}

/// An audit log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Position in the chain, starting at 0
    pub sequence: u64,
    /// Hash of the previous record (genesis hash for the first)
    pub previous_hash: String,
    /// Hash of this record
    pub hash: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Owner involved, when the action concerns a pair
    pub owner: Option<Address>,
    /// Agent involved, when the action concerns a pair
    pub agent: Option<Address>,
    /// The action
    pub action: AuditAction,
}

impl AuditRecord {
    /// Compute the chained hash of this record
    pub fn compute_hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let action = serde_json::to_string(&self.action).unwrap_or_default();
        let content = format!(
            "{}:{}:{}:{:?}:{:?}:{}",
            self.previous_hash,
            self.sequence,
            self.timestamp.timestamp_millis(),
            self.owner,
            self.agent,
            action
        );
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Verify the record hash
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }
}

/// Audit log trait
#[async_trait::async_trait]
pub trait AuditLog: Send + Sync {
    /// Append a record for an action
    async fn record(
        &self,
        owner: Option<Address>,
        agent: Option<Address>,
        action: AuditAction,
    ) -> AuditRecord;

    /// All records, oldest first
    async fn records(&self) -> Vec<AuditRecord>;

    /// Records involving one (owner, agent) pair
    async fn records_for_pair(&self, owner: &Address, agent: &Address) -> Vec<AuditRecord>;

    /// Verify the whole chain
    async fn verify_chain(&self) -> bool;

    /// Number of records
    async fn len(&self) -> usize;

    /// Whether the log is empty
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// In-memory append-only audit log
#[derive(Clone, Default)]
pub struct MemoryAuditLog {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AuditLog for MemoryAuditLog {
    async fn record(
        &self,
        owner: Option<Address>,
        agent: Option<Address>,
        action: AuditAction,
    ) -> AuditRecord {
        let mut records = self.records.write().await;
        let previous_hash = records
            .last()
            .map(|r| r.hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());

        let mut record = AuditRecord {
            sequence: records.len() as u64,
            previous_hash,
            hash: String::new(),
            timestamp: Utc::now(),
            owner,
            agent,
            action,
        };
        record.hash = record.compute_hash();
        records.push(record.clone());
        record
    }

    async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }

    async fn records_for_pair(&self, owner: &Address, agent: &Address) -> Vec<AuditRecord> {
        let records = self.records.read().await;
        records
            .iter()
            .filter(|r| r.owner.as_ref() == Some(owner) && r.agent.as_ref() == Some(agent))
            .cloned()
            .collect()
    }

    async fn verify_chain(&self) -> bool {
        let records = self.records.read().await;
        let mut previous = GENESIS_HASH.to_string();
        for (i, record) in records.iter().enumerate() {
            if record.sequence != i as u64
                || record.previous_hash != previous
                || !record.verify()
            {
                return false;
            }
            previous = record.hash.clone();
        }
        true
    }

    async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}
