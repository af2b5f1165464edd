//! AgentVault Ledger - Balance store for owner/agent trading accounts
//!
//! The ledger is:
//! - Keyed by the composite (owner, agent, asset) tuple - one flat map,
//!   no nested structures
//! - Append-only (every mutation produces a journal entry)
//! - The single source of truth for what each pair holds per asset
//!
//! # Invariants
//!
//! 1. No negative balances
//! 2. balance(key) always equals the sum of credits minus debits for key
//! 3. Every entry has a reason
//! 4. Zero-amount mutations are rejected
//!
//! Accounts are created implicitly at first credit and never destroyed;
//! a zero balance is a valid terminal state.

use std::collections::HashMap;
use std::sync::Arc;

use agentvault_types::{Address, Amount, Result, VaultError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Unique identifier for a journal entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new() -> Self {
        Self(format!("entry_{}", Uuid::new_v4()))
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

/// Composite balance key: one owner, one agent, one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    pub owner: Address,
    pub agent: Address,
    pub asset: Address,
}

impl BalanceKey {
    pub fn new(owner: Address, agent: Address, asset: Address) -> Self {
        Self {
            owner,
            agent,
            asset,
        }
    }
}

/// Direction of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Increase of the keyed balance
    Credit,
    /// Decrease of the keyed balance
    Debit,
}

/// Reason for a journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryReason {
    /// Owner deposit into the vault
    Deposit,
    /// Owner withdrawal out of the vault
    Withdrawal { recipient: Address },
    /// Compensating credit after a failed withdrawal transfer
    WithdrawalRollback { recipient: Address },
    /// Input debited ahead of an external swap call
    SwapDebit { venue: Address },
    /// Measured output credited after an external swap call
    SwapCredit { venue: Address },
    /// Compensating entry undoing a swap that aborted mid-flight
    SwapRollback { venue: Address },
}

/// A single journal entry (one side of a balance mutation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: EntryId,
    pub key: BalanceKey,
    pub kind: EntryKind,
    pub amount: Amount,
    pub balance_after: Amount,
    pub reason: EntryReason,
    pub created_at: DateTime<Utc>,
}

/// The AgentVault ledger
///
/// Exclusively owned and mutated by the engine; external components read
/// balances through accessor queries only.
#[derive(Clone)]
pub struct Ledger {
    /// Balances by composite key
    balances: Arc<RwLock<HashMap<BalanceKey, Amount>>>,
    /// All entries (append-only)
    entries: Arc<RwLock<Vec<LedgerEntry>>>,
}

impl Ledger {
    /// Create a new in-memory ledger
    pub fn new() -> Self {
        Self {
            balances: Arc::new(RwLock::new(HashMap::new())),
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Current balance for a key, zero if never credited
    pub async fn balance(&self, key: &BalanceKey) -> Amount {
        let balances = self.balances.read().await;
        balances.get(key).copied().unwrap_or(Amount::ZERO)
    }

    /// Credit a key (increase balance)
    ///
    /// Returns the new balance. The account is created implicitly on
    /// first credit.
    pub async fn credit(
        &self,
        key: &BalanceKey,
        amount: Amount,
        reason: EntryReason,
    ) -> Result<Amount> {
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount {
                message: "credit amount must be greater than zero".to_string(),
            });
        }

        let mut balances = self.balances.write().await;
        let mut entries = self.entries.write().await;

        let current = balances.get(key).copied().unwrap_or(Amount::ZERO);
        let new_balance = current
            .checked_add(amount)
            .ok_or(VaultError::AmountOverflow)?;

        let entry = LedgerEntry {
            entry_id: EntryId::new(),
            key: *key,
            kind: EntryKind::Credit,
            amount,
            balance_after: new_balance,
            reason,
            created_at: Utc::now(),
        };

        balances.insert(*key, new_balance);
        entries.push(entry);

        tracing::debug!(
            owner = %key.owner,
            agent = %key.agent,
            asset = %key.asset,
            %amount,
            balance = %new_balance,
            "ledger credit"
        );
        Ok(new_balance)
    }

    /// Debit a key (decrease balance)
    ///
    /// Fails if the stored amount is less than requested (invariant: no
    /// negative balances).
    pub async fn debit(
        &self,
        key: &BalanceKey,
        amount: Amount,
        reason: EntryReason,
    ) -> Result<Amount> {
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount {
                message: "debit amount must be greater than zero".to_string(),
            });
        }

        let mut balances = self.balances.write().await;
        let mut entries = self.entries.write().await;

        let current = balances.get(key).copied().unwrap_or(Amount::ZERO);
        let new_balance =
            current
                .checked_sub(amount)
                .ok_or(VaultError::InsufficientBalance {
                    available: current,
                    required: amount,
                })?;

        let entry = LedgerEntry {
            entry_id: EntryId::new(),
            key: *key,
            kind: EntryKind::Debit,
            amount,
            balance_after: new_balance,
            reason,
            created_at: Utc::now(),
        };

        balances.insert(*key, new_balance);
        entries.push(entry);

        tracing::debug!(
            owner = %key.owner,
            agent = %key.agent,
            asset = %key.asset,
            %amount,
            balance = %new_balance,
            "ledger debit"
        );
        Ok(new_balance)
    }

    /// Sum of all balances held in one asset across every key
    ///
    /// Used by the administrative sweep to tell ledger-attributed
    /// holdings apart from stray on-hand funds.
    pub async fn asset_total(&self, asset: &Address) -> Result<Amount> {
        let balances = self.balances.read().await;
        let mut total = Amount::ZERO;
        for (key, amount) in balances.iter() {
            if &key.asset == asset {
                total = total
                    .checked_add(*amount)
                    .ok_or(VaultError::AmountOverflow)?;
            }
        }
        Ok(total)
    }

    /// All entries recorded for a key
    pub async fn entries_for(&self, key: &BalanceKey) -> Vec<LedgerEntry> {
        let entries = self.entries.read().await;
        entries.iter().filter(|e| &e.key == key).cloned().collect()
    }

    /// Total number of journal entries
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Recent entries (newest first)
    pub async fn recent_entries(&self, limit: usize) -> Vec<LedgerEntry> {
        let entries = self.entries.read().await;
        entries.iter().rev().take(limit).cloned().collect()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
