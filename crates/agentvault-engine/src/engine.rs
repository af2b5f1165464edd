//! The vault engine
//!
//! Orchestrates authorization checks, balance mutation, the external
//! venue call, outcome measurement, and slippage enforcement. Owns every
//! piece of mutable state (ledger, registry, nonces, whitelist, locks);
//! no external component writes to them directly.
//!
//! # Execution model
//!
//! Actions are processed one at a time to completion; the engine-wide
//! entry flag converts any nested entry (an adversarial venue calling
//! back in) into a fast [`VaultError::ReentrantCall`] instead of a
//! deadlock. The per-pair trade lock is a separate, business-level
//! exclusivity invariant: it is acquired before the entry flag is
//! raised, so a reentrant swap attempt for the *same* pair surfaces as
//! [`VaultError::TradeInProgress`].
//!
//! Every failure aborts the whole action. Mutations made before the
//! point of failure are explicitly undone (compensating ledger entry,
//! nonce restore, allowance revoke, lock release), so no partial effects
//! survive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use agentvault_audit::{AuditAction, AuditLog, MemoryAuditLog};
use agentvault_crypto::{onboarding_digest, swap_digest, MessageDigest, RecoverableSignature};
use agentvault_ledger::{BalanceKey, EntryReason, Ledger};
use agentvault_types::{Address, Amount, Result, SecurityLimits, Selector, VaultError};
use tokio::sync::RwLock;

use crate::calldata;
use crate::env::ChainEnv;
use crate::locks::TradeLocks;
use crate::nonces::NonceStore;
use crate::registry::AgentRegistry;
use crate::whitelist::VenueWhitelist;

/// Engine construction parameters
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The engine's own identity, bound into every authorization digest
    pub address: Address,
    /// The single privileged administrator
    pub admin: Address,
    /// Identity whose signature onboards new agents
    pub trusted_authority: Address,
    /// Initial security limits
    pub limits: SecurityLimits,
}

/// A fully specified swap action
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub owner: Address,
    pub agent: Address,
    pub venue: Address,
    pub input_asset: Address,
    pub output_asset: Address,
    pub input_amount: Amount,
    pub min_output: Amount,
    /// Effective fee rate of this execution, in basis points
    pub fee_bps: u16,
    /// Opaque venue instruction payload (selector-prefixed)
    pub payload: Vec<u8>,
    pub nonce: u64,
    /// Agent authorization; not required when the owner calls directly
    pub signature: Option<RecoverableSignature>,
}

impl SwapRequest {
    /// The digest the agent must sign to authorize this request on the
    /// given engine deployment
    pub fn digest(&self, engine: &Address) -> MessageDigest {
        swap_digest(
            engine,
            &self.owner,
            &self.agent,
            &self.venue,
            &self.input_asset,
            &self.output_asset,
            self.input_amount,
            self.min_output,
            self.nonce,
        )
    }
}

/// Outcome of a completed swap, with actual measured amounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    pub owner: Address,
    pub agent: Address,
    pub venue: Address,
    pub input_asset: Address,
    pub output_asset: Address,
    pub input_amount: Amount,
    /// Post-call minus pre-call balance of the output asset
    pub output_amount: Amount,
    pub nonce: u64,
}

/// Clears the engine-wide entry flag when the action finishes
struct EntryGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// The AgentVault engine
pub struct Engine {
    address: Address,
    admin: Address,
    trusted_authority: RwLock<Address>,
    limits: RwLock<SecurityLimits>,
    paused: AtomicBool,
    entered: AtomicBool,
    ledger: Ledger,
    registry: AgentRegistry,
    nonces: NonceStore,
    whitelist: VenueWhitelist,
    locks: TradeLocks,
    env: Arc<dyn ChainEnv>,
    audit: Arc<dyn AuditLog>,
}

impl Engine {
    /// Create an engine with an in-memory audit log
    pub fn new(config: EngineConfig, env: Arc<dyn ChainEnv>) -> Result<Self> {
        Self::with_audit(config, env, Arc::new(MemoryAuditLog::new()))
    }

    /// Create an engine with an explicit audit log
    pub fn with_audit(
        config: EngineConfig,
        env: Arc<dyn ChainEnv>,
        audit: Arc<dyn AuditLog>,
    ) -> Result<Self> {
        if config.address.is_zero() {
            return Err(VaultError::ZeroAddress { field: "engine" });
        }
        if config.admin.is_zero() {
            return Err(VaultError::ZeroAddress { field: "admin" });
        }
        if config.trusted_authority.is_zero() {
            return Err(VaultError::ZeroAddress {
                field: "trusted authority",
            });
        }
        if !config.limits.is_valid() {
            return Err(VaultError::InvalidAmount {
                message: "security limits must be non-zero".to_string(),
            });
        }
        Ok(Self {
            address: config.address,
            admin: config.admin,
            trusted_authority: RwLock::new(config.trusted_authority),
            limits: RwLock::new(config.limits),
            paused: AtomicBool::new(false),
            entered: AtomicBool::new(false),
            ledger: Ledger::new(),
            registry: AgentRegistry::new(),
            nonces: NonceStore::new(),
            whitelist: VenueWhitelist::new(),
            locks: TradeLocks::new(),
            env,
            audit,
        })
    }

    // ========================================================================
    // Balance-affecting operations
    // ========================================================================

    /// Deposit assets for an (owner, agent) pair
    ///
    /// The caller is the owner. The first deposit for a pair must carry
    /// an onboarding signature from the trusted authority and registers
    /// the pair; later deposits need no signature.
    pub async fn deposit(
        &self,
        caller: Address,
        agent: Address,
        asset: Address,
        amount: Amount,
        onboarding_sig: Option<&RecoverableSignature>,
    ) -> Result<()> {
        self.ensure_unpaused()?;
        let _entry = self.enter()?;

        let owner = caller;
        if owner.is_zero() {
            return Err(VaultError::ZeroAddress { field: "owner" });
        }
        if agent.is_zero() {
            return Err(VaultError::ZeroAddress { field: "agent" });
        }
        if asset.is_zero() {
            return Err(VaultError::ZeroAddress { field: "asset" });
        }
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount {
                message: "deposit amount must be greater than zero".to_string(),
            });
        }

        let newly_registered = !self.registry.is_registered(&owner, &agent);
        if newly_registered {
            let sig = onboarding_sig.ok_or(VaultError::InvalidSignature)?;
            let digest = onboarding_digest(&self.address, &owner, &agent);
            let signer = sig
                .recover(&digest)
                .map_err(|_| VaultError::InvalidSignature)?;
            if signer != *self.trusted_authority.read().await {
                return Err(VaultError::InvalidSignature);
            }
        }

        self.env
            .transfer_in(asset, owner, amount)
            .await
            .map_err(|e| VaultError::TransferFailed {
                message: e.to_string(),
            })?;

        let key = BalanceKey::new(owner, agent, asset);
        if let Err(e) = self.ledger.credit(&key, amount, EntryReason::Deposit).await {
            // Push the pulled funds back out so custody matches the ledger.
            let _ = self.env.transfer_out(asset, owner, amount).await;
            return Err(e);
        }

        if newly_registered {
            self.registry.register(owner, agent);
            self.audit
                .record(Some(owner), Some(agent), AuditAction::AgentRegistered)
                .await;
            tracing::info!(%owner, %agent, "agent registered");
        }
        self.audit
            .record(
                Some(owner),
                Some(agent),
                AuditAction::Deposited { asset, amount },
            )
            .await;
        tracing::info!(%owner, %agent, %asset, %amount, "deposit");
        Ok(())
    }

    /// Withdraw assets to a recipient
    ///
    /// The caller is the owner. An amount of zero withdraws the entire
    /// balance. Returns the actual amount moved.
    pub async fn withdraw(
        &self,
        caller: Address,
        agent: Address,
        asset: Address,
        amount: Amount,
        recipient: Address,
    ) -> Result<Amount> {
        self.ensure_unpaused()?;
        let _entry = self.enter()?;

        let owner = caller;
        if agent.is_zero() {
            return Err(VaultError::ZeroAddress { field: "agent" });
        }
        if asset.is_zero() {
            return Err(VaultError::ZeroAddress { field: "asset" });
        }
        if recipient.is_zero() {
            return Err(VaultError::InvalidRecipient);
        }
        if !self.registry.is_registered(&owner, &agent) {
            return Err(VaultError::Unauthorized { caller });
        }

        let key = BalanceKey::new(owner, agent, asset);
        let balance = self.ledger.balance(&key).await;
        let actual = if amount.is_zero() { balance } else { amount };
        if actual.is_zero() {
            return Err(VaultError::InvalidAmount {
                message: "nothing to withdraw".to_string(),
            });
        }

        self.ledger
            .debit(&key, actual, EntryReason::Withdrawal { recipient })
            .await?;

        if let Err(e) = self.env.transfer_out(asset, recipient, actual).await {
            let _ = self
                .ledger
                .credit(&key, actual, EntryReason::WithdrawalRollback { recipient })
                .await;
            return Err(VaultError::TransferFailed {
                message: e.to_string(),
            });
        }

        self.audit
            .record(
                Some(owner),
                Some(agent),
                AuditAction::Withdrawn {
                    asset,
                    amount: actual,
                    recipient,
                },
            )
            .await;
        tracing::info!(%owner, %agent, %asset, amount = %actual, %recipient, "withdrawal");
        Ok(actual)
    }

    /// Execute a swap through a whitelisted venue
    ///
    /// Callable by the owner directly, or by any relayer holding a valid
    /// agent signature over the request digest.
    pub async fn execute_swap(&self, caller: Address, req: SwapRequest) -> Result<SwapReceipt> {
        self.ensure_unpaused()?;

        // Step 1: snapshot limits, extract the selector.
        let limits = *self.limits.read().await;
        let selector = calldata::selector_of(&req.payload)?;

        // Step 2: security limits.
        if req.fee_bps > limits.max_fee_bps {
            return Err(VaultError::FeeTooHigh {
                fee_bps: req.fee_bps,
                max_bps: limits.max_fee_bps,
            });
        }
        if req.input_amount > limits.max_swap_amount {
            return Err(VaultError::ExceedsMaxSwapAmount {
                requested: req.input_amount,
                max: limits.max_swap_amount,
            });
        }

        // Step 3: per-pair trade lock, then the engine-wide entry flag.
        // Lock first, so a reentrant attempt on the same pair reports
        // TradeInProgress rather than the generic guard failure.
        self.locks.try_acquire(req.owner, req.agent)?;
        let entry = match self.enter() {
            Ok(guard) => guard,
            Err(e) => {
                self.locks.release(&req.owner, &req.agent);
                return Err(e);
            }
        };

        let result = self.swap_locked(caller, &req, selector).await;
        self.locks.release(&req.owner, &req.agent);
        drop(entry);

        match result {
            Ok(receipt) => {
                self.audit
                    .record(
                        Some(req.owner),
                        Some(req.agent),
                        AuditAction::SwapExecuted {
                            venue: receipt.venue,
                            input_asset: receipt.input_asset,
                            output_asset: receipt.output_asset,
                            input_amount: receipt.input_amount,
                            output_amount: receipt.output_amount,
                            nonce: receipt.nonce,
                        },
                    )
                    .await;
                tracing::info!(
                    owner = %receipt.owner,
                    agent = %receipt.agent,
                    venue = %receipt.venue,
                    input = %receipt.input_amount,
                    output = %receipt.output_amount,
                    nonce = receipt.nonce,
                    "swap executed"
                );
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(
                    owner = %req.owner,
                    agent = %req.agent,
                    venue = %req.venue,
                    error = %e,
                    "swap rejected"
                );
                Err(e)
            }
        }
    }

    /// Steps 4-16 of the pipeline, executed with the pair lock held
    async fn swap_locked(
        &self,
        caller: Address,
        req: &SwapRequest,
        selector: Selector,
    ) -> Result<SwapReceipt> {
        // Step 4: registration.
        if !self.registry.is_registered(&req.owner, &req.agent) {
            return Err(VaultError::Unauthorized { caller });
        }

        // Step 5: agent signature unless the owner calls directly.
        if caller != req.owner {
            let sig = req.signature.as_ref().ok_or(VaultError::InvalidSignature)?;
            let signer = sig
                .recover(&req.digest(&self.address))
                .map_err(|_| VaultError::InvalidSignature)?;
            if signer != req.agent {
                return Err(VaultError::InvalidSignature);
            }
        }

        // Step 6: nonce equality. The counter itself advances just
        // before the external call and is restored on rollback, which
        // nets out to "a failed action leaves the nonce unchanged".
        let expected = self.nonces.expected(&req.owner, &req.agent);
        if req.nonce != expected {
            return Err(VaultError::InvalidNonce {
                expected,
                got: req.nonce,
            });
        }

        // Step 7: amount and asset sanity.
        if req.input_amount.is_zero() {
            return Err(VaultError::InvalidAmount {
                message: "input amount must be greater than zero".to_string(),
            });
        }
        if req.min_output.is_zero() {
            return Err(VaultError::InvalidAmount {
                message: "minimum output must be greater than zero".to_string(),
            });
        }
        if req.input_asset.is_zero() {
            return Err(VaultError::ZeroAddress {
                field: "input asset",
            });
        }
        if req.output_asset.is_zero() {
            return Err(VaultError::ZeroAddress {
                field: "output asset",
            });
        }

        // Step 8: whitelist.
        if !self
            .whitelist
            .is_allowed(&req.owner, &req.agent, &req.venue, &selector)
        {
            return Err(VaultError::RouterNotWhitelisted {
                venue: req.venue,
                selector,
            });
        }

        // Step 9: funding.
        let in_key = BalanceKey::new(req.owner, req.agent, req.input_asset);
        let available = self.ledger.balance(&in_key).await;
        if available < req.input_amount {
            return Err(VaultError::InsufficientBalance {
                available,
                required: req.input_amount,
            });
        }

        // Step 10: payload validation.
        calldata::validate(
            &req.payload,
            &req.input_asset,
            &req.output_asset,
            req.input_amount,
        )?;

        // Step 11: snapshot the output balance, commit the debit before
        // any untrusted code runs.
        let pre = self.env.balance_of(req.output_asset, self.address).await;
        self.nonces.advance(&req.owner, &req.agent);
        if let Err(e) = self
            .ledger
            .debit(
                &in_key,
                req.input_amount,
                EntryReason::SwapDebit { venue: req.venue },
            )
            .await
        {
            self.nonces.restore(&req.owner, &req.agent);
            return Err(e);
        }

        // Step 12: bounded spending allowance for the venue.
        if let Err(e) = self
            .env
            .approve(req.input_asset, req.venue, req.input_amount)
            .await
        {
            self.rollback_swap(req).await;
            return Err(VaultError::TransferFailed {
                message: e.to_string(),
            });
        }

        // Step 13: the untrusted call.
        if let Err(e) = self.env.call(req.venue, &req.payload).await {
            self.rollback_swap(req).await;
            return Err(VaultError::SwapFailed {
                message: e.to_string(),
            });
        }

        // Step 14: measure the actual outcome; declared amounts are
        // never trusted.
        let post = self.env.balance_of(req.output_asset, self.address).await;
        let received = post.checked_sub(pre).unwrap_or(Amount::ZERO);
        if received < req.min_output {
            self.rollback_swap(req).await;
            return Err(VaultError::SwapFailed {
                message: format!(
                    "slippage: received {}, minimum {}",
                    received, req.min_output
                ),
            });
        }

        // Step 15: credit what was actually received.
        let out_key = BalanceKey::new(req.owner, req.agent, req.output_asset);
        if let Err(e) = self
            .ledger
            .credit(
                &out_key,
                received,
                EntryReason::SwapCredit { venue: req.venue },
            )
            .await
        {
            self.rollback_swap(req).await;
            return Err(e);
        }

        // Step 16: revoke any unused allowance.
        if let Err(e) = self.env.approve(req.input_asset, req.venue, Amount::ZERO).await {
            let _ = self
                .ledger
                .debit(
                    &out_key,
                    received,
                    EntryReason::SwapRollback { venue: req.venue },
                )
                .await;
            self.rollback_swap(req).await;
            return Err(VaultError::TransferFailed {
                message: e.to_string(),
            });
        }

        Ok(SwapReceipt {
            owner: req.owner,
            agent: req.agent,
            venue: req.venue,
            input_asset: req.input_asset,
            output_asset: req.output_asset,
            input_amount: req.input_amount,
            output_amount: received,
            nonce: req.nonce,
        })
    }

    /// Undo the mutations of an aborted swap: compensating input credit,
    /// allowance revoke, nonce restore. The caller releases the lock.
    async fn rollback_swap(&self, req: &SwapRequest) {
        let in_key = BalanceKey::new(req.owner, req.agent, req.input_asset);
        let _ = self
            .ledger
            .credit(
                &in_key,
                req.input_amount,
                EntryReason::SwapRollback { venue: req.venue },
            )
            .await;
        let _ = self
            .env
            .approve(req.input_asset, req.venue, Amount::ZERO)
            .await;
        self.nonces.restore(&req.owner, &req.agent);
    }

    // ========================================================================
    // Venue whitelisting
    // ========================================================================

    /// Toggle a single whitelist entry
    pub async fn set_venue_whitelist(
        &self,
        caller: Address,
        owner: Address,
        agent: Address,
        venue: Address,
        selector: Selector,
        allowed: bool,
    ) -> Result<()> {
        self.authorize_whitelist(caller, &owner, &agent)?;
        self.check_venue(&venue).await?;

        self.whitelist.set(owner, agent, venue, selector, allowed);
        self.audit
            .record(
                Some(owner),
                Some(agent),
                AuditAction::WhitelistUpdated {
                    venue,
                    selector,
                    allowed,
                },
            )
            .await;
        tracing::info!(%owner, %agent, %venue, %selector, allowed, "whitelist updated");
        Ok(())
    }

    /// Toggle many entries in one action
    ///
    /// Equal-length arrays; the whole action aborts on any entry's
    /// validation failure, leaving no entry applied.
    pub async fn set_venue_whitelist_batch(
        &self,
        caller: Address,
        owner: Address,
        agent: Address,
        venues: &[Address],
        selectors: &[Selector],
        allowed: bool,
    ) -> Result<()> {
        self.authorize_whitelist(caller, &owner, &agent)?;
        if venues.len() != selectors.len() {
            return Err(VaultError::InvalidAmount {
                message: format!(
                    "length mismatch: {} venues, {} selectors",
                    venues.len(),
                    selectors.len()
                ),
            });
        }

        // Validate every entry before applying any, so a failure aborts
        // the action without partial toggles.
        for venue in venues {
            self.check_venue(venue).await?;
        }

        for (venue, selector) in venues.iter().zip(selectors.iter()) {
            self.whitelist.set(owner, agent, *venue, *selector, allowed);
            self.audit
                .record(
                    Some(owner),
                    Some(agent),
                    AuditAction::WhitelistUpdated {
                        venue: *venue,
                        selector: *selector,
                        allowed,
                    },
                )
                .await;
        }
        tracing::info!(%owner, %agent, entries = venues.len(), allowed, "whitelist batch updated");
        Ok(())
    }

    fn authorize_whitelist(&self, caller: Address, owner: &Address, agent: &Address) -> Result<()> {
        if caller == self.admin {
            return Ok(());
        }
        if &caller == owner && self.registry.is_registered(owner, agent) {
            return Ok(());
        }
        Err(VaultError::Unauthorized { caller })
    }

    async fn check_venue(&self, venue: &Address) -> Result<()> {
        if venue.is_zero() {
            return Err(VaultError::ZeroAddress { field: "venue" });
        }
        if !self.env.has_code(*venue).await {
            return Err(VaultError::RouterNotContract { venue: *venue });
        }
        Ok(())
    }

    // ========================================================================
    // Administrative controller
    // ========================================================================

    /// Rotate the trusted-authority identity
    pub async fn rotate_trusted_authority(&self, caller: Address, new: Address) -> Result<()> {
        self.ensure_admin(caller)?;
        if new.is_zero() {
            return Err(VaultError::ZeroAddress {
                field: "trusted authority",
            });
        }
        *self.trusted_authority.write().await = new;
        self.audit
            .record(None, None, AuditAction::AuthorityRotated { new_authority: new })
            .await;
        tracing::info!(authority = %new, "trusted authority rotated");
        Ok(())
    }

    /// Replace the global security limits
    pub async fn set_security_limits(&self, caller: Address, limits: SecurityLimits) -> Result<()> {
        self.ensure_admin(caller)?;
        if !limits.is_valid() {
            return Err(VaultError::InvalidAmount {
                message: "security limits must be non-zero".to_string(),
            });
        }
        *self.limits.write().await = limits;
        self.audit
            .record(None, None, AuditAction::LimitsUpdated { limits })
            .await;
        tracing::info!(
            max_fee_bps = limits.max_fee_bps,
            max_swap = %limits.max_swap_amount,
            "security limits updated"
        );
        Ok(())
    }

    /// Engage the global pause; blocks all balance-affecting operations
    pub async fn pause(&self, caller: Address) -> Result<()> {
        self.ensure_admin(caller)?;
        self.paused.store(true, Ordering::SeqCst);
        self.audit.record(None, None, AuditAction::Paused).await;
        tracing::warn!("engine paused");
        Ok(())
    }

    /// Lift the global pause
    pub async fn unpause(&self, caller: Address) -> Result<()> {
        self.ensure_admin(caller)?;
        self.paused.store(false, Ordering::SeqCst);
        self.audit.record(None, None, AuditAction::Unpaused).await;
        tracing::info!("engine unpaused");
        Ok(())
    }

    /// Force-clear a stuck trade lock (operational runbook step)
    ///
    /// Returns whether a lock was actually set.
    pub async fn force_clear_trade_lock(
        &self,
        caller: Address,
        owner: Address,
        agent: Address,
    ) -> Result<bool> {
        self.ensure_admin(caller)?;
        let was_locked = self.locks.force_clear(&owner, &agent);
        self.audit
            .record(Some(owner), Some(agent), AuditAction::TradeLockCleared)
            .await;
        tracing::warn!(%owner, %agent, was_locked, "trade lock force-cleared");
        Ok(was_locked)
    }

    /// Sweep on-hand funds that are not attributable to the ledger
    ///
    /// Still available while paused (emergency recovery). Ledger-backed
    /// holdings can never be swept.
    pub async fn sweep(
        &self,
        caller: Address,
        asset: Address,
        amount: Amount,
        recipient: Address,
    ) -> Result<()> {
        self.ensure_admin(caller)?;
        let _entry = self.enter()?;

        if asset.is_zero() {
            return Err(VaultError::ZeroAddress { field: "asset" });
        }
        if recipient.is_zero() {
            return Err(VaultError::InvalidRecipient);
        }
        if amount.is_zero() {
            return Err(VaultError::InvalidAmount {
                message: "sweep amount must be greater than zero".to_string(),
            });
        }

        let on_hand = self.env.balance_of(asset, self.address).await;
        let tracked = self.ledger.asset_total(&asset).await?;
        let sweepable = on_hand.checked_sub(tracked).unwrap_or(Amount::ZERO);
        if amount > sweepable {
            return Err(VaultError::InsufficientBalance {
                available: sweepable,
                required: amount,
            });
        }

        self.env
            .transfer_out(asset, recipient, amount)
            .await
            .map_err(|e| VaultError::TransferFailed {
                message: e.to_string(),
            })?;

        self.audit
            .record(
                None,
                None,
                AuditAction::Swept {
                    asset,
                    amount,
                    recipient,
                },
            )
            .await;
        tracing::info!(%asset, %amount, %recipient, "unattributed funds swept");
        Ok(())
    }

    // ========================================================================
    // Read-only queries
    // ========================================================================

    /// Ledger balance for (owner, agent, asset)
    pub async fn balance(&self, owner: &Address, agent: &Address, asset: &Address) -> Amount {
        self.ledger
            .balance(&BalanceKey::new(*owner, *agent, *asset))
            .await
    }

    /// The next valid nonce for the pair
    pub fn expected_nonce(&self, owner: &Address, agent: &Address) -> u64 {
        self.nonces.expected(owner, agent)
    }

    /// Whether the pair has completed onboarding
    pub fn is_registered(&self, owner: &Address, agent: &Address) -> bool {
        self.registry.is_registered(owner, agent)
    }

    /// Whether (owner, agent, venue, selector) is whitelisted
    pub fn is_whitelisted(
        &self,
        owner: &Address,
        agent: &Address,
        venue: &Address,
        selector: &Selector,
    ) -> bool {
        self.whitelist.is_allowed(owner, agent, venue, selector)
    }

    /// Whether a swap for the pair is mid-execution
    pub fn is_locked(&self, owner: &Address, agent: &Address) -> bool {
        self.locks.is_locked(owner, agent)
    }

    /// Whether the global pause is engaged
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Current security limits
    pub async fn security_limits(&self) -> SecurityLimits {
        *self.limits.read().await
    }

    /// Current trusted-authority identity
    pub async fn trusted_authority(&self) -> Address {
        *self.trusted_authority.read().await
    }

    /// The engine's own identity
    pub fn address(&self) -> Address {
        self.address
    }

    /// The administrator identity
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// The underlying ledger (read access for reconciliation)
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The audit log
    pub fn audit_log(&self) -> &Arc<dyn AuditLog> {
        &self.audit
    }

    // ========================================================================
    // Internal guards
    // ========================================================================

    fn ensure_admin(&self, caller: Address) -> Result<()> {
        if caller != self.admin {
            return Err(VaultError::Unauthorized { caller });
        }
        Ok(())
    }

    fn ensure_unpaused(&self) -> Result<()> {
        if self.is_paused() {
            return Err(VaultError::Paused);
        }
        Ok(())
    }

    /// Raise the engine-wide entry flag; nested entry fails fast
    fn enter(&self) -> Result<EntryGuard<'_>> {
        if self.entered.swap(true, Ordering::SeqCst) {
            return Err(VaultError::ReentrantCall);
        }
        Ok(EntryGuard {
            flag: &self.entered,
        })
    }
}
