//! Shared test harness: a scriptable in-memory settlement environment
//! plus a fully wired engine with generated authority and agent keys.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, OnceLock};

use agentvault_crypto::{onboarding_digest, KeyPair, RecoverableSignature};
use agentvault_engine::{ChainEnv, Engine, EngineConfig, EnvError, SwapRequest};
use agentvault_types::{Address, Amount, SecurityLimits, Selector, VaultError};

pub const ENGINE_ADDR: Address = Address([0xEE; 20]);
pub const ADMIN: Address = Address([0xAD; 20]);
pub const OWNER: Address = Address([0x10; 20]);
pub const RELAYER: Address = Address([0x99; 20]);
pub const ASSET_A: Address = Address([0xA1; 20]);
pub const ASSET_C: Address = Address([0xC1; 20]);
pub const VENUE: Address = Address([0x5E; 20]);

/// What a scripted venue does when called
#[derive(Clone, Default)]
pub struct VenueScript {
    /// Pull this much of an asset from the engine, consuming allowance
    pub take: Option<(Address, Amount)>,
    /// Deliver this much of an asset to the engine
    pub give: Option<(Address, Amount)>,
    /// Revert instead of executing
    pub fail: bool,
    /// Call back into the engine before executing (adversarial venue)
    pub reenter: Option<ReenterKind>,
}

/// The nested call an adversarial venue attempts
#[derive(Clone)]
pub enum ReenterKind {
    Swap {
        caller: Address,
        req: Box<SwapRequest>,
    },
    Deposit {
        caller: Address,
        agent: Address,
        asset: Address,
        amount: Amount,
    },
}

/// In-memory settlement environment with scriptable venues
pub struct MockEnv {
    engine_address: Address,
    balances: Mutex<HashMap<(Address, Address), Amount>>,
    code: Mutex<HashSet<Address>>,
    approvals: Mutex<HashMap<(Address, Address), Amount>>,
    scripts: Mutex<HashMap<Address, VenueScript>>,
    reentry_target: OnceLock<Arc<Engine>>,
    reentry_result: Mutex<Option<VaultError>>,
}

impl MockEnv {
    pub fn new(engine_address: Address) -> Self {
        Self {
            engine_address,
            balances: Mutex::new(HashMap::new()),
            code: Mutex::new(HashSet::new()),
            approvals: Mutex::new(HashMap::new()),
            scripts: Mutex::new(HashMap::new()),
            reentry_target: OnceLock::new(),
            reentry_result: Mutex::new(None),
        }
    }

    pub fn set_balance(&self, asset: Address, holder: Address, amount: Amount) {
        self.balances.lock().unwrap().insert((asset, holder), amount);
    }

    pub fn balance(&self, asset: Address, holder: Address) -> Amount {
        self.balances
            .lock()
            .unwrap()
            .get(&(asset, holder))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Mark an address as having deployed code
    pub fn deploy(&self, addr: Address) {
        self.code.lock().unwrap().insert(addr);
    }

    pub fn script(&self, venue: Address, script: VenueScript) {
        self.scripts.lock().unwrap().insert(venue, script);
    }

    pub fn approval(&self, asset: Address, spender: Address) -> Amount {
        self.approvals
            .lock()
            .unwrap()
            .get(&(asset, spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Wire the engine an adversarial venue calls back into
    pub fn set_reentry_target(&self, engine: Arc<Engine>) {
        let _ = self.reentry_target.set(engine);
    }

    /// The error the last nested callback produced, if any
    pub fn take_reentry_result(&self) -> Option<VaultError> {
        self.reentry_result.lock().unwrap().take()
    }

    fn move_balance(
        &self,
        asset: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), EnvError> {
        let mut balances = self.balances.lock().unwrap();
        let held = balances.get(&(asset, from)).copied().unwrap_or(Amount::ZERO);
        let remaining = held
            .checked_sub(amount)
            .ok_or_else(|| EnvError::Transfer(format!("{from} holds {held}, needs {amount}")))?;
        balances.insert((asset, from), remaining);
        let dest = balances.get(&(asset, to)).copied().unwrap_or(Amount::ZERO);
        balances.insert((asset, to), dest.checked_add(amount).unwrap_or(dest));
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChainEnv for MockEnv {
    async fn has_code(&self, addr: Address) -> bool {
        self.code.lock().unwrap().contains(&addr)
    }

    async fn balance_of(&self, asset: Address, holder: Address) -> Amount {
        self.balance(asset, holder)
    }

    async fn transfer_in(
        &self,
        asset: Address,
        from: Address,
        amount: Amount,
    ) -> Result<(), EnvError> {
        self.move_balance(asset, from, self.engine_address, amount)
    }

    async fn transfer_out(
        &self,
        asset: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), EnvError> {
        self.move_balance(asset, self.engine_address, to, amount)
    }

    async fn approve(
        &self,
        asset: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), EnvError> {
        self.approvals.lock().unwrap().insert((asset, spender), amount);
        Ok(())
    }

    async fn call(&self, venue: Address, _payload: &[u8]) -> Result<(), EnvError> {
        let script = {
            let scripts = self.scripts.lock().unwrap();
            scripts.get(&venue).cloned()
        };
        let Some(script) = script else {
            return Err(EnvError::Call(format!("no executable contract at {venue}")));
        };

        // Adversarial callback happens before the venue settles.
        if let Some(kind) = script.reenter {
            if let Some(engine) = self.reentry_target.get().cloned() {
                let outcome = match kind {
                    ReenterKind::Swap { caller, req } => {
                        engine.execute_swap(caller, *req).await.map(|_| ())
                    }
                    ReenterKind::Deposit {
                        caller,
                        agent,
                        asset,
                        amount,
                    } => engine.deposit(caller, agent, asset, amount, None).await,
                };
                *self.reentry_result.lock().unwrap() = outcome.err();
            }
        }

        if script.fail {
            return Err(EnvError::Call("venue execution reverted".to_string()));
        }

        if let Some((asset, amount)) = script.take {
            let mut approvals = self.approvals.lock().unwrap();
            let allowance = approvals
                .get(&(asset, venue))
                .copied()
                .unwrap_or(Amount::ZERO);
            let remaining = allowance.checked_sub(amount).ok_or_else(|| {
                EnvError::Call(format!("allowance {allowance} below pull {amount}"))
            })?;
            approvals.insert((asset, venue), remaining);
            drop(approvals);
            self.move_balance(asset, self.engine_address, venue, amount)
                .map_err(|e| EnvError::Call(e.to_string()))?;
        }

        if let Some((asset, amount)) = script.give {
            let mut balances = self.balances.lock().unwrap();
            let held = balances
                .get(&(asset, self.engine_address))
                .copied()
                .unwrap_or(Amount::ZERO);
            balances.insert(
                (asset, self.engine_address),
                held.checked_add(amount).unwrap_or(held),
            );
        }
        Ok(())
    }
}

/// A wired-up engine with generated keys and a deployed default venue
pub struct Harness {
    pub engine: Arc<Engine>,
    pub env: Arc<MockEnv>,
    pub authority: KeyPair,
    pub agent_key: KeyPair,
    pub agent: Address,
}

impl Harness {
    pub fn new() -> Self {
        let authority = KeyPair::generate();
        let agent_key = KeyPair::generate();
        let agent = agent_key.address();

        let env = Arc::new(MockEnv::new(ENGINE_ADDR));
        env.deploy(VENUE);

        let config = EngineConfig {
            address: ENGINE_ADDR,
            admin: ADMIN,
            trusted_authority: authority.address(),
            limits: SecurityLimits::new(100, Amount::new(1_000_000)),
        };
        let engine = Arc::new(Engine::new(config, env.clone()).expect("valid config"));
        env.set_reentry_target(engine.clone());

        Self {
            engine,
            env,
            authority,
            agent_key,
            agent,
        }
    }

    /// A trusted-authority signature onboarding (OWNER, agent)
    pub fn onboarding_sig(&self) -> RecoverableSignature {
        let digest = onboarding_digest(&ENGINE_ADDR, &OWNER, &self.agent);
        self.authority.sign_digest(&digest).expect("signing")
    }

    /// Fund OWNER and complete the onboarding deposit
    pub async fn onboard_with_deposit(&self, asset: Address, amount: Amount) {
        self.env.set_balance(asset, OWNER, amount);
        self.engine
            .deposit(OWNER, self.agent, asset, amount, Some(&self.onboarding_sig()))
            .await
            .expect("onboarding deposit");
    }

    /// Whitelist (VENUE, selector) for the pair, acting as admin
    pub async fn whitelist(&self, selector: Selector) {
        self.engine
            .set_venue_whitelist(ADMIN, OWNER, self.agent, VENUE, selector, true)
            .await
            .expect("whitelist");
    }

    /// Build an exact-input swap request through VENUE, signed by the agent
    pub fn swap_request(
        &self,
        input_amount: Amount,
        min_output: Amount,
        nonce: u64,
    ) -> SwapRequest {
        let payload = agentvault_engine::calldata::encode_exact_input(
            &ASSET_A,
            &ASSET_C,
            input_amount,
            min_output,
            &ENGINE_ADDR,
        );
        let mut req = SwapRequest {
            owner: OWNER,
            agent: self.agent,
            venue: VENUE,
            input_asset: ASSET_A,
            output_asset: ASSET_C,
            input_amount,
            min_output,
            fee_bps: 30,
            payload,
            nonce,
            signature: None,
        };
        let sig = self
            .agent_key
            .sign_digest(&req.digest(&ENGINE_ADDR))
            .expect("signing");
        req.signature = Some(sig);
        req
    }
}
