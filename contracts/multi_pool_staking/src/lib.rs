#![no_std]

pub mod errors;
pub mod events;
pub mod pool;
pub mod position;
pub mod rewards;

use common::{access_control, pausable, ReentrancyGuard};
use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, token, Address, BytesN, Env, Symbol, Vec,
};

pub use common::{Feature, Role};
pub use errors::{ContractError, ErrorCategory};
pub use pool::{Pool, StakeAsset};
pub use position::{UnstakeRequest, UserPosition};

use errors::checked;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const CONFIG: Symbol = symbol_short!("CONFIG");

const DAY_IN_LEDGERS: u32 = 17_280;
const INSTANCE_TTL_THRESHOLD: u32 = 30 * DAY_IN_LEDGERS;
const INSTANCE_TTL_EXTEND_TO: u32 = 120 * DAY_IN_LEDGERS;

// ── Configuration ────────────────────────────────────────────────────────────

/// Contract-wide settings fixed at initialization, except for the emission
/// rate which a pool manager may change.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakingConfig {
    /// Stellar Asset Contract of the native asset; backs the `Native` pool.
    pub native_token: Address,
    /// Token paid out by `claim_reward`. Never stakeable.
    pub reward_token: Address,
    /// Reward emitted per ledger across all pools, split by weight.
    pub reward_per_height: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct MultiPoolStakingContract;

#[contractimpl]
impl MultiPoolStakingContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract and grant every role to `admin`.
    ///
    /// * `native_token`      – SAC address of the native asset.
    /// * `reward_token`      – SAC address of the token distributed as rewards.
    /// * `reward_per_height` – reward emitted per ledger across all pools.
    pub fn initialize(
        env: Env,
        admin: Address,
        native_token: Address,
        reward_token: Address,
        reward_per_height: i128,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        admin.require_auth();

        if reward_per_height < 0 {
            return Err(ContractError::InvalidRewardRate);
        }
        if native_token == reward_token {
            return Err(ContractError::TokensIdentical);
        }

        let config = StakingConfig {
            native_token: native_token.clone(),
            reward_token: reward_token.clone(),
            reward_per_height,
        };
        env.storage().instance().set(&CONFIG, &config);
        env.storage().instance().set(&INITIALIZED, &true);
        access_control::bootstrap(&env, &admin);
        Self::extend_instance_ttl(&env);

        events::publish_initialized(&env, admin, native_token, reward_token, reward_per_height);

        Ok(())
    }

    // ── Pool administration ─────────────────────────────────────────────────

    /// Register a pool for `asset` and return its id.
    ///
    /// The first pool must be `StakeAsset::Native`. Every other pool accrues
    /// up to this height first, because the new weight dilutes their share
    /// from here on.
    ///
    /// Requires `PoolManager`.
    pub fn create_pool(
        env: Env,
        caller: Address,
        asset: StakeAsset,
        weight: u32,
        min_deposit: i128,
        lock_period: u32,
    ) -> Result<u32, ContractError> {
        let config = Self::load_config(&env)?;
        caller.require_auth();
        Self::require_role(&env, Role::PoolManager, &caller)?;

        pool::accrue_all(&env, config.reward_per_height)?;
        let pool_id = pool::register(
            &env,
            &config,
            asset.clone(),
            weight,
            min_deposit,
            lock_period,
        )?;
        Self::extend_instance_ttl(&env);

        events::publish_pool_created(&env, pool_id, asset, weight, min_deposit, lock_period);

        Ok(pool_id)
    }

    /// Change a pool's weight, minimum deposit and lock period.
    ///
    /// All pools are accrued at the old weights before the change. A new
    /// lock period applies to future unstake requests only.
    ///
    /// Requires `PoolManager`.
    pub fn set_pool_params(
        env: Env,
        caller: Address,
        pool_id: u32,
        weight: u32,
        min_deposit: i128,
        lock_period: u32,
    ) -> Result<(), ContractError> {
        let config = Self::load_config(&env)?;
        caller.require_auth();
        Self::require_role(&env, Role::PoolManager, &caller)?;

        pool::accrue_all(&env, config.reward_per_height)?;
        pool::update_params(&env, pool_id, weight, min_deposit, lock_period)?;
        Self::extend_instance_ttl(&env);

        events::publish_pool_updated(
            &env,
            pool_id,
            weight,
            min_deposit,
            lock_period,
            pool::total_weight(&env),
        );

        Ok(())
    }

    /// Update the global emission rate.
    ///
    /// Every pool is flushed at the current rate *before* the rate changes,
    /// so stakers never lose or gain rewards retroactively.
    ///
    /// Requires `PoolManager`.
    pub fn set_reward_per_height(
        env: Env,
        caller: Address,
        reward_per_height: i128,
    ) -> Result<(), ContractError> {
        let mut config = Self::load_config(&env)?;
        caller.require_auth();
        Self::require_role(&env, Role::PoolManager, &caller)?;

        if reward_per_height < 0 {
            return Err(ContractError::InvalidRewardRate);
        }

        pool::accrue_all(&env, config.reward_per_height)?;
        config.reward_per_height = reward_per_height;
        env.storage().instance().set(&CONFIG, &config);
        Self::extend_instance_ttl(&env);

        events::publish_reward_rate_set(&env, reward_per_height);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` of the pool's asset.
    ///
    /// The pool accumulator is advanced and the user's reward settled first,
    /// so the new stake earns nothing retroactively.
    pub fn deposit(env: Env, user: Address, pool_id: u32, amount: i128) -> Result<(), ContractError> {
        let config = Self::load_config(&env)?;
        user.require_auth();
        pausable::require_not_paused(&env, Feature::Staking)?;
        let _guard = Self::enter(&env)?;

        let mut pool = pool::load(&env, pool_id)?;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if amount < pool.min_deposit {
            return Err(ContractError::BelowMinDeposit);
        }

        // 1. Flush the pool accumulator then settle this user.
        pool::accrue(&env, &mut pool, config.reward_per_height, pool::total_weight(&env));
        let mut position = position::load(&env, pool_id, &user);
        position.settle(&pool.acc_reward_per_share)?;

        let new_stake = checked(position.staked.checked_add(amount))?;
        let new_total = checked(pool.total_staked.checked_add(amount))?;

        // 2. Pull tokens from the user into the contract.
        Self::asset_client(&env, &config, &pool.asset).transfer(
            &user,
            &env.current_contract_address(),
            &amount,
        );

        // 3. Increase the user's stake and the pool total, then re-snapshot.
        position.staked = new_stake;
        pool.total_staked = new_total;
        position.sync_debt(&pool.acc_reward_per_share);

        pool::save(&env, pool_id, &pool);
        position::save(&env, pool_id, &user, &position);
        Self::extend_instance_ttl(&env);

        events::publish_deposited(&env, user, pool_id, amount);

        Ok(())
    }

    // ── Unstaking ───────────────────────────────────────────────────────────

    /// Queue `amount` for withdrawal after the pool's lock period and return
    /// the release height.
    ///
    /// The stake stops earning immediately; the value is only returned by a
    /// later `withdraw`.
    pub fn request_unstake(
        env: Env,
        user: Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<u32, ContractError> {
        let config = Self::load_config(&env)?;
        user.require_auth();
        pausable::require_not_paused(&env, Feature::Unstaking)?;
        let _guard = Self::enter(&env)?;

        let mut pool = pool::load(&env, pool_id)?;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        let mut position = position::load(&env, pool_id, &user);
        if amount > position.staked {
            return Err(ContractError::InsufficientStake);
        }

        // 1. Flush rewards before reducing stake.
        pool::accrue(&env, &mut pool, config.reward_per_height, pool::total_weight(&env));
        position.settle(&pool.acc_reward_per_share)?;

        // 2. Reduce the stake and the pool total.
        position.staked -= amount;
        pool.total_staked = checked(pool.total_staked.checked_sub(amount))?;
        position.sync_debt(&pool.acc_reward_per_share);

        // 3. Queue the time-locked request.
        let release_height = env.ledger().sequence().saturating_add(pool.lock_period);
        position.requests.push_back(UnstakeRequest {
            amount,
            release_height,
        });

        pool::save(&env, pool_id, &pool);
        position::save(&env, pool_id, &user, &position);
        Self::extend_instance_ttl(&env);

        events::publish_unstake_requested(&env, user, pool_id, amount, release_height);

        Ok(release_height)
    }

    /// Pay out every unstake request whose release height has been reached,
    /// in one transfer, and return the amount.
    ///
    /// Fails with `NothingWithdrawable` if no request has matured.
    pub fn withdraw(env: Env, user: Address, pool_id: u32) -> Result<i128, ContractError> {
        let config = Self::load_config(&env)?;
        user.require_auth();
        pausable::require_not_paused(&env, Feature::Withdraw)?;
        let _guard = Self::enter(&env)?;

        let pool = pool::load(&env, pool_id)?;
        let mut position = position::load(&env, pool_id, &user);
        let amount = position.take_matured(&env, env.ledger().sequence())?;
        if amount == 0 {
            return Err(ContractError::NothingWithdrawable);
        }

        // Drop the requests before transfer (checks-effects-interactions).
        position::save(&env, pool_id, &user, &position);
        Self::extend_instance_ttl(&env);

        Self::asset_client(&env, &config, &pool.asset).transfer(
            &env.current_contract_address(),
            &user,
            &amount,
        );

        events::publish_withdrawn(&env, user, pool_id, amount);

        Ok(amount)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Claim everything `user` has earned in `pool_id` and return the amount.
    ///
    /// Pays in full or not at all: if the contract's reward-token balance is
    /// short, the call fails with `InsufficientRewardBalance` and the position
    /// is left as it was.
    pub fn claim_reward(env: Env, user: Address, pool_id: u32) -> Result<i128, ContractError> {
        let config = Self::load_config(&env)?;
        user.require_auth();
        pausable::require_not_paused(&env, Feature::Claim)?;
        let _guard = Self::enter(&env)?;

        let mut pool = pool::load(&env, pool_id)?;
        pool::accrue(&env, &mut pool, config.reward_per_height, pool::total_weight(&env));

        let mut position = position::load(&env, pool_id, &user);
        let owed = position.owed(&pool.acc_reward_per_share)?;
        if owed <= 0 {
            return Err(ContractError::NothingToClaim);
        }

        let reward_token = token::Client::new(&env, &config.reward_token);
        if reward_token.balance(&env.current_contract_address()) < owed {
            return Err(ContractError::InsufficientRewardBalance);
        }

        position.pending_reward = 0;
        position.sync_debt(&pool.acc_reward_per_share);
        pool::save(&env, pool_id, &pool);
        position::save(&env, pool_id, &user, &position);
        Self::extend_instance_ttl(&env);

        reward_token.transfer(&env.current_contract_address(), &user, &owed);

        events::publish_reward_claimed(&env, user, pool_id, owed);

        Ok(owed)
    }

    // ── Pause switches ───────────────────────────────────────────────────────

    /// Engage or release the switch for one feature.
    ///
    /// Requires `PauseGuardian`.
    pub fn set_feature_paused(
        env: Env,
        caller: Address,
        feature: Feature,
        paused: bool,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, Role::PauseGuardian, &caller)?;

        pausable::set_feature_paused(&env, feature, paused);
        Self::extend_instance_ttl(&env);

        events::publish_pause_changed(&env, caller, Some(feature), paused);

        Ok(())
    }

    /// Engage or release the global override, which blocks staking,
    /// unstaking, withdrawals and claims regardless of their own switches.
    ///
    /// Requires `PauseGuardian`.
    pub fn set_global_pause(env: Env, caller: Address, paused: bool) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, Role::PauseGuardian, &caller)?;

        pausable::set_global_paused(&env, paused);
        Self::extend_instance_ttl(&env);

        events::publish_pause_changed(&env, caller, None, paused);

        Ok(())
    }

    // ── Role management ──────────────────────────────────────────────────────

    /// Grant `role` to `account`. Only a `SuperAdmin` may call this.
    pub fn grant_role(
        env: Env,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if access_control::grant_role(&env, &caller, role, &account)? {
            events::publish_role_granted(&env, caller, role, account);
        }
        Ok(())
    }

    /// Revoke `role` from `account`. Only a `SuperAdmin` may call this, and
    /// the last `SuperAdmin` cannot be removed.
    pub fn revoke_role(
        env: Env,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if access_control::revoke_role(&env, &caller, role, &account)? {
            events::publish_role_revoked(&env, caller, role, account);
        }
        Ok(())
    }

    // ── Upgrade ──────────────────────────────────────────────────────────────

    /// Swap the contract code for `wasm_hash`. Storage is kept as is.
    ///
    /// Requires `Upgrader`.
    pub fn upgrade(env: Env, caller: Address, wasm_hash: BytesN<32>) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_role(&env, Role::Upgrader, &caller)?;

        events::publish_upgraded(&env, caller, wasm_hash.clone());
        env.deployer().update_current_contract_wasm(wasm_hash);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_config(env: Env) -> Result<StakingConfig, ContractError> {
        Self::load_config(&env)
    }

    pub fn reward_per_height(env: Env) -> Result<i128, ContractError> {
        Ok(Self::load_config(&env)?.reward_per_height)
    }

    pub fn pool_count(env: Env) -> u32 {
        pool::pool_count(&env)
    }

    pub fn total_weight(env: Env) -> u64 {
        pool::total_weight(&env)
    }

    /// Return a pool's stored state. The accumulator reflects the last
    /// interaction, not the current height.
    pub fn get_pool(env: Env, pool_id: u32) -> Result<Pool, ContractError> {
        pool::load(&env, pool_id)
    }

    /// Return the id of the pool registered for `asset`, if any.
    pub fn pool_id_of(env: Env, asset: StakeAsset) -> Option<u32> {
        let config = Self::load_config(&env).ok()?;
        pool::find_by_address(&env, &pool::asset_address(&config, &asset))
    }

    /// Return the stored position; all zero if `user` never deposited.
    pub fn get_position(env: Env, pool_id: u32, user: Address) -> UserPosition {
        position::load(&env, pool_id, &user)
    }

    /// Return the reward `user` could claim right now, without mutating state.
    pub fn pending_reward(env: Env, pool_id: u32, user: Address) -> Result<i128, ContractError> {
        let config = Self::load_config(&env)?;
        let pool = pool::load(&env, pool_id)?;
        let acc =
            pool::projected_acc(&env, &pool, config.reward_per_height, pool::total_weight(&env));
        position::load(&env, pool_id, &user).owed(&acc)
    }

    pub fn get_unstake_requests(env: Env, pool_id: u32, user: Address) -> Vec<UnstakeRequest> {
        position::load(&env, pool_id, &user).requests
    }

    /// Return what `withdraw` would pay at the current height.
    pub fn withdrawable_amount(env: Env, pool_id: u32, user: Address) -> Result<i128, ContractError> {
        position::load(&env, pool_id, &user).matured_amount(env.ledger().sequence())
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access_control::has_role(&env, role, &account)
    }

    pub fn is_feature_paused(env: Env, feature: Feature) -> bool {
        pausable::is_feature_paused(&env, feature)
    }

    pub fn is_globally_paused(env: Env) -> bool {
        pausable::is_globally_paused(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: revert if the contract is not yet initialized.
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn load_config(env: &Env) -> Result<StakingConfig, ContractError> {
        env.storage()
            .instance()
            .get(&CONFIG)
            .ok_or(ContractError::NotInitialized)
    }

    /// Guard: revert if `caller` does not hold `role`.
    fn require_role(env: &Env, role: Role, caller: &Address) -> Result<(), ContractError> {
        if !access_control::has_role(env, role, caller) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Guard: take the call-scoped lock, released when the returned value
    /// goes out of scope.
    fn enter(env: &Env) -> Result<ReentrancyGuard, ContractError> {
        ReentrancyGuard::enter(env).ok_or(ContractError::Reentrancy)
    }

    fn asset_client<'a>(
        env: &'a Env,
        config: &StakingConfig,
        asset: &StakeAsset,
    ) -> token::Client<'a> {
        token::Client::new(env, &pool::asset_address(config, asset))
    }

    fn extend_instance_ttl(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND_TO);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
