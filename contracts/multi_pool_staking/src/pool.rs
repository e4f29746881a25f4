use soroban_sdk::{contracttype, log, symbol_short, Address, Env, Symbol, I256};

use crate::errors::{checked, ContractError};
use crate::rewards;
use crate::StakingConfig;

// ── Storage key constants ───────────────────────────────────────────────────

const POOL: Symbol = symbol_short!("POOL");
const ASSET_INDEX: Symbol = symbol_short!("ASSET_IX");
const POOL_COUNT: Symbol = symbol_short!("POOL_CNT");
const TOTAL_WEIGHT: Symbol = symbol_short!("TOT_WGT");

const DAY_IN_LEDGERS: u32 = 17_280;
const TTL_THRESHOLD: u32 = 30 * DAY_IN_LEDGERS;
const TTL_EXTEND_TO: u32 = 120 * DAY_IN_LEDGERS;

// ── Types ───────────────────────────────────────────────────────────────────

/// Asset accepted by a pool.
///
/// `Native` is the reserved sentinel for the network's native asset and may
/// only be used by pool 0. Its transfers go through the native Stellar Asset
/// Contract configured at initialization.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StakeAsset {
    Native,
    Token(Address),
}

/// Accounting bucket for one staked asset.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    pub asset: StakeAsset,
    /// Share of the global emission: `weight / total_weight`.
    pub weight: u32,
    /// Ledger sequence at which `acc_reward_per_share` was last advanced.
    pub last_accrual_height: u32,
    /// Reward per staked unit, scaled by `rewards::ACC_PRECISION`.
    pub acc_reward_per_share: I256,
    /// Sum of every position's active stake.
    pub total_staked: i128,
    pub min_deposit: i128,
    /// Heights an unstake request waits before it can be withdrawn.
    pub lock_period: u32,
}

// ── Storage helpers ─────────────────────────────────────────────────────────

fn pool_key(pool_id: u32) -> (Symbol, u32) {
    (POOL, pool_id)
}

fn asset_index_key(address: &Address) -> (Symbol, Address) {
    (ASSET_INDEX, address.clone())
}

pub fn pool_count(env: &Env) -> u32 {
    env.storage().instance().get(&POOL_COUNT).unwrap_or(0)
}

pub fn total_weight(env: &Env) -> u64 {
    env.storage().instance().get(&TOTAL_WEIGHT).unwrap_or(0)
}

pub fn load(env: &Env, pool_id: u32) -> Result<Pool, ContractError> {
    env.storage()
        .persistent()
        .get(&pool_key(pool_id))
        .ok_or(ContractError::PoolNotFound)
}

pub fn save(env: &Env, pool_id: u32, pool: &Pool) {
    let key = pool_key(pool_id);
    env.storage().persistent().set(&key, pool);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Token contract that moves the pool's asset.
pub fn asset_address(config: &StakingConfig, asset: &StakeAsset) -> Address {
    match asset {
        StakeAsset::Native => config.native_token.clone(),
        StakeAsset::Token(address) => address.clone(),
    }
}

/// Pool registered for the given token contract, if any.
pub fn find_by_address(env: &Env, address: &Address) -> Option<u32> {
    env.storage().persistent().get(&asset_index_key(address))
}

// ── Accrual ─────────────────────────────────────────────────────────────────

/// Advance `pool` to the current ledger sequence.
///
/// Idempotent within one height, and never fails. With nothing staked the
/// clock moves but the accumulator does not, so emission during that window
/// is not banked for anyone. The same holds for a window whose per-unit step
/// would not fit in `i128`.
pub fn accrue(env: &Env, pool: &mut Pool, reward_per_height: i128, total_weight: u64) {
    let current = env.ledger().sequence();
    if current <= pool.last_accrual_height {
        return;
    }
    if pool.total_staked > 0 {
        let elapsed = current - pool.last_accrual_height;
        let reward =
            rewards::pool_reward(env, elapsed, reward_per_height, pool.weight, total_weight);
        match rewards::acc_increment(env, &reward, pool.total_staked) {
            Some(step) => pool.acc_reward_per_share = pool.acc_reward_per_share.add(&step),
            None => log!(env, "accrual window dropped", elapsed, pool.total_staked),
        }
    }
    pool.last_accrual_height = current;
}

/// Accrue and persist every pool. Runs before any change to the emission
/// rate or to the weight distribution, so past heights are paid at the terms
/// that were in force. Cost is bounded by the number of pools.
pub fn accrue_all(env: &Env, reward_per_height: i128) -> Result<(), ContractError> {
    let count = pool_count(env);
    let weight_sum = total_weight(env);
    for pool_id in 0..count {
        let mut pool = load(env, pool_id)?;
        accrue(env, &mut pool, reward_per_height, weight_sum);
        save(env, pool_id, &pool);
    }
    log!(env, "accrued pools", count, env.ledger().sequence());
    Ok(())
}

/// Accumulator as of the current height, without writing.
pub fn projected_acc(env: &Env, pool: &Pool, reward_per_height: i128, total_weight: u64) -> I256 {
    rewards::projected_acc(
        env,
        &pool.acc_reward_per_share,
        pool.last_accrual_height,
        env.ledger().sequence(),
        pool.total_staked,
        reward_per_height,
        pool.weight,
        total_weight,
    )
}

// ── Registry ────────────────────────────────────────────────────────────────

fn validate_params(weight: u32, min_deposit: i128, lock_period: u32) -> Result<(), ContractError> {
    if weight == 0 {
        return Err(ContractError::InvalidWeight);
    }
    if lock_period == 0 {
        return Err(ContractError::InvalidLockPeriod);
    }
    if min_deposit < 0 {
        return Err(ContractError::InvalidAmount);
    }
    Ok(())
}

/// Append a new pool and return its id.
///
/// The registry must open with the native pool, and every token contract may
/// back at most one pool. The reward token can never be staked. Existing pools
/// must already be accrued, since the new weight dilutes their share from this
/// height on.
pub fn register(
    env: &Env,
    config: &StakingConfig,
    asset: StakeAsset,
    weight: u32,
    min_deposit: i128,
    lock_period: u32,
) -> Result<u32, ContractError> {
    let pool_id = pool_count(env);
    if pool_id == 0 && asset != StakeAsset::Native {
        return Err(ContractError::InvalidFirstPool);
    }

    let address = asset_address(config, &asset);
    if find_by_address(env, &address).is_some() {
        return Err(ContractError::DuplicateAsset);
    }
    if address == config.reward_token {
        return Err(ContractError::TokensIdentical);
    }
    validate_params(weight, min_deposit, lock_period)?;

    let new_total = checked(total_weight(env).checked_add(u64::from(weight)))?;
    let next_count = checked(pool_id.checked_add(1))?;

    let pool = Pool {
        asset,
        weight,
        last_accrual_height: env.ledger().sequence(),
        acc_reward_per_share: rewards::zero(env),
        total_staked: 0,
        min_deposit,
        lock_period,
    };
    save(env, pool_id, &pool);

    let index_key = asset_index_key(&address);
    env.storage().persistent().set(&index_key, &pool_id);
    env.storage()
        .persistent()
        .extend_ttl(&index_key, TTL_THRESHOLD, TTL_EXTEND_TO);
    env.storage().instance().set(&POOL_COUNT, &next_count);
    env.storage().instance().set(&TOTAL_WEIGHT, &new_total);

    log!(env, "pool registered", pool_id, weight, new_total);
    Ok(pool_id)
}

/// Replace a pool's weight and limits. Queued unstake requests keep the
/// release height they were created with. All pools must already be accrued.
pub fn update_params(
    env: &Env,
    pool_id: u32,
    weight: u32,
    min_deposit: i128,
    lock_period: u32,
) -> Result<Pool, ContractError> {
    validate_params(weight, min_deposit, lock_period)?;
    let mut pool = load(env, pool_id)?;

    let new_total = checked(
        total_weight(env)
            .checked_sub(u64::from(pool.weight))
            .and_then(|rest| rest.checked_add(u64::from(weight))),
    )?;

    pool.weight = weight;
    pool.min_deposit = min_deposit;
    pool.lock_period = lock_period;
    save(env, pool_id, &pool);
    env.storage().instance().set(&TOTAL_WEIGHT, &new_total);

    log!(env, "pool updated", pool_id, weight, new_total);
    Ok(pool)
}
