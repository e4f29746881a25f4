#![allow(deprecated)] // events().publish migration tracked separately

use common::{Feature, Role};
use soroban_sdk::{symbol_short, Address, BytesN, Env};

use crate::pool::StakeAsset;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the contract is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub native_token: Address,
    pub reward_token: Address,
    pub reward_per_height: i128,
    pub height: u32,
}

/// Fired when a pool is appended to the registry.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolCreatedEvent {
    pub pool_id: u32,
    pub asset: StakeAsset,
    pub weight: u32,
    pub min_deposit: i128,
    pub lock_period: u32,
    pub height: u32,
}

/// Fired when a pool manager changes a pool's weight or limits.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolUpdatedEvent {
    pub pool_id: u32,
    pub weight: u32,
    pub min_deposit: i128,
    pub lock_period: u32,
    pub total_weight: u64,
    pub height: u32,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardRateSetEvent {
    pub reward_per_height: i128,
    pub height: u32,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositedEvent {
    pub user: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub height: u32,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakeRequestedEvent {
    pub user: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub release_height: u32,
    pub height: u32,
}

/// Fired when matured unstake requests are paid out in one batch.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub user: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub height: u32,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardClaimedEvent {
    pub user: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub height: u32,
}

/// Fired when a pause switch changes. `feature` is `None` for the global
/// override.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseChangedEvent {
    pub caller: Address,
    pub feature: Option<Feature>,
    pub paused: bool,
    pub height: u32,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleChangedEvent {
    pub caller: Address,
    pub role: Role,
    pub account: Address,
    pub height: u32,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpgradedEvent {
    pub caller: Address,
    pub wasm_hash: BytesN<32>,
    pub height: u32,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    native_token: Address,
    reward_token: Address,
    reward_per_height: i128,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            native_token,
            reward_token,
            reward_per_height,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_pool_created(
    env: &Env,
    pool_id: u32,
    asset: StakeAsset,
    weight: u32,
    min_deposit: i128,
    lock_period: u32,
) {
    env.events().publish(
        (symbol_short!("POOL_NEW"), pool_id),
        PoolCreatedEvent {
            pool_id,
            asset,
            weight,
            min_deposit,
            lock_period,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_pool_updated(
    env: &Env,
    pool_id: u32,
    weight: u32,
    min_deposit: i128,
    lock_period: u32,
    total_weight: u64,
) {
    env.events().publish(
        (symbol_short!("POOL_UPD"), pool_id),
        PoolUpdatedEvent {
            pool_id,
            weight,
            min_deposit,
            lock_period,
            total_weight,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_reward_rate_set(env: &Env, reward_per_height: i128) {
    env.events().publish(
        (symbol_short!("RWD_RATE"),),
        RewardRateSetEvent {
            reward_per_height,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_deposited(env: &Env, user: Address, pool_id: u32, amount: i128) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), user.clone(), pool_id),
        DepositedEvent {
            user,
            pool_id,
            amount,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_unstake_requested(
    env: &Env,
    user: Address,
    pool_id: u32,
    amount: i128,
    release_height: u32,
) {
    env.events().publish(
        (symbol_short!("UNSTK_REQ"), user.clone(), pool_id),
        UnstakeRequestedEvent {
            user,
            pool_id,
            amount,
            release_height,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, user: Address, pool_id: u32, amount: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), user.clone(), pool_id),
        WithdrawnEvent {
            user,
            pool_id,
            amount,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_reward_claimed(env: &Env, user: Address, pool_id: u32, amount: i128) {
    env.events().publish(
        (symbol_short!("CLMD"), user.clone(), pool_id),
        RewardClaimedEvent {
            user,
            pool_id,
            amount,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_pause_changed(env: &Env, caller: Address, feature: Option<Feature>, paused: bool) {
    env.events().publish(
        (symbol_short!("PAUSE"), caller.clone()),
        PauseChangedEvent {
            caller,
            feature,
            paused,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_role_granted(env: &Env, caller: Address, role: Role, account: Address) {
    env.events().publish(
        (symbol_short!("ROLE_GRNT"), account.clone()),
        RoleChangedEvent {
            caller,
            role,
            account,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_role_revoked(env: &Env, caller: Address, role: Role, account: Address) {
    env.events().publish(
        (symbol_short!("ROLE_RVK"), account.clone()),
        RoleChangedEvent {
            caller,
            role,
            account,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_upgraded(env: &Env, caller: Address, wasm_hash: BytesN<32>) {
    env.events().publish(
        (symbol_short!("UPGRADED"), caller.clone()),
        UpgradedEvent {
            caller,
            wasm_hash,
            height: env.ledger().sequence(),
        },
    );
}
