use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Storage Keys ─────────────────────────────────────────────────────────────

const ROLE_PREFIX: Symbol = symbol_short!("ROLE");
const ROLE_COUNT_PREFIX: Symbol = symbol_short!("ROLE_CNT");

const DAY_IN_LEDGERS: u32 = 17_280;
const TTL_THRESHOLD: u32 = 30 * DAY_IN_LEDGERS;
const TTL_EXTEND_TO: u32 = 120 * DAY_IN_LEDGERS;

// ── Roles ────────────────────────────────────────────────────────────────────

/// Capability categories. Each role maps to an independent set of holders;
/// holding one role implies nothing about the others.
///
/// - `SuperAdmin`    – grants and revokes every role, including itself.
/// - `PoolManager`   – registers pools and tunes weights, limits and the
///                     global emission rate.
/// - `PauseGuardian` – flips the feature and global pause switches.
/// - `Upgrader`      – authorizes a code swap of the contract.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    SuperAdmin = 1,
    PoolManager = 2,
    PauseGuardian = 3,
    Upgrader = 4,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::SuperAdmin,
        Role::PoolManager,
        Role::PauseGuardian,
        Role::Upgrader,
    ];
}

/// Why a grant or revoke was refused.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessError {
    /// The caller does not hold `SuperAdmin`.
    NotSuperAdmin,
    /// The revoke would leave the contract without any `SuperAdmin`.
    LastSuperAdmin,
}

// ── Storage Helpers ──────────────────────────────────────────────────────────

fn role_key(role: Role, account: &Address) -> (Symbol, Role, Address) {
    (ROLE_PREFIX, role, account.clone())
}

fn role_count_key(role: Role) -> (Symbol, Role) {
    (ROLE_COUNT_PREFIX, role)
}

fn set_member_count(env: &Env, role: Role, count: u32) {
    let key = role_count_key(role);
    env.storage().persistent().set(&key, &count);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Core Functions ───────────────────────────────────────────────────────────

/// Returns true if `account` currently holds `role`.
pub fn has_role(env: &Env, role: Role, account: &Address) -> bool {
    let key = role_key(role, account);
    let held: bool = env.storage().persistent().get(&key).unwrap_or(false);
    if held {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    held
}

/// Number of distinct holders of `role`.
pub fn member_count(env: &Env, role: Role) -> u32 {
    env.storage()
        .persistent()
        .get(&role_count_key(role))
        .unwrap_or(0)
}

/// Adds `account` to `role` without any authorization check.
///
/// Returns `false` if the account already held the role. Callers must have
/// verified authority themselves; see [`grant_role`] for the checked path.
pub fn set_role(env: &Env, role: Role, account: &Address) -> bool {
    if has_role(env, role, account) {
        return false;
    }
    let key = role_key(role, account);
    env.storage().persistent().set(&key, &true);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    set_member_count(env, role, member_count(env, role).saturating_add(1));
    true
}

/// Removes `account` from `role` without any authorization check.
///
/// Returns `false` if the account did not hold the role.
pub fn clear_role(env: &Env, role: Role, account: &Address) -> bool {
    if !has_role(env, role, account) {
        return false;
    }
    env.storage().persistent().remove(&role_key(role, account));
    set_member_count(env, role, member_count(env, role).saturating_sub(1));
    true
}

/// Grants every role to `admin`. Used once during initialization.
pub fn bootstrap(env: &Env, admin: &Address) {
    for role in Role::ALL {
        set_role(env, role, admin);
    }
}

// ── Grant / Revoke ───────────────────────────────────────────────────────────

/// Grants `role` to `account` on behalf of `caller`.
///
/// Only a `SuperAdmin` may call this. The caller must have already been
/// authenticated via `require_auth()`. Returns whether the account's role set
/// actually changed.
pub fn grant_role(
    env: &Env,
    caller: &Address,
    role: Role,
    account: &Address,
) -> Result<bool, AccessError> {
    if !has_role(env, Role::SuperAdmin, caller) {
        return Err(AccessError::NotSuperAdmin);
    }
    Ok(set_role(env, role, account))
}

/// Revokes `role` from `account` on behalf of `caller`.
///
/// Only a `SuperAdmin` may call this, and the last `SuperAdmin` can never be
/// removed.
pub fn revoke_role(
    env: &Env,
    caller: &Address,
    role: Role,
    account: &Address,
) -> Result<bool, AccessError> {
    if !has_role(env, Role::SuperAdmin, caller) {
        return Err(AccessError::NotSuperAdmin);
    }
    if role == Role::SuperAdmin
        && has_role(env, role, account)
        && member_count(env, role) <= 1
    {
        return Err(AccessError::LastSuperAdmin);
    }
    Ok(clear_role(env, role, account))
}
