use soroban_sdk::{contracttype, symbol_short, Env, Symbol};

// ── Types ─────────────────────────────────────────────────────

/// User-facing operations that can be halted independently.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Feature {
    Staking = 1,
    Unstaking = 2,
    Withdraw = 3,
    Claim = 4,
}

/// Which switch blocked the call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PauseError {
    Global,
    Feature(Feature),
}

// ── Storage Keys ─────────────────────────────────────────────

fn global_pause_key() -> Symbol {
    symbol_short!("P_GLOB")
}

fn feature_pause_key(feature: Feature) -> (Symbol, Feature) {
    (symbol_short!("P_FEAT"), feature)
}

// ── Queries ──────────────────────────────────────────────────

pub fn is_globally_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&global_pause_key())
        .unwrap_or(false)
}

/// Reports the feature's own switch only; the global override is separate.
pub fn is_feature_paused(env: &Env, feature: Feature) -> bool {
    env.storage()
        .instance()
        .get(&feature_pause_key(feature))
        .unwrap_or(false)
}

/// Fails if either the global switch or the feature's switch is engaged.
/// The global switch is evaluated first.
pub fn require_not_paused(env: &Env, feature: Feature) -> Result<(), PauseError> {
    if is_globally_paused(env) {
        return Err(PauseError::Global);
    }
    if is_feature_paused(env, feature) {
        return Err(PauseError::Feature(feature));
    }
    Ok(())
}

// ── Mutation ─────────────────────────────────────────────────
//
// Callers are responsible for checking the caller's role first.

pub fn set_global_paused(env: &Env, paused: bool) {
    if paused {
        env.storage().instance().set(&global_pause_key(), &true);
    } else {
        env.storage().instance().remove(&global_pause_key());
    }
}

pub fn set_feature_paused(env: &Env, feature: Feature, paused: bool) {
    let key = feature_pause_key(feature);
    if paused {
        env.storage().instance().set(&key, &true);
    } else {
        env.storage().instance().remove(&key);
    }
}
