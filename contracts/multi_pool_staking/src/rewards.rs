//! Fixed-point reward math for the per-pool accumulator.
//!
//! `acc_reward_per_share` is scaled by [`ACC_PRECISION`]. It and every
//! `reward_debt` snapshot are kept as `I256`: a dust stake drives the
//! per-unit reward high enough that `staked * acc` leaves the `i128` range
//! long before any actual payout does. Only amounts owed to a user are
//! narrowed back to `i128`. Divisions truncate toward zero, so every
//! rounding error under-pays.

use soroban_sdk::{Env, I256};

/// Scale of `acc_reward_per_share`.
pub const ACC_PRECISION: i128 = 1_000_000_000_000_000_000;

fn wide(env: &Env, value: i128) -> I256 {
    I256::from_i128(env, value)
}

pub fn zero(env: &Env) -> I256 {
    I256::from_i32(env, 0)
}

/// Reward emitted to one pool over `elapsed` heights:
/// `elapsed * reward_per_height * weight / total_weight`.
///
/// Cannot overflow: the product is bounded by 2^191.
pub fn pool_reward(
    env: &Env,
    elapsed: u32,
    reward_per_height: i128,
    weight: u32,
    total_weight: u64,
) -> I256 {
    if total_weight == 0 {
        return zero(env);
    }
    wide(env, i128::from(elapsed))
        .mul(&wide(env, reward_per_height))
        .mul(&wide(env, i128::from(weight)))
        .div(&wide(env, i128::from(total_weight)))
}

/// Increase of the accumulator when `pool_reward` is shared by
/// `total_staked` units. Zero stake earns nothing.
///
/// Returns `None` when a single step would exceed `i128::MAX` per scaled
/// unit; the caller drops that window instead of failing.
pub fn acc_increment(env: &Env, pool_reward: &I256, total_staked: i128) -> Option<I256> {
    if total_staked <= 0 {
        return Some(zero(env));
    }
    let step = pool_reward
        .mul(&wide(env, ACC_PRECISION))
        .div(&wide(env, total_staked));
    step.to_i128().map(|_| step)
}

/// Reward attributable to `staked` units at accumulator value `acc`.
/// This is also the `reward_debt` snapshot taken at settlement.
pub fn accrued(staked: i128, acc: &I256) -> I256 {
    let env = acc.env();
    wide(env, staked)
        .mul(acc)
        .div(&wide(env, ACC_PRECISION))
}

/// Everything a position can claim right now:
/// `staked * acc / 1e18 + pending_reward - reward_debt`.
///
/// `None` only if the claimable amount itself leaves the `i128` range.
pub fn owed(staked: i128, acc: &I256, reward_debt: &I256, pending_reward: i128) -> Option<i128> {
    accrued(staked, acc)
        .add(&wide(acc.env(), pending_reward))
        .sub(reward_debt)
        .to_i128()
}

/// Accumulator value as if accrual ran at `current_height`, without
/// writing anything.
#[allow(clippy::too_many_arguments)]
pub fn projected_acc(
    env: &Env,
    acc: &I256,
    last_accrual_height: u32,
    current_height: u32,
    total_staked: i128,
    reward_per_height: i128,
    weight: u32,
    total_weight: u64,
) -> I256 {
    if current_height <= last_accrual_height || total_staked <= 0 {
        return acc.clone();
    }
    let elapsed = current_height - last_accrual_height;
    let reward = pool_reward(env, elapsed, reward_per_height, weight, total_weight);
    match acc_increment(env, &reward, total_staked) {
        Some(step) => acc.add(&step),
        None => acc.clone(),
    }
}
