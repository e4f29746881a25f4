use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec, I256};

use crate::errors::{checked, ContractError};
use crate::rewards;

// ── Storage key constants ───────────────────────────────────────────────────

const POSITION: Symbol = symbol_short!("POSITION");

const DAY_IN_LEDGERS: u32 = 17_280;
const TTL_THRESHOLD: u32 = 30 * DAY_IN_LEDGERS;
const TTL_EXTEND_TO: u32 = 120 * DAY_IN_LEDGERS;

// ── Types ───────────────────────────────────────────────────────────────────

/// A queued, time-locked promise to return previously staked value.
///
/// Never modified once created; removed by the `withdraw` that finds
/// `release_height` reached.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakeRequest {
    pub amount: i128,
    /// First ledger sequence at which the amount may be withdrawn.
    pub release_height: u32,
}

/// One user's state in one pool. Created on first deposit and never deleted;
/// the all-zero position is a valid resting state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserPosition {
    /// Active stake, earning rewards.
    pub staked: i128,
    /// `staked * acc_reward_per_share / 1e18` at the last settlement.
    pub reward_debt: I256,
    /// Reward settled but not yet paid out.
    pub pending_reward: i128,
    pub requests: Vec<UnstakeRequest>,
}

impl UserPosition {
    pub fn empty(env: &Env) -> Self {
        Self {
            staked: 0,
            reward_debt: rewards::zero(env),
            pending_reward: 0,
            requests: Vec::new(env),
        }
    }

    /// Reward claimable at accumulator value `acc`.
    pub fn owed(&self, acc: &I256) -> Result<i128, ContractError> {
        checked(rewards::owed(
            self.staked,
            acc,
            &self.reward_debt,
            self.pending_reward,
        ))
    }

    /// Move everything earned since the last snapshot into `pending_reward`
    /// and re-snapshot. Call [`Self::sync_debt`] again after changing `staked`.
    pub fn settle(&mut self, acc: &I256) -> Result<(), ContractError> {
        self.pending_reward = self.owed(acc)?;
        self.sync_debt(acc);
        Ok(())
    }

    pub fn sync_debt(&mut self, acc: &I256) {
        self.reward_debt = rewards::accrued(self.staked, acc);
    }

    /// Sum of requests releasable at `height`.
    pub fn matured_amount(&self, height: u32) -> Result<i128, ContractError> {
        let mut total: i128 = 0;
        for request in self.requests.iter() {
            if request.release_height <= height {
                total = checked(total.checked_add(request.amount))?;
            }
        }
        Ok(total)
    }

    /// Remove every request releasable at `height` and return their sum.
    /// The remaining requests keep their relative order.
    pub fn take_matured(&mut self, env: &Env, height: u32) -> Result<i128, ContractError> {
        let mut total: i128 = 0;
        let mut remaining = Vec::new(env);
        for request in self.requests.iter() {
            if request.release_height <= height {
                total = checked(total.checked_add(request.amount))?;
            } else {
                remaining.push_back(request);
            }
        }
        self.requests = remaining;
        Ok(total)
    }
}

// ── Storage helpers ─────────────────────────────────────────────────────────

fn position_key(pool_id: u32, user: &Address) -> (Symbol, u32, Address) {
    (POSITION, pool_id, user.clone())
}

/// Load a position, or the empty one if the user never deposited.
pub fn load(env: &Env, pool_id: u32, user: &Address) -> UserPosition {
    env.storage()
        .persistent()
        .get(&position_key(pool_id, user))
        .unwrap_or_else(|| UserPosition::empty(env))
}

pub fn save(env: &Env, pool_id: u32, user: &Address, position: &UserPosition) {
    let key = position_key(pool_id, user);
    env.storage().persistent().set(&key, position);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
