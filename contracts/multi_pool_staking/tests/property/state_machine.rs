#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based state machine tests for the MultiPoolStaking contract.
//!
//! Random action sequences run against the contract and against a plain
//! model of stakes and queued requests. After every step:
//!
//! - each pool's `total_staked` equals the sum of its positions
//! - each pool's accumulator never decreases
//! - the contract holds exactly the active stake plus queued requests
//! - rewards paid plus rewards claimable never exceed what was emitted
//! - every failure is the one the model predicts

use multi_pool_staking::{
    ContractError, MultiPoolStakingContract, MultiPoolStakingContractClient, StakeAsset,
    UnstakeRequest,
};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, Env, I256};

// ── Model ─────────────────────────────────────────────────────────────────────

const START: u32 = 100;
const RATE: i128 = 1_000;
const USERS: usize = 3;
const POOLS: usize = 2;
const WEIGHTS: [u32; POOLS] = [2, 1];
const MIN_DEPOSITS: [i128; POOLS] = [1, 5];
const LOCKS: [u32; POOLS] = [3, 6];

#[derive(Debug, Clone, Arbitrary)]
enum Action {
    #[proptest(weight = 3)]
    Deposit {
        #[proptest(strategy = "0..USERS")]
        user: usize,
        #[proptest(strategy = "0..POOLS")]
        pool: usize,
        #[proptest(strategy = "1i128..5_000")]
        amount: i128,
    },
    #[proptest(weight = 2)]
    Unstake {
        #[proptest(strategy = "0..USERS")]
        user: usize,
        #[proptest(strategy = "0..POOLS")]
        pool: usize,
        #[proptest(strategy = "1i128..5_000")]
        amount: i128,
    },
    Withdraw {
        #[proptest(strategy = "0..USERS")]
        user: usize,
        #[proptest(strategy = "0..POOLS")]
        pool: usize,
    },
    Claim {
        #[proptest(strategy = "0..USERS")]
        user: usize,
        #[proptest(strategy = "0..POOLS")]
        pool: usize,
    },
    #[proptest(weight = 2)]
    Advance {
        #[proptest(strategy = "1u32..25")]
        heights: u32,
    },
}

#[derive(Default)]
struct Model {
    staked: [[i128; USERS]; POOLS],
    requests: [[Vec<(i128, u32)>; USERS]; POOLS],
    claimed: i128,
    acc: [Option<I256>; POOLS],
}

impl Model {
    fn matured(&self, pool: usize, user: usize, height: u32) -> i128 {
        self.requests[pool][user]
            .iter()
            .filter(|(_, release)| *release <= height)
            .map(|(amount, _)| amount)
            .sum()
    }
}

// ── Harness ───────────────────────────────────────────────────────────────────

struct Harness {
    env: Env,
    client: MultiPoolStakingContractClient<'static>,
    contract_id: Address,
    assets: [Address; POOLS],
    users: [Address; USERS],
}

fn setup() -> Harness {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_sequence_number(START);

    let native = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let contract_id = env.register(MultiPoolStakingContract, ());
    let client = MultiPoolStakingContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    client.initialize(&admin, &native, &reward, &RATE);
    client.create_pool(
        &admin,
        &StakeAsset::Native,
        &WEIGHTS[0],
        &MIN_DEPOSITS[0],
        &LOCKS[0],
    );
    client.create_pool(
        &admin,
        &StakeAsset::Token(token.clone()),
        &WEIGHTS[1],
        &MIN_DEPOSITS[1],
        &LOCKS[1],
    );
    StellarAssetClient::new(&env, &reward).mint(&contract_id, &1_000_000_000_000);

    let users = [
        Address::generate(&env),
        Address::generate(&env),
        Address::generate(&env),
    ];
    for user in users.iter() {
        StellarAssetClient::new(&env, &native).mint(user, &1_000_000_000);
        StellarAssetClient::new(&env, &token).mint(user, &1_000_000_000);
    }

    Harness {
        env,
        client,
        contract_id,
        assets: [native, token],
        users,
    }
}

fn expect_err<T, C, I>(
    result: Result<Result<T, C>, Result<ContractError, I>>,
    expected: ContractError,
) -> Result<(), TestCaseError> {
    match result {
        Err(Ok(e)) => prop_assert_eq!(e, expected),
        _ => prop_assert!(false, "Expected {:?}", expected),
    }
    Ok(())
}

fn expect_ok<T, C, I>(
    result: Result<Result<T, C>, Result<ContractError, I>>,
) -> Result<T, TestCaseError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        _ => Err(TestCaseError::fail("Expected call to succeed")),
    }
}

fn step(h: &Harness, model: &mut Model, action: &Action) -> Result<(), TestCaseError> {
    let height = h.env.ledger().sequence();
    match *action {
        Action::Deposit { user, pool, amount } => {
            let result = h.client.try_deposit(&h.users[user], &(pool as u32), &amount);
            if amount < MIN_DEPOSITS[pool] {
                expect_err(result, ContractError::BelowMinDeposit)?;
            } else {
                expect_ok(result)?;
                model.staked[pool][user] += amount;
            }
        }
        Action::Unstake { user, pool, amount } => {
            let result = h
                .client
                .try_request_unstake(&h.users[user], &(pool as u32), &amount);
            if amount > model.staked[pool][user] {
                expect_err(result, ContractError::InsufficientStake)?;
            } else {
                let release = height + LOCKS[pool];
                prop_assert_eq!(expect_ok(result)?, release);
                model.staked[pool][user] -= amount;
                model.requests[pool][user].push((amount, release));
            }
        }
        Action::Withdraw { user, pool } => {
            let matured = model.matured(pool, user, height);
            let result = h.client.try_withdraw(&h.users[user], &(pool as u32));
            if matured == 0 {
                expect_err(result, ContractError::NothingWithdrawable)?;
            } else {
                prop_assert_eq!(expect_ok(result)?, matured);
                model.requests[pool][user].retain(|(_, release)| *release > height);
            }
        }
        Action::Claim { user, pool } => {
            let pending = h.client.pending_reward(&(pool as u32), &h.users[user]);
            let result = h.client.try_claim_reward(&h.users[user], &(pool as u32));
            if pending == 0 {
                expect_err(result, ContractError::NothingToClaim)?;
            } else {
                prop_assert_eq!(expect_ok(result)?, pending);
                model.claimed += pending;
            }
        }
        Action::Advance { heights } => {
            h.env.ledger().set_sequence_number(height + heights);
        }
    }
    Ok(())
}

fn check_invariants(h: &Harness, model: &mut Model) -> Result<(), TestCaseError> {
    let height = h.env.ledger().sequence();
    let mut claimable = 0i128;

    for pool_id in 0..POOLS {
        let pool = h.client.get_pool(&(pool_id as u32));

        let mut staked_sum = 0i128;
        let mut queued_sum = 0i128;
        for user_id in 0..USERS {
            let user = &h.users[user_id];
            let position = h.client.get_position(&(pool_id as u32), user);
            prop_assert_eq!(position.staked, model.staked[pool_id][user_id]);

            let expected: Vec<UnstakeRequest> = model.requests[pool_id][user_id]
                .iter()
                .map(|(amount, release_height)| UnstakeRequest {
                    amount: *amount,
                    release_height: *release_height,
                })
                .collect();
            let actual: Vec<UnstakeRequest> = position.requests.iter().collect();
            prop_assert_eq!(actual, expected);

            staked_sum += position.staked;
            queued_sum += model.requests[pool_id][user_id]
                .iter()
                .map(|(amount, _)| amount)
                .sum::<i128>();
            claimable += h.client.pending_reward(&(pool_id as u32), user);
        }

        prop_assert_eq!(pool.total_staked, staked_sum);
        if let Some(previous) = &model.acc[pool_id] {
            prop_assert!(pool.acc_reward_per_share >= *previous);
        }
        model.acc[pool_id] = Some(pool.acc_reward_per_share);

        let held = TokenClient::new(&h.env, &h.assets[pool_id]).balance(&h.contract_id);
        prop_assert_eq!(held, staked_sum + queued_sum);
    }

    let emitted = RATE * i128::from(height - START);
    prop_assert!(model.claimed + claimable <= emitted);
    Ok(())
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_random_actions_keep_ledger_consistent(
        actions in proptest::collection::vec(any::<Action>(), 1..40),
    ) {
        let h = setup();
        let mut model = Model::default();

        for action in actions.iter() {
            step(&h, &mut model, action)?;
            check_invariants(&h, &mut model)?;
        }
    }
}
