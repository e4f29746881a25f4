#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use multi_pool_staking::{MultiPoolStakingContract, MultiPoolStakingContractClient, StakeAsset};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};

const USERS: usize = 4;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Deposit { user: u8, pool: bool, amount: i64 },
    RequestUnstake { user: u8, pool: bool, amount: i64 },
    Withdraw { user: u8, pool: bool },
    ClaimReward { user: u8, pool: bool },
    Advance { heights: u8 },
    SetRewardRate { rate: i64 },
    SetPoolWeight { pool: bool, weight: u16 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_sequence_number(100);

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
    client.initialize(&admin, &native, &reward, &1_000);
    client.create_pool(&admin, &StakeAsset::Native, &2, &1, &5);
    client.create_pool(&admin, &StakeAsset::Token(token.clone()), &1, &1, &10);
    StellarAssetClient::new(&env, &reward).mint(&contract_id, &1_000_000_000_000);

    let mut users = Vec::new();
    for _ in 0..USERS {
        let user = Address::generate(&env);
        StellarAssetClient::new(&env, &native).mint(&user, &1_000_000_000_000);
        StellarAssetClient::new(&env, &token).mint(&user, &1_000_000_000_000);
        users.push(user);
    }
    let assets = [native, token];

    // Errors are expected for bad input; the invariants below must hold
    // regardless of which calls succeeded.
    for action in actions.into_iter().take(64) {
        match action {
            FuzzAction::Deposit { user, pool, amount } => {
                let caller = &users[user as usize % USERS];
                let _ = client.try_deposit(caller, &(pool as u32), &i128::from(amount));
            }
            FuzzAction::RequestUnstake { user, pool, amount } => {
                let caller = &users[user as usize % USERS];
                let _ = client.try_request_unstake(caller, &(pool as u32), &i128::from(amount));
            }
            FuzzAction::Withdraw { user, pool } => {
                let caller = &users[user as usize % USERS];
                let _ = client.try_withdraw(caller, &(pool as u32));
            }
            FuzzAction::ClaimReward { user, pool } => {
                let caller = &users[user as usize % USERS];
                let _ = client.try_claim_reward(caller, &(pool as u32));
            }
            FuzzAction::Advance { heights } => {
                let current = env.ledger().sequence();
                env.ledger().set_sequence_number(current + u32::from(heights));
            }
            FuzzAction::SetRewardRate { rate } => {
                let _ = client.try_set_reward_per_height(&admin, &i128::from(rate));
            }
            FuzzAction::SetPoolWeight { pool, weight } => {
                let pool_id = pool as u32;
                if let Ok(Ok(current)) = client.try_get_pool(&pool_id) {
                    let _ = client.try_set_pool_params(
                        &admin,
                        &pool_id,
                        &u32::from(weight),
                        &current.min_deposit,
                        &current.lock_period,
                    );
                }
            }
        }

        for pool_id in 0..2u32 {
            let pool = client.get_pool(&pool_id);
            let mut staked = 0i128;
            let mut queued = 0i128;
            for user in users.iter() {
                let position = client.get_position(&pool_id, user);
                assert!(position.staked >= 0);
                assert!(position.pending_reward >= 0);
                staked += position.staked;
                for request in position.requests.iter() {
                    queued += request.amount;
                }
            }
            assert_eq!(pool.total_staked, staked);

            let held = TokenClient::new(&env, &assets[pool_id as usize]).balance(&contract_id);
            assert_eq!(held, staked + queued);
        }
    }
});
