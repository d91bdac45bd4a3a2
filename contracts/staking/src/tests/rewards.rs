use pretty_assertions::assert_eq;
use soroban_sdk::{testutils::Address as _, Address, Env};

use super::setup::{
    deploy_staking_contract, deploy_token_contract, pass_time, tokens, ONE_DAY, YEAR,
};
use crate::{error::ContractError, msg::StakeInfoResponse, storage::StakeAccount};

#[test]
fn full_year_reward_at_lowest_tier() {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let alice = Address::generate(&env);
    let token = deploy_token_contract(&env, &admin);
    let staking = deploy_staking_contract(&env, admin, &token.address);

    token.mint(&alice, tokens(250_000_000));
    staking.stake(&alice, &tokens(250_000_000));

    pass_time(&env, YEAR);
    assert_eq!(staking.query_reward(&alice), tokens(15_000_000));

    pass_time(&env, YEAR);
    assert_eq!(staking.query_reward(&alice), tokens(30_000_000));
}

#[test]
fn half_year_reward() {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let john = Address::generate(&env);
    let token = deploy_token_contract(&env, &admin);
    let staking = deploy_staking_contract(&env, admin, &token.address);

    token.mint(&john, tokens(1_000_000_000));
    staking.stake(&john, &tokens(1_000_000_000));
    assert_eq!(staking.query_stake_info(&john).apy, 100);

    pass_time(&env, 180 * ONE_DAY);
    assert_eq!(staking.query_reward(&john), tokens(50_000_000));
}

#[test]
fn claim_pays_and_resets_accrual() {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let sam = Address::generate(&env);
    let token = deploy_token_contract(&env, &admin);
    let staking = deploy_staking_contract(&env, admin, &token.address);

    token.mint(&staking.address, tokens(100_000_000));
    token.mint(&sam, tokens(1_000_000_000));
    staking.stake(&sam, &tokens(1_000_000_000));

    pass_time(&env, YEAR);
    assert_eq!(staking.claim(&sam), tokens(100_000_000));

    assert_eq!(token.balance(&sam), tokens(100_000_000));
    assert_eq!(
        staking.query_stake(&sam),
        StakeAccount {
            principal: tokens(1_000_000_000),
            accrual_start: YEAR,
        }
    );
    assert_eq!(staking.query_reward(&sam), 0);
    assert_eq!(
        staking.try_claim(&sam),
        Err(Ok(ContractError::NothingToClaim))
    );

    pass_time(&env, 36 * ONE_DAY);
    assert_eq!(staking.claim(&sam), tokens(10_000_000));
}

#[test]
fn claim_without_stake_fails() {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let user = Address::generate(&env);
    let token = deploy_token_contract(&env, &admin);
    let staking = deploy_staking_contract(&env, admin, &token.address);

    pass_time(&env, YEAR);
    assert_eq!(
        staking.try_claim(&user),
        Err(Ok(ContractError::NothingToClaim))
    );
}

#[test]
fn unstake_returns_principal_and_reward() {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let john = Address::generate(&env);
    let token = deploy_token_contract(&env, &admin);
    let staking = deploy_staking_contract(&env, admin, &token.address);

    token.mint(&staking.address, tokens(200_000_000));
    token.mint(&john, tokens(750_000_000));
    staking.stake(&john, &tokens(750_000_000));

    pass_time(&env, 2 * YEAR);
    assert_eq!(staking.query_reward(&john), tokens(150_000_000));

    assert_eq!(
        staking.unstake(&john),
        tokens(750_000_000) + tokens(150_000_000)
    );
    assert_eq!(token.balance(&john), tokens(900_000_000));
    assert_eq!(
        token.balance(&staking.address),
        tokens(200_000_000) - tokens(150_000_000)
    );

    assert_eq!(
        staking.query_stake_info(&john),
        StakeInfoResponse { staked: 0, apy: 60 }
    );
    assert_eq!(staking.query_reward(&john), 0);
    assert_eq!(staking.query_stake(&john), StakeAccount::default());
    assert_eq!(staking.query_total_staked(), 0);
}

#[test]
fn unstake_empty_account_is_noop() {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let user = Address::generate(&env);
    let token = deploy_token_contract(&env, &admin);
    let staking = deploy_staking_contract(&env, admin, &token.address);

    assert_eq!(staking.unstake(&user), 0);
    assert_eq!(token.balance(&user), 0);
    assert_eq!(staking.query_total_staked(), 0);
}

#[test]
fn restake_after_unstake_starts_fresh() {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let user = Address::generate(&env);
    let token = deploy_token_contract(&env, &admin);
    let staking = deploy_staking_contract(&env, admin, &token.address);

    token.mint(&staking.address, tokens(100_000_000));
    token.mint(&user, tokens(500_000_000));

    staking.stake(&user, &tokens(500_000_000));
    pass_time(&env, YEAR);
    staking.unstake(&user);

    pass_time(&env, YEAR);
    staking.stake(&user, &tokens(500_000_000));
    assert_eq!(staking.query_reward(&user), 0);

    pass_time(&env, YEAR / 2);
    assert_eq!(staking.query_reward(&user), tokens(20_000_000));
}

#[test]
fn reward_is_linear_in_time() {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let user = Address::generate(&env);
    let token = deploy_token_contract(&env, &admin);
    let staking = deploy_staking_contract(&env, admin, &token.address);

    token.mint(&user, tokens(1_500_000_000));
    staking.stake(&user, &tokens(1_500_000_000));

    pass_time(&env, 30 * ONE_DAY);
    let one_month = staking.query_reward(&user);
    assert_eq!(one_month, tokens(15_000_000));

    pass_time(&env, 30 * ONE_DAY);
    assert_eq!(staking.query_reward(&user), 2 * one_month);
}

#[test]
fn full_staking_scenario() {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);
    let john = Address::generate(&env);
    let sam = Address::generate(&env);
    let token = deploy_token_contract(&env, &admin);
    let staking = deploy_staking_contract(&env, admin, &token.address);

    // reward reserve
    token.mint(&staking.address, tokens(17_500_000_000));
    for user in [&alice, &bob, &john, &sam] {
        token.mint(user, tokens(2_000_000_000));
    }

    for _ in 0..3 {
        staking.stake(&bob, &tokens(250_000_000));
    }
    assert_eq!(staking.query_stake_info(&bob).apy, 100);

    staking.stake(&alice, &tokens(250_000_000));
    pass_time(&env, YEAR);
    assert_eq!(staking.query_reward(&alice), tokens(15_000_000));
    assert_eq!(token.balance(&staking.address), tokens(18_500_000_000));

    staking.stake(&john, &tokens(750_000_000));
    pass_time(&env, 2 * YEAR);
    staking.unstake(&john);
    assert_eq!(staking.query_stake(&john), StakeAccount::default());

    staking.stake(&john, &tokens(1_000_000_000));
    assert_eq!(staking.query_stake_info(&john).apy, 100);
    pass_time(&env, 180 * ONE_DAY);
    assert_eq!(staking.query_reward(&john), tokens(50_000_000));

    assert_eq!(
        staking.try_claim(&sam),
        Err(Ok(ContractError::NothingToClaim))
    );
    staking.stake(&sam, &tokens(1_000_000_000));
    pass_time(&env, YEAR);
    assert_eq!(staking.claim(&sam), tokens(100_000_000));
    assert_eq!(
        staking.try_claim(&sam),
        Err(Ok(ContractError::NothingToClaim))
    );

    assert_eq!(
        staking.query_total_staked(),
        tokens(750_000_000) + tokens(250_000_000) + tokens(1_000_000_000) * 2
    );
}
