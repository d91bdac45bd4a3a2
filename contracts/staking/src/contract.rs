use membership_tiers::{MembershipTable, MembershipTier};
use soroban_sdk::{
    contract, contractimpl, contractmeta, log, token, Address, BytesN, Env, Vec,
};

use crate::{
    error::ContractError,
    msg::{ConfigResponse, StakeInfoResponse},
    rewards::pending_reward,
    storage::{
        get_config, get_stake_account, remove_stake_account, save_config, save_stake_account,
        utils::{self, get_admin, get_membership_table, get_total_staked_counter},
        AdminChange, Config, StakeAccount,
    },
};

// Metadata that is added on to the WASM custom section
contractmeta!(
    key = "Description",
    val = "Tiered membership token staking with per-mille annual rewards"
);

#[contract]
pub struct Staking;

pub trait StakingTrait {
    // min_stake: smallest amount a single `stake` call accepts
    // tiers: initial membership table, thresholds and rates strictly increasing
    fn initialize(
        env: Env,
        admin: Address,
        stake_token: Address,
        min_stake: i128,
        tiers: Vec<MembershipTier>,
    ) -> Result<(), ContractError>;

    fn add_membership(env: Env, threshold: i128, annual_rate: u32) -> Result<(), ContractError>;

    fn remove_membership(env: Env, index: u32) -> Result<(), ContractError>;

    fn change_membership_threshold(
        env: Env,
        index: u32,
        new_threshold: i128,
    ) -> Result<(), ContractError>;

    fn change_membership_apy(env: Env, index: u32, new_rate: u32) -> Result<(), ContractError>;

    fn stake(env: Env, sender: Address, amount: i128) -> Result<(), ContractError>;

    // Returns principal plus settled reward paid back to the sender
    fn unstake(env: Env, sender: Address) -> Result<i128, ContractError>;

    // Returns the reward paid to the sender
    fn claim(env: Env, sender: Address) -> Result<i128, ContractError>;

    fn update_config(env: Env, min_stake: Option<i128>) -> Result<(), ContractError>;

    fn propose_admin(
        env: Env,
        new_admin: Address,
        time_limit: Option<u64>,
    ) -> Result<Address, ContractError>;

    fn revoke_admin_change(env: Env) -> Result<(), ContractError>;

    fn accept_admin(env: Env) -> Result<Address, ContractError>;

    // Migration entrypoint
    fn upgrade(env: Env, new_wasm_hash: BytesN<32>) -> Result<(), ContractError>;

    // QUERIES

    fn query_config(env: Env) -> Result<ConfigResponse, ContractError>;

    fn query_admin(env: Env) -> Result<Address, ContractError>;

    fn query_membership_tiers(env: Env) -> Result<Vec<MembershipTier>, ContractError>;

    fn query_levels_count(env: Env) -> Result<u32, ContractError>;

    fn query_apy(env: Env, amount: i128) -> Result<u32, ContractError>;

    fn query_stake_info(env: Env, address: Address) -> Result<StakeInfoResponse, ContractError>;

    fn query_stake(env: Env, address: Address) -> StakeAccount;

    fn query_reward(env: Env, address: Address) -> Result<i128, ContractError>;

    fn query_total_staked(env: Env) -> Result<i128, ContractError>;
}

#[contractimpl]
impl StakingTrait for Staking {
    fn initialize(
        env: Env,
        admin: Address,
        stake_token: Address,
        min_stake: i128,
        tiers: Vec<MembershipTier>,
    ) -> Result<(), ContractError> {
        if utils::is_initialized(&env) {
            log!(&env, "Stake: Initialize: initializing contract twice is not allowed");
            return Err(ContractError::AlreadyInitialized);
        }

        if min_stake <= 0 {
            log!(
                &env,
                "Stake: Initialize: Minimum amount to stake can not be smaller or equal to 0"
            );
            return Err(ContractError::InvalidMinStake);
        }

        let table = MembershipTable::from_tiers(tiers).map_err(|err| {
            log!(&env, "Stake: Initialize: Invalid membership tiers");
            err
        })?;

        utils::set_initialized(&env);

        env.events()
            .publish(("initialize", "Tiered staking contract"), &stake_token);

        save_config(
            &env,
            Config {
                stake_token,
                min_stake,
            },
        );
        utils::save_admin(&env, &admin);
        utils::save_membership_table(&env, &table);
        utils::init_total_staked(&env);

        Ok(())
    }

    fn add_membership(env: Env, threshold: i128, annual_rate: u32) -> Result<(), ContractError> {
        require_admin(&env)?;

        let mut table = get_membership_table(&env)?;
        table
            .add(MembershipTier::new(threshold, annual_rate))
            .map_err(|err| {
                log!(
                    &env,
                    "Stake: Add membership: tier {} with rate {} must be above the last one",
                    threshold,
                    annual_rate
                );
                err
            })?;
        utils::save_membership_table(&env, &table);

        env.events()
            .publish(("add_membership", "threshold"), threshold);
        env.events()
            .publish(("add_membership", "annual_rate"), annual_rate);

        Ok(())
    }

    fn remove_membership(env: Env, index: u32) -> Result<(), ContractError> {
        require_admin(&env)?;

        let mut table = get_membership_table(&env)?;
        let count = table.len();
        let removed = table.remove(index).map_err(|err| {
            log!(
                &env,
                "Stake: Remove membership: can not remove tier {} out of {}",
                index,
                count
            );
            err
        })?;
        utils::save_membership_table(&env, &table);

        env.events().publish(("remove_membership", "index"), index);
        env.events()
            .publish(("remove_membership", "threshold"), removed.threshold);

        Ok(())
    }

    fn change_membership_threshold(
        env: Env,
        index: u32,
        new_threshold: i128,
    ) -> Result<(), ContractError> {
        require_admin(&env)?;

        let mut table = get_membership_table(&env)?;
        table
            .change_threshold(index, new_threshold)
            .map_err(|err| {
                log!(
                    &env,
                    "Stake: Change membership threshold: {} breaks the ordering at tier {}",
                    new_threshold,
                    index
                );
                err
            })?;
        utils::save_membership_table(&env, &table);

        env.events()
            .publish(("change_membership_threshold", "index"), index);
        env.events()
            .publish(("change_membership_threshold", "threshold"), new_threshold);

        Ok(())
    }

    fn change_membership_apy(env: Env, index: u32, new_rate: u32) -> Result<(), ContractError> {
        require_admin(&env)?;

        let mut table = get_membership_table(&env)?;
        table.change_rate(index, new_rate).map_err(|err| {
            log!(
                &env,
                "Stake: Change membership APY: {} breaks the ordering at tier {}",
                new_rate,
                index
            );
            err
        })?;
        utils::save_membership_table(&env, &table);

        env.events()
            .publish(("change_membership_apy", "index"), index);
        env.events()
            .publish(("change_membership_apy", "annual_rate"), new_rate);

        Ok(())
    }

    fn stake(env: Env, sender: Address, amount: i128) -> Result<(), ContractError> {
        sender.require_auth();

        let config = get_config(&env)?;

        if amount < config.min_stake {
            log!(
                &env,
                "Stake: Stake: Trying to stake {} which is less than minimum {} required!",
                amount,
                config.min_stake
            );
            return Err(ContractError::BelowMinimumStake);
        }

        let tiers = get_membership_table(&env)?;
        let mut account = get_stake_account(&env, &sender);

        // Settle first: what the old principal earned is priced at the tier it
        // held, not at the tier the deposit moves it into.
        let reward = pending_reward(&env, &tiers, &account)?;
        let principal = account.principal.checked_add(amount).ok_or_else(|| {
            log!(&env, "Stake: Stake: principal overflow");
            ContractError::ContractMathError
        })?;

        let token_client = token::Client::new(&env, &config.stake_token);
        token_client.transfer(&sender, &env.current_contract_address(), &amount);
        if reward > 0 {
            token_client.transfer(&env.current_contract_address(), &sender, &reward);
        }

        account.principal = principal;
        account.accrual_start = env.ledger().timestamp();
        save_stake_account(&env, &sender, &account);
        utils::increase_total_staked(&env, amount)?;

        env.events().publish(("stake", "user"), &sender);
        env.events().publish(("stake", "amount"), amount);
        env.events().publish(("stake", "reward"), reward);

        Ok(())
    }

    fn unstake(env: Env, sender: Address) -> Result<i128, ContractError> {
        sender.require_auth();

        let config = get_config(&env)?;
        let tiers = get_membership_table(&env)?;
        let account = get_stake_account(&env, &sender);

        let reward = pending_reward(&env, &tiers, &account)?;
        let payout = account.principal.checked_add(reward).ok_or_else(|| {
            log!(&env, "Stake: Unstake: payout overflow");
            ContractError::ContractMathError
        })?;

        if payout > 0 {
            let token_client = token::Client::new(&env, &config.stake_token);
            token_client.transfer(&env.current_contract_address(), &sender, &payout);
        }

        remove_stake_account(&env, &sender);
        utils::decrease_total_staked(&env, account.principal)?;

        env.events().publish(("unstake", "user"), &sender);
        env.events().publish(("unstake", "amount"), account.principal);
        env.events().publish(("unstake", "reward"), reward);

        Ok(payout)
    }

    fn claim(env: Env, sender: Address) -> Result<i128, ContractError> {
        sender.require_auth();

        let config = get_config(&env)?;
        let tiers = get_membership_table(&env)?;
        let mut account = get_stake_account(&env, &sender);

        let reward = pending_reward(&env, &tiers, &account)?;
        if reward == 0 {
            log!(&env, "Stake: Claim: Nothing to claim");
            return Err(ContractError::NothingToClaim);
        }

        let token_client = token::Client::new(&env, &config.stake_token);
        token_client.transfer(&env.current_contract_address(), &sender, &reward);

        account.accrual_start = env.ledger().timestamp();
        save_stake_account(&env, &sender, &account);

        env.events().publish(("claim", "user"), &sender);
        env.events().publish(("claim", "reward"), reward);

        Ok(reward)
    }

    fn update_config(env: Env, min_stake: Option<i128>) -> Result<(), ContractError> {
        require_admin(&env)?;

        let mut config = get_config(&env)?;

        if let Some(min_stake) = min_stake {
            if min_stake <= 0 {
                log!(
                    &env,
                    "Stake: Update config: Minimum amount to stake can not be smaller or equal to 0"
                );
                return Err(ContractError::InvalidMinStake);
            }
            config.min_stake = min_stake;
        }

        save_config(&env, config.clone());

        env.events()
            .publish(("update_config", "min_stake"), config.min_stake);

        Ok(())
    }

    fn propose_admin(
        env: Env,
        new_admin: Address,
        time_limit: Option<u64>,
    ) -> Result<Address, ContractError> {
        let current_admin = require_admin(&env)?;

        if current_admin == new_admin {
            log!(&env, "Stake: Propose admin: Trying to set the current admin");
            return Err(ContractError::SameAdmin);
        }

        utils::save_pending_admin(
            &env,
            &AdminChange {
                new_admin: new_admin.clone(),
                time_limit,
            },
        );

        env.events().publish(
            ("Stake: ", "Admin replacement requested by old admin: "),
            &current_admin,
        );
        env.events()
            .publish(("Stake: ", "Replace with new admin: "), &new_admin);

        Ok(new_admin)
    }

    fn revoke_admin_change(env: Env) -> Result<(), ContractError> {
        let current_admin = require_admin(&env)?;

        if utils::get_pending_admin(&env).is_none() {
            log!(&env, "Stake: Revoke admin change: No admin change in place");
            return Err(ContractError::NoAdminChangeInPlace);
        }

        utils::remove_pending_admin(&env);

        env.events()
            .publish(("Stake: ", "Undo admin change: "), &current_admin);

        Ok(())
    }

    fn accept_admin(env: Env) -> Result<Address, ContractError> {
        let admin_change = utils::get_pending_admin(&env).ok_or_else(|| {
            log!(&env, "Stake: Accept admin: No admin change in place");
            ContractError::NoAdminChangeInPlace
        })?;

        admin_change.new_admin.require_auth();

        if let Some(time_limit) = admin_change.time_limit {
            if env.ledger().timestamp() > time_limit {
                log!(&env, "Stake: Accept admin: Admin change expired");
                return Err(ContractError::AdminChangeExpired);
            }
        }

        utils::remove_pending_admin(&env);
        utils::save_admin(&env, &admin_change.new_admin);

        env.events()
            .publish(("Stake: ", "Accepted new admin: "), &admin_change.new_admin);

        Ok(admin_change.new_admin)
    }

    fn upgrade(env: Env, new_wasm_hash: BytesN<32>) -> Result<(), ContractError> {
        require_admin(&env)?;

        env.deployer().update_current_contract_wasm(new_wasm_hash);

        Ok(())
    }

    // QUERIES

    fn query_config(env: Env) -> Result<ConfigResponse, ContractError> {
        Ok(ConfigResponse {
            config: get_config(&env)?,
        })
    }

    fn query_admin(env: Env) -> Result<Address, ContractError> {
        get_admin(&env)
    }

    fn query_membership_tiers(env: Env) -> Result<Vec<MembershipTier>, ContractError> {
        Ok(get_membership_table(&env)?.tiers)
    }

    fn query_levels_count(env: Env) -> Result<u32, ContractError> {
        Ok(get_membership_table(&env)?.len())
    }

    fn query_apy(env: Env, amount: i128) -> Result<u32, ContractError> {
        Ok(get_membership_table(&env)?.rate_for(amount)?)
    }

    fn query_stake_info(env: Env, address: Address) -> Result<StakeInfoResponse, ContractError> {
        let account = get_stake_account(&env, &address);
        let apy = get_membership_table(&env)?.rate_for(account.principal)?;

        Ok(StakeInfoResponse {
            staked: account.principal,
            apy,
        })
    }

    fn query_stake(env: Env, address: Address) -> StakeAccount {
        get_stake_account(&env, &address)
    }

    fn query_reward(env: Env, address: Address) -> Result<i128, ContractError> {
        let tiers = get_membership_table(&env)?;
        let account = get_stake_account(&env, &address);

        pending_reward(&env, &tiers, &account)
    }

    fn query_total_staked(env: Env) -> Result<i128, ContractError> {
        get_total_staked_counter(&env)
    }
}

/// Loads the admin and requires its signature on the current invocation.
fn require_admin(env: &Env) -> Result<Address, ContractError> {
    let admin = get_admin(env)?;
    admin.require_auth();

    Ok(admin)
}
