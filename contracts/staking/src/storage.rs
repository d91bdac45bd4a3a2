use membership_tiers::MembershipTable;
use soroban_sdk::{contracttype, log, symbol_short, Address, Env, Symbol};

use crate::error::ContractError;

// Ledgers close roughly every 5 seconds
pub const DAY_IN_LEDGERS: u32 = 17280;

// instance entries (admin, initialization flag) are kept alive for a week
pub const INSTANCE_TARGET_TTL: u32 = 7 * DAY_IN_LEDGERS;
pub const INSTANCE_RENEWAL_THRESHOLD: u32 = INSTANCE_TARGET_TTL - DAY_IN_LEDGERS;

// persistent entries (config, tiers, accounts) are kept alive for a month
pub const PERSISTENT_TARGET_TTL: u32 = 30 * DAY_IN_LEDGERS;
pub const PERSISTENT_RENEWAL_THRESHOLD: u32 = PERSISTENT_TARGET_TTL - DAY_IN_LEDGERS;

pub const ADMIN: Symbol = symbol_short!("ADMIN");
pub const PENDING_ADMIN: Symbol = symbol_short!("p_admin");

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminChange {
    pub new_admin: Address,
    /// Latest timestamp at which the change may still be accepted
    pub time_limit: Option<u64>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Token that is both staked and paid out as reward
    pub stake_token: Address,
    /// Smallest amount a single `stake` call accepts
    pub min_stake: i128,
}
const CONFIG: Symbol = symbol_short!("CONFIG");

pub fn get_config(env: &Env) -> Result<Config, ContractError> {
    let config = env
        .storage()
        .persistent()
        .get(&CONFIG)
        .ok_or_else(|| {
            log!(env, "Stake: Config not set");
            ContractError::ConfigNotSet
        })?;
    env.storage().persistent().extend_ttl(
        &CONFIG,
        PERSISTENT_RENEWAL_THRESHOLD,
        PERSISTENT_TARGET_TTL,
    );

    Ok(config)
}

pub fn save_config(env: &Env, config: Config) {
    env.storage().persistent().set(&CONFIG, &config);
    env.storage().persistent().extend_ttl(
        &CONFIG,
        PERSISTENT_RENEWAL_THRESHOLD,
        PERSISTENT_TARGET_TTL,
    );
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct StakeAccount {
    /// Currently staked amount, excluding unclaimed reward
    pub principal: i128,
    /// Timestamp of the last settlement
    pub accrual_start: u64,
}

impl StakeAccount {
    pub fn is_empty(&self) -> bool {
        self.principal == 0
    }
}

pub fn get_stake_account(env: &Env, key: &Address) -> StakeAccount {
    let account = env
        .storage()
        .persistent()
        .get::<_, StakeAccount>(key)
        .unwrap_or_default();
    if env.storage().persistent().has(key) {
        env.storage().persistent().extend_ttl(
            key,
            PERSISTENT_RENEWAL_THRESHOLD,
            PERSISTENT_TARGET_TTL,
        );
    }

    account
}

pub fn save_stake_account(env: &Env, key: &Address, account: &StakeAccount) {
    env.storage().persistent().set(key, account);
    env.storage().persistent().extend_ttl(
        key,
        PERSISTENT_RENEWAL_THRESHOLD,
        PERSISTENT_TARGET_TTL,
    );
}

/// Returns the account to the empty state; a missing entry reads back as
/// `StakeAccount::default()`.
pub fn remove_stake_account(env: &Env, key: &Address) {
    env.storage().persistent().remove(key);
}

pub mod utils {
    use super::*;

    use soroban_sdk::{ConversionError, TryFromVal, Val};

    #[derive(Clone, Copy)]
    #[repr(u32)]
    pub enum DataKey {
        TotalStaked = 0,
        Initialized = 1,
        MembershipTiers = 2,
    }

    impl TryFromVal<Env, DataKey> for Val {
        type Error = ConversionError;

        fn try_from_val(_env: &Env, v: &DataKey) -> Result<Self, Self::Error> {
            Ok((*v as u32).into())
        }
    }

    pub fn is_initialized(e: &Env) -> bool {
        e.storage()
            .instance()
            .get(&DataKey::Initialized)
            .unwrap_or(false)
    }

    pub fn set_initialized(e: &Env) {
        e.storage().instance().set(&DataKey::Initialized, &true);
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
    }

    pub fn save_admin(e: &Env, address: &Address) {
        e.storage().instance().set(&ADMIN, address);
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
    }

    pub fn get_admin(e: &Env) -> Result<Address, ContractError> {
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);

        e.storage().instance().get(&ADMIN).ok_or_else(|| {
            log!(e, "Stake: Admin not set");
            ContractError::AdminNotSet
        })
    }

    pub fn save_pending_admin(e: &Env, admin_change: &AdminChange) {
        e.storage().instance().set(&PENDING_ADMIN, admin_change);
        e.storage()
            .instance()
            .extend_ttl(INSTANCE_RENEWAL_THRESHOLD, INSTANCE_TARGET_TTL);
    }

    pub fn get_pending_admin(e: &Env) -> Option<AdminChange> {
        e.storage().instance().get(&PENDING_ADMIN)
    }

    pub fn remove_pending_admin(e: &Env) {
        e.storage().instance().remove(&PENDING_ADMIN);
    }

    pub fn get_membership_table(e: &Env) -> Result<MembershipTable, ContractError> {
        let table = e
            .storage()
            .persistent()
            .get(&DataKey::MembershipTiers)
            .ok_or_else(|| {
                log!(e, "Stake: Membership tiers not set");
                ContractError::EmptyMembershipTable
            })?;
        e.storage().persistent().extend_ttl(
            &DataKey::MembershipTiers,
            PERSISTENT_RENEWAL_THRESHOLD,
            PERSISTENT_TARGET_TTL,
        );

        Ok(table)
    }

    pub fn save_membership_table(e: &Env, table: &MembershipTable) {
        e.storage()
            .persistent()
            .set(&DataKey::MembershipTiers, table);
        e.storage().persistent().extend_ttl(
            &DataKey::MembershipTiers,
            PERSISTENT_RENEWAL_THRESHOLD,
            PERSISTENT_TARGET_TTL,
        );
    }

    pub fn init_total_staked(e: &Env) {
        e.storage().persistent().set(&DataKey::TotalStaked, &0i128);
        e.storage().persistent().extend_ttl(
            &DataKey::TotalStaked,
            PERSISTENT_RENEWAL_THRESHOLD,
            PERSISTENT_TARGET_TTL,
        );
    }

    pub fn increase_total_staked(e: &Env, amount: i128) -> Result<(), ContractError> {
        let count = get_total_staked_counter(e)?;
        let total = count.checked_add(amount).ok_or_else(|| {
            log!(e, "Stake: Increase total staked: overflow");
            ContractError::ContractMathError
        })?;
        save_total_staked(e, total);

        Ok(())
    }

    pub fn decrease_total_staked(e: &Env, amount: i128) -> Result<(), ContractError> {
        let count = get_total_staked_counter(e)?;
        let total = count.checked_sub(amount).ok_or_else(|| {
            log!(e, "Stake: Decrease total staked: underflow");
            ContractError::ContractMathError
        })?;
        save_total_staked(e, total);

        Ok(())
    }

    fn save_total_staked(e: &Env, total: i128) {
        e.storage().persistent().set(&DataKey::TotalStaked, &total);
        e.storage().persistent().extend_ttl(
            &DataKey::TotalStaked,
            PERSISTENT_RENEWAL_THRESHOLD,
            PERSISTENT_TARGET_TTL,
        );
    }

    pub fn get_total_staked_counter(env: &Env) -> Result<i128, ContractError> {
        let total_staked = env
            .storage()
            .persistent()
            .get(&DataKey::TotalStaked)
            .ok_or_else(|| {
                log!(env, "Stake: Total staked not initialized");
                ContractError::ConfigNotSet
            })?;
        env.storage().persistent().extend_ttl(
            &DataKey::TotalStaked,
            PERSISTENT_RENEWAL_THRESHOLD,
            PERSISTENT_TARGET_TTL,
        );

        Ok(total_staked)
    }
}
