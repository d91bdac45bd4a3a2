use membership_tiers::{MembershipTable, RATE_DENOMINATOR};
use num_integer::Integer;
use soroban_sdk::{log, Env};

use crate::{error::ContractError, storage::StakeAccount};

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
/// Rewards accrue over a year of twelve 30 day months.
pub const YEAR_DURATION: u64 = 360 * SECONDS_PER_DAY;

/// `principal * annual_rate / 1000 * elapsed / YEAR_DURATION`, flooring after
/// each division so a settlement never pays more than was earned.
/// `None` on overflow.
pub fn accrued_reward(principal: i128, annual_rate: u32, elapsed: u64) -> Option<i128> {
    let yearly = Integer::div_floor(
        &principal.checked_mul(i128::from(annual_rate))?,
        &i128::from(RATE_DENOMINATOR),
    );

    let reward = Integer::div_floor(
        &yearly.checked_mul(i128::from(elapsed))?,
        &i128::from(YEAR_DURATION),
    );

    Some(reward)
}

/// Reward earned by `account` since its last settlement, at the rate its
/// current principal resolves to.
pub fn pending_reward(
    env: &Env,
    tiers: &MembershipTable,
    account: &StakeAccount,
) -> Result<i128, ContractError> {
    if account.is_empty() {
        return Ok(0);
    }

    let annual_rate = tiers.rate_for(account.principal)?;
    let elapsed = env
        .ledger()
        .timestamp()
        .saturating_sub(account.accrual_start);

    accrued_reward(account.principal, annual_rate, elapsed).ok_or_else(|| {
        log!(
            env,
            "Stake: Pending reward: overflow computing reward for principal {} over {} seconds",
            account.principal,
            elapsed
        );
        ContractError::ContractMathError
    })
}
