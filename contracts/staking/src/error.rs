use membership_tiers::TierError;
use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 500,
    InvalidMinStake = 501,
    ConfigNotSet = 502,
    AdminNotSet = 503,

    ThresholdNotIncreasing = 510,
    RateNotIncreasing = 511,
    IndexOutOfRange = 512,
    ThresholdViolatesUpperBound = 513,
    ThresholdViolatesLowerBound = 514,
    RateViolatesUpperBound = 515,
    RateViolatesLowerBound = 516,
    NegativeThreshold = 517,
    EmptyMembershipTable = 518,
    LastMembershipTier = 519,

    BelowMinimumStake = 520,
    NothingToClaim = 521,
    ContractMathError = 522,

    SameAdmin = 530,
    NoAdminChangeInPlace = 531,
    AdminChangeExpired = 532,
}

impl From<TierError> for ContractError {
    fn from(err: TierError) -> Self {
        match err {
            TierError::ThresholdNotIncreasing => ContractError::ThresholdNotIncreasing,
            TierError::RateNotIncreasing => ContractError::RateNotIncreasing,
            TierError::IndexOutOfRange => ContractError::IndexOutOfRange,
            TierError::ThresholdViolatesUpperBound => ContractError::ThresholdViolatesUpperBound,
            TierError::ThresholdViolatesLowerBound => ContractError::ThresholdViolatesLowerBound,
            TierError::RateViolatesUpperBound => ContractError::RateViolatesUpperBound,
            TierError::RateViolatesLowerBound => ContractError::RateViolatesLowerBound,
            TierError::NegativeThreshold => ContractError::NegativeThreshold,
            TierError::EmptyTable => ContractError::EmptyMembershipTable,
            TierError::LastTier => ContractError::LastMembershipTier,
        }
    }
}
