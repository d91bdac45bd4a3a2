use soroban_sdk::contracttype;

use crate::storage::Config;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigResponse {
    pub config: Config,
}

/// Snapshot of a participant's position.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeInfoResponse {
    /// Amount currently staked
    pub staked: i128,
    /// Per-mille annual rate the staked amount earns
    pub apy: u32,
}
