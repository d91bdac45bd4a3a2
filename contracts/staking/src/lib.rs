#![no_std]
mod contract;
mod error;
mod msg;
mod rewards;
mod storage;

pub use contract::{Staking, StakingClient};
pub use error::ContractError;
