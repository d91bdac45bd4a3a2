#![no_std]

use soroban_sdk::{contracttype, Env, Vec};

/// Denominator of an `annual_rate`: a rate of 1_000 is a 100% yearly yield.
pub const RATE_DENOMINATOR: u32 = 1_000;

/// Handle tier table errors
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TierError {
    /// A new tier must ask for more than the last one
    ThresholdNotIncreasing,

    /// A new tier must pay more than the last one
    RateNotIncreasing,

    /// No tier at the given index
    IndexOutOfRange,

    /// Changed threshold reaches the threshold of the next tier
    ThresholdViolatesUpperBound,

    /// Changed threshold falls to the threshold of the previous tier
    ThresholdViolatesLowerBound,

    /// Changed rate reaches the rate of the next tier
    RateViolatesUpperBound,

    /// Changed rate falls to the rate of the previous tier
    RateViolatesLowerBound,

    /// Thresholds are token amounts and can not be negative
    NegativeThreshold,

    /// A table must hold at least the floor tier
    EmptyTable,

    /// Removing the floor tier would leave amounts without a rate
    LastTier,
}

/// A single yield bracket.
#[contracttype]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MembershipTier {
    /// Minimum staked amount (token base units) that qualifies for this tier
    pub threshold: i128,
    /// Yearly yield in per-mille
    pub annual_rate: u32,
}

impl MembershipTier {
    pub fn new(threshold: i128, annual_rate: u32) -> Self {
        MembershipTier {
            threshold,
            annual_rate,
        }
    }
}

/// Which neighbour a changed value collided with.
enum Bound {
    Upper,
    Lower,
}

/// Tiers ordered by index, with thresholds and rates both strictly increasing.
/// Index 0 is the floor tier and applies to every amount below tier 1.
#[contracttype]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MembershipTable {
    pub tiers: Vec<MembershipTier>,
}

impl MembershipTable {
    pub fn new(env: &Env) -> Self {
        MembershipTable {
            tiers: Vec::new(env),
        }
    }

    /// Builds a table from a list of tiers, applying the same checks as
    /// appending them one by one.
    pub fn from_tiers(tiers: Vec<MembershipTier>) -> Result<Self, TierError> {
        if tiers.is_empty() {
            return Err(TierError::EmptyTable);
        }

        let mut table = MembershipTable::new(tiers.env());
        for tier in tiers.iter() {
            table.add(tier)?;
        }

        Ok(table)
    }

    pub fn len(&self) -> u32 {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn get(&self, index: u32) -> Result<MembershipTier, TierError> {
        self.tiers.get(index).ok_or(TierError::IndexOutOfRange)
    }

    /// Appends a tier above every existing one.
    pub fn add(&mut self, tier: MembershipTier) -> Result<(), TierError> {
        if tier.threshold < 0 {
            return Err(TierError::NegativeThreshold);
        }

        if let Some(last) = self.tiers.last() {
            if tier.threshold <= last.threshold {
                return Err(TierError::ThresholdNotIncreasing);
            }
            if tier.annual_rate <= last.annual_rate {
                return Err(TierError::RateNotIncreasing);
            }
        }

        self.tiers.push_back(tier);
        Ok(())
    }

    /// Removes the tier at `index`, shifting the ones above it down by one.
    /// Dropping an element from a strictly increasing sequence keeps it strictly
    /// increasing, so nothing else is checked.
    pub fn remove(&mut self, index: u32) -> Result<MembershipTier, TierError> {
        let removed = self.get(index)?;
        if self.len() == 1 {
            return Err(TierError::LastTier);
        }

        self.tiers.remove(index);
        Ok(removed)
    }

    pub fn change_threshold(&mut self, index: u32, new_threshold: i128) -> Result<(), TierError> {
        let mut tier = self.get(index)?;
        if new_threshold < 0 {
            return Err(TierError::NegativeThreshold);
        }

        self.check_neighbours(index, &new_threshold, |t| t.threshold)
            .map_err(|bound| match bound {
                Bound::Upper => TierError::ThresholdViolatesUpperBound,
                Bound::Lower => TierError::ThresholdViolatesLowerBound,
            })?;

        tier.threshold = new_threshold;
        self.tiers.set(index, tier);
        Ok(())
    }

    pub fn change_rate(&mut self, index: u32, new_rate: u32) -> Result<(), TierError> {
        let mut tier = self.get(index)?;

        self.check_neighbours(index, &new_rate, |t| t.annual_rate)
            .map_err(|bound| match bound {
                Bound::Upper => TierError::RateViolatesUpperBound,
                Bound::Lower => TierError::RateViolatesLowerBound,
            })?;

        tier.annual_rate = new_rate;
        self.tiers.set(index, tier);
        Ok(())
    }

    /// Rate of the highest tier whose threshold is covered by `amount`,
    /// or the floor tier's rate when `amount` is below all of them.
    pub fn rate_for(&self, amount: i128) -> Result<u32, TierError> {
        let floor = self.tiers.first().ok_or(TierError::EmptyTable)?;

        let rate = self
            .tiers
            .iter()
            .take_while(|tier| tier.threshold <= amount)
            .last()
            .map_or(floor.annual_rate, |tier| tier.annual_rate);

        Ok(rate)
    }

    /// `index` must already be known to be in range.
    fn check_neighbours<T: Ord>(
        &self,
        index: u32,
        value: &T,
        key: impl Fn(&MembershipTier) -> T,
    ) -> Result<(), Bound> {
        if let Some(next) = self.tiers.get(index + 1) {
            if *value >= key(&next) {
                return Err(Bound::Upper);
            }
        }

        if index > 0 {
            if let Some(previous) = self.tiers.get(index - 1) {
                if *value <= key(&previous) {
                    return Err(Bound::Lower);
                }
            }
        }

        Ok(())
    }
}
