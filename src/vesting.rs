//! Vesting curves measured from the listing time, and the BCUBE schedule.

use alloy_primitives::U256;

use crate::errors::*;
use crate::tiers::Round;

pub const DAY: u64 = 24 * 60 * 60;
pub const WEEK: u64 = 7 * DAY;
pub const MONTH: u64 = 30 * DAY;

/// Basis points in a whole allocation.
pub const FULL_BPS: u64 = 10_000;

/// Fraction of an allocation unlocked after some time since listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VestingCurve {
    /// `initial_bps` at listing, plus `step_bps` once `first_step` has elapsed and
    /// again every `interval` after that. Nothing unlocks between boundaries.
    Step {
        initial_bps: u64,
        first_step: u64,
        interval: u64,
        step_bps: u64,
    },
    /// Nothing before `cliff`, then one of `periods` equal slices per elapsed
    /// `period`.
    Linear { cliff: u64, period: u64, periods: u64 },
}

impl VestingCurve {
    /// Quarterly steps: a quarter at each of 26, 52, 78 and 104 weeks.
    pub const fn quarterly() -> Self {
        VestingCurve::Step {
            initial_bps: 0,
            first_step: 26 * WEEK,
            interval: 26 * WEEK,
            step_bps: 2_500,
        }
    }

    /// A quarter every 30 days, `initial_bps` already at listing.
    pub const fn monthly_quarters(initial_bps: u64) -> Self {
        VestingCurve::Step {
            initial_bps,
            first_step: MONTH,
            interval: MONTH,
            step_bps: 2_500,
        }
    }

    /// Equal weekly slices from listing over `weeks` weeks.
    pub const fn weekly(weeks: u64) -> Self {
        VestingCurve::Linear {
            cliff: 0,
            period: WEEK,
            periods: weeks,
        }
    }

    /// Everything at listing.
    pub const fn immediate() -> Self {
        VestingCurve::Step {
            initial_bps: FULL_BPS,
            first_step: 0,
            interval: 0,
            step_bps: 0,
        }
    }

    pub fn validate(&self) -> Result<(), Errors> {
        let valid = match *self {
            VestingCurve::Step {
                initial_bps,
                interval,
                step_bps,
                ..
            } => initial_bps <= FULL_BPS && (initial_bps == FULL_BPS || (interval > 0 && step_bps > 0)),
            VestingCurve::Linear { period, periods, .. } => period > 0 && periods > 0,
        };
        if !valid {
            return Err(Errors::InvalidConfig(InvalidConfig {}));
        }

        Ok(())
    }

    /// Unlocked share of `total` after `elapsed` seconds, rounded down.
    pub fn unlocked(&self, total: U256, elapsed: u64) -> U256 {
        let (numerator, denominator) = self.fraction(elapsed);
        total.saturating_mul(U256::from(numerator)) / U256::from(denominator)
    }

    /// Unlocked fraction as `(numerator, denominator)`, never above one.
    pub fn fraction(&self, elapsed: u64) -> (u64, u64) {
        match *self {
            VestingCurve::Step {
                initial_bps,
                first_step,
                interval,
                step_bps,
            } => {
                if elapsed < first_step || interval == 0 {
                    return (initial_bps.min(FULL_BPS), FULL_BPS);
                }
                let steps = 1 + (elapsed - first_step) / interval;
                let bps = initial_bps.saturating_add(steps.saturating_mul(step_bps));
                (bps.min(FULL_BPS), FULL_BPS)
            }
            VestingCurve::Linear {
                cliff,
                period,
                periods,
            } => {
                if elapsed < cliff || period == 0 || periods == 0 {
                    return (0, periods.max(1));
                }
                (((elapsed - cliff) / period).min(periods), periods)
            }
        }
    }

    /// Seconds after listing at which the whole allocation is unlocked.
    pub fn fully_vested_after(&self) -> u64 {
        match *self {
            VestingCurve::Step {
                initial_bps,
                first_step,
                interval,
                step_bps,
            } => {
                if initial_bps >= FULL_BPS || step_bps == 0 {
                    return 0;
                }
                let steps = (FULL_BPS - initial_bps).div_ceil(step_bps);
                first_step + (steps - 1) * interval
            }
            VestingCurve::Linear {
                cliff,
                period,
                periods,
            } => cliff + period * periods,
        }
    }
}

/// One curve per treasury bucket and per sale round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VestingSchedule {
    pub team: VestingCurve,
    pub dev_fund: VestingCurve,
    pub advisors: VestingCurve,
    pub reserves: VestingCurve,
    pub bounty: VestingCurve,
    pub community: VestingCurve,
    pub private_sale: VestingCurve,
    pub private_round: VestingCurve,
    pub public_round: VestingCurve,
    pub pre_ico: VestingCurve,
    pub ico: VestingCurve,
    pub private_allocation: VestingCurve,
}

impl VestingSchedule {
    pub fn bcube() -> Self {
        Self {
            team: VestingCurve::quarterly(),
            dev_fund: VestingCurve::quarterly(),
            advisors: VestingCurve::quarterly(),
            reserves: VestingCurve::weekly(104),
            bounty: VestingCurve::immediate(),
            community: VestingCurve::weekly(52),
            private_sale: VestingCurve::monthly_quarters(0),
            private_round: VestingCurve::weekly(26),
            public_round: VestingCurve::weekly(15),
            pre_ico: VestingCurve::monthly_quarters(2_500),
            ico: VestingCurve::monthly_quarters(5_000),
            private_allocation: VestingCurve::weekly(52),
        }
    }

    pub fn round(&self, round: Round) -> &VestingCurve {
        match round {
            Round::PrivateSale => &self.private_sale,
            Round::PrivateRound => &self.private_round,
            Round::PublicRound => &self.public_round,
            Round::PreIco => &self.pre_ico,
            Round::Ico => &self.ico,
        }
    }

    fn curves(&self) -> [&VestingCurve; 12] {
        [
            &self.team,
            &self.dev_fund,
            &self.advisors,
            &self.reserves,
            &self.bounty,
            &self.community,
            &self.private_sale,
            &self.private_round,
            &self.public_round,
            &self.pre_ico,
            &self.ico,
            &self.private_allocation,
        ]
    }

    pub fn validate(&self) -> Result<(), Errors> {
        self.curves().iter().try_for_each(|curve| curve.validate())
    }
}
