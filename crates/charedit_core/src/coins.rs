use serde::{Deserialize, Serialize};

pub const COPPER_PER_SILVER: i32 = 100;
pub const COPPER_PER_GOLD: i32 = 10_000;

/// Denominations shown for a copper total. Platinum is stored separately and
/// never derived from the total.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coins {
    pub gold: i32,
    pub silver: i32,
    pub copper: i32,
}

impl Coins {
    // Each denomination wraps at 100, so gold above 99 is not representable.
    pub fn split(total: i32) -> Self {
        Self {
            gold: (total / COPPER_PER_GOLD) % 100,
            silver: (total / COPPER_PER_SILVER) % 100,
            copper: total % 100,
        }
    }

    pub fn combine(gold: i32, silver: i32, copper: i32) -> i32 {
        gold.wrapping_mul(COPPER_PER_GOLD)
            .wrapping_add(silver.wrapping_mul(COPPER_PER_SILVER))
            .wrapping_add(copper)
    }

    pub fn total(&self) -> i32 {
        Self::combine(self.gold, self.silver, self.copper)
    }
}
