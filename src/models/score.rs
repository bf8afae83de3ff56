//! Hard/soft schedule score.
//!
//! Scores are lexicographically ordered pairs of decimals: any schedule
//! with a negative hard score is infeasible regardless of its soft
//! score. Decimal components keep penalty arithmetic exact (the balance
//! constraint contributes fractional values).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// A lexicographic (hard, soft) score.
///
/// The derived `Ord` compares `hard` first, then `soft`, which is
/// exactly the dominance rule the optimizer's acceptance test needs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HardSoftScore {
    /// Hard constraint total. Negative means infeasible.
    pub hard: Decimal,
    /// Soft constraint total. Higher is better.
    pub soft: Decimal,
}

impl HardSoftScore {
    /// The zero score.
    pub const ZERO: HardSoftScore = HardSoftScore {
        hard: Decimal::ZERO,
        soft: Decimal::ZERO,
    };

    /// Creates a score from its components.
    pub fn new(hard: Decimal, soft: Decimal) -> Self {
        Self { hard, soft }
    }

    /// A score with only a hard component.
    pub fn of_hard(hard: i64) -> Self {
        Self {
            hard: Decimal::from(hard),
            soft: Decimal::ZERO,
        }
    }

    /// A score with only a soft component.
    pub fn of_soft(soft: i64) -> Self {
        Self {
            hard: Decimal::ZERO,
            soft: Decimal::from(soft),
        }
    }

    /// Whether no hard constraints are broken.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.hard >= Decimal::ZERO
    }
}

impl Add for HardSoftScore {
    type Output = HardSoftScore;

    fn add(self, rhs: HardSoftScore) -> HardSoftScore {
        HardSoftScore {
            hard: self.hard + rhs.hard,
            soft: self.soft + rhs.soft,
        }
    }
}

impl AddAssign for HardSoftScore {
    fn add_assign(&mut self, rhs: HardSoftScore) {
        self.hard += rhs.hard;
        self.soft += rhs.soft;
    }
}

impl Sub for HardSoftScore {
    type Output = HardSoftScore;

    fn sub(self, rhs: HardSoftScore) -> HardSoftScore {
        HardSoftScore {
            hard: self.hard - rhs.hard,
            soft: self.soft - rhs.soft,
        }
    }
}

impl Neg for HardSoftScore {
    type Output = HardSoftScore;

    fn neg(self) -> HardSoftScore {
        HardSoftScore {
            hard: -self.hard,
            soft: -self.soft,
        }
    }
}

impl std::iter::Sum for HardSoftScore {
    fn sum<I: Iterator<Item = HardSoftScore>>(iter: I) -> HardSoftScore {
        iter.fold(HardSoftScore::ZERO, Add::add)
    }
}

impl fmt::Display for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{}soft", self.hard, self.soft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lexicographic_ordering() {
        // Hard dominates soft.
        assert!(HardSoftScore::of_hard(-1) < HardSoftScore::ZERO);
        assert!(HardSoftScore::new(dec!(-1), dec!(100)) < HardSoftScore::new(dec!(0), dec!(-100)));
        // Equal hard: soft decides.
        assert!(HardSoftScore::of_soft(-2) < HardSoftScore::of_soft(1));
        assert!(HardSoftScore::of_soft(3) > HardSoftScore::ZERO);
    }

    #[test]
    fn test_feasibility() {
        assert!(HardSoftScore::ZERO.is_feasible());
        assert!(HardSoftScore::of_soft(-50).is_feasible());
        assert!(!HardSoftScore::of_hard(-1).is_feasible());
    }

    #[test]
    fn test_arithmetic() {
        let a = HardSoftScore::new(dec!(-2), dec!(3));
        let b = HardSoftScore::new(dec!(-1), dec!(-1));
        assert_eq!(a + b, HardSoftScore::new(dec!(-3), dec!(2)));
        assert_eq!(a - b, HardSoftScore::new(dec!(-1), dec!(4)));
        assert_eq!(-a, HardSoftScore::new(dec!(2), dec!(-3)));

        let sum: HardSoftScore = [a, b, HardSoftScore::ZERO].into_iter().sum();
        assert_eq!(sum, HardSoftScore::new(dec!(-3), dec!(2)));
    }

    #[test]
    fn test_display() {
        let s = HardSoftScore::new(dec!(-2), dec!(3.5));
        assert_eq!(s.to_string(), "-2hard/3.5soft");
    }
}
