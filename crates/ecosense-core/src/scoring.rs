//! Sustainability scoring.
//!
//! The score starts at 100 and loses a fixed penalty per channel according
//! to the grade of its band. Channels without data are not free: they cost
//! the `unknown` penalty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ecosense_types::{Channel, ConditionBand, Grade};

use crate::error::{Error, Result};

/// Points deducted per channel by grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    pub excellent: u32,
    pub good: u32,
    pub moderate: u32,
    pub poor: u32,
    /// Applied to channels classified [`ConditionBand::Unknown`].
    pub unknown: u32,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            excellent: 0,
            good: 5,
            moderate: 15,
            poor: 30,
            unknown: 10,
        }
    }
}

impl PenaltyConfig {
    /// Penalty for a band.
    #[must_use]
    pub fn penalty(&self, band: ConditionBand) -> u32 {
        match band.grade() {
            Some(Grade::Excellent) => self.excellent,
            Some(Grade::Good) => self.good,
            Some(Grade::Moderate) => self.moderate,
            Some(Grade::Poor) => self.poor,
            None => self.unknown,
        }
    }

    /// Penalties must not decrease as grades get worse.
    pub fn validate(&self) -> Result<()> {
        let ladder = [self.excellent, self.good, self.moderate, self.poor];
        if ladder.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::InvalidConfig(format!(
                "penalties must be non-decreasing from excellent to poor, got {ladder:?}"
            )));
        }
        Ok(())
    }
}

/// A channel whose band grade is worse than good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deficiency {
    pub channel: Channel,
    pub band: ConditionBand,
    pub grade: Grade,
    pub penalty: u32,
}

/// Result of scoring a set of bands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreCard {
    /// 0-100.
    pub score: u8,
    pub total_penalty: u32,
    /// Worst first; equal penalties in channel priority order.
    pub deficiencies: Vec<Deficiency>,
}

/// Turns condition bands into a score.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    penalties: PenaltyConfig,
}

impl Scorer {
    pub fn new(penalties: PenaltyConfig) -> Self {
        Self { penalties }
    }

    pub fn penalties(&self) -> &PenaltyConfig {
        &self.penalties
    }

    /// Score a band per channel.
    pub fn score(&self, bands: &BTreeMap<Channel, ConditionBand>) -> ScoreCard {
        let total_penalty = bands
            .values()
            .map(|&b| self.penalties.penalty(b))
            .fold(0, u32::saturating_add);
        let score = 100u32.saturating_sub(total_penalty) as u8;

        let mut deficiencies: Vec<Deficiency> = bands
            .iter()
            .filter_map(|(&channel, &band)| {
                let grade = band.grade().filter(|g| *g > Grade::Good)?;
                Some(Deficiency {
                    channel,
                    band,
                    grade,
                    penalty: self.penalties.penalty(band),
                })
            })
            .collect();
        deficiencies.sort_by(|a, b| {
            b.penalty
                .cmp(&a.penalty)
                .then_with(|| a.channel.cmp(&b.channel))
        });

        ScoreCard {
            score,
            total_penalty,
            deficiencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands(pairs: &[(Channel, ConditionBand)]) -> BTreeMap<Channel, ConditionBand> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_perfect_score() {
        let card = Scorer::default().score(&bands(&[
            (Channel::Co2, ConditionBand::Excellent),
            (Channel::Temperature, ConditionBand::Comfortable),
            (Channel::Humidity, ConditionBand::Comfortable),
            (Channel::Motion, ConditionBand::Low),
            (Channel::Light, ConditionBand::Adequate),
        ]));
        assert_eq!(card.score, 100);
        assert!(card.deficiencies.is_empty());
    }

    #[test]
    fn test_unknown_costs_the_unknown_penalty() {
        let card = Scorer::default().score(&bands(&[
            (Channel::Co2, ConditionBand::Excellent),
            (Channel::Humidity, ConditionBand::Unknown),
        ]));
        assert_eq!(card.score, 90);
        assert!(card.deficiencies.is_empty());
    }

    #[test]
    fn test_deficiencies_sorted_by_penalty_then_priority() {
        let card = Scorer::default().score(&bands(&[
            (Channel::Co2, ConditionBand::Moderate),
            (Channel::Temperature, ConditionBand::Hot),
            (Channel::Humidity, ConditionBand::Humid),
            (Channel::Light, ConditionBand::Bright),
        ]));
        assert_eq!(card.total_penalty, 15 + 30 + 15 + 5);
        assert_eq!(card.score, 35);
        let order: Vec<_> = card.deficiencies.iter().map(|d| d.channel).collect();
        assert_eq!(order, vec![Channel::Temperature, Channel::Co2, Channel::Humidity]);
        assert_eq!(card.deficiencies[0].grade, Grade::Poor);
    }

    #[test]
    fn test_score_floor_is_zero() {
        let card = Scorer::new(PenaltyConfig {
            poor: 60,
            ..PenaltyConfig::default()
        })
        .score(&bands(&[
            (Channel::Co2, ConditionBand::Poor),
            (Channel::Temperature, ConditionBand::Hot),
        ]));
        assert_eq!(card.score, 0);
        assert_eq!(card.total_penalty, 120);
    }

    #[test]
    fn test_huge_penalties_saturate() {
        let card = Scorer::new(PenaltyConfig {
            moderate: u32::MAX,
            poor: u32::MAX,
            ..PenaltyConfig::default()
        })
        .score(&bands(&[
            (Channel::Co2, ConditionBand::Poor),
            (Channel::Temperature, ConditionBand::Hot),
        ]));
        assert_eq!(card.score, 0);
        assert_eq!(card.total_penalty, u32::MAX);
    }

    #[test]
    fn test_penalty_validation() {
        PenaltyConfig::default().validate().unwrap();
        let bad = PenaltyConfig {
            good: 40,
            ..PenaltyConfig::default()
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidConfig(_))));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const ALL_BANDS: [ConditionBand; 20] = [
        ConditionBand::Excellent,
        ConditionBand::Good,
        ConditionBand::Moderate,
        ConditionBand::Poor,
        ConditionBand::Cold,
        ConditionBand::Comfortable,
        ConditionBand::Warm,
        ConditionBand::Hot,
        ConditionBand::Dry,
        ConditionBand::Humid,
        ConditionBand::Damp,
        ConditionBand::Dim,
        ConditionBand::Adequate,
        ConditionBand::Bright,
        ConditionBand::Excessive,
        ConditionBand::Vacant,
        ConditionBand::Low,
        ConditionBand::Busy,
        ConditionBand::Crowded,
        ConditionBand::Unknown,
    ];

    fn arb_band() -> impl Strategy<Value = ConditionBand> {
        proptest::sample::select(ALL_BANDS.to_vec())
    }

    proptest! {
        /// Replacing one channel's band with a better-graded one never lowers the score.
        #[test]
        fn score_monotonic_under_improvement(
            current in proptest::collection::vec(arb_band(), 5),
            idx in 0usize..5,
            better in arb_band(),
        ) {
            let before: BTreeMap<_, _> = Channel::ALL.into_iter().zip(current.iter().copied()).collect();
            let channel = Channel::ALL[idx];
            let old = before[&channel];
            prop_assume!(old.grade().is_some() && better.grade().is_some());
            prop_assume!(better.grade() <= old.grade());

            let mut after = before.clone();
            after.insert(channel, better);

            let scorer = Scorer::default();
            prop_assert!(scorer.score(&after).score >= scorer.score(&before).score);
        }

        /// The score always stays within 0..=100.
        #[test]
        fn score_in_range(current in proptest::collection::vec(arb_band(), 5)) {
            let bands: BTreeMap<_, _> = Channel::ALL.into_iter().zip(current).collect();
            prop_assert!(Scorer::default().score(&bands).score <= 100);
        }
    }
}
