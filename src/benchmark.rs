use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Performance tiers, best first. The derived ordering is the quality
/// ordering: `WorldClass < Excellent < ... < VerySlow`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Tier {
    WorldClass,
    Excellent,
    Good,
    Average,
    Slow,
    VerySlow,
}

impl Tier {
    pub const ALL: [Tier; 6] = [
        Tier::WorldClass,
        Tier::Excellent,
        Tier::Good,
        Tier::Average,
        Tier::Slow,
        Tier::VerySlow,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tier::WorldClass => "World class",
            Tier::Excellent => "Excellent",
            Tier::Good => "Good",
            Tier::Average => "Average",
            Tier::Slow => "Slow",
            Tier::VerySlow => "Very slow",
        }
    }

    pub fn color_hint(self) -> &'static str {
        match self {
            Tier::WorldClass => "#a855f7",
            Tier::Excellent => "#22c55e",
            Tier::Good => "#84cc16",
            Tier::Average => "#eab308",
            Tier::Slow => "#f97316",
            Tier::VerySlow => "#ef4444",
        }
    }
}

/// Result of rating an average reaction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    /// Nothing was measured.
    NoData,
    Rated(Tier),
}

impl Rating {
    pub fn tier(self) -> Option<Tier> {
        match self {
            Rating::NoData => None,
            Rating::Rated(t) => Some(t),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::NoData => "No data",
            Rating::Rated(t) => t.label(),
        }
    }

    pub fn color_hint(self) -> &'static str {
        match self {
            Rating::NoData => "#9ca3af",
            Rating::Rated(t) => t.color_hint(),
        }
    }
}

/// Upper bounds (inclusive, milliseconds) for each tier in `Tier::ALL` order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkTable {
    thresholds: [u64; 6],
}

impl BenchmarkTable {
    pub fn new(thresholds: [u64; 6]) -> Result<Self, ConfigError> {
        if thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::UnorderedThresholds(thresholds));
        }
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &[u64; 6] {
        &self.thresholds
    }

    /// First tier whose threshold is not exceeded, `VerySlow` past the last.
    pub fn rate(&self, average_ms: Option<f64>) -> Rating {
        let Some(avg) = average_ms.filter(|a| !a.is_nan()) else {
            return Rating::NoData;
        };
        let tier = Tier::ALL
            .into_iter()
            .zip(self.thresholds)
            .find(|&(_, limit)| avg <= limit as f64)
            .map(|(tier, _)| tier)
            .unwrap_or(Tier::VerySlow);
        Rating::Rated(tier)
    }
}

/// Simple reaction benchmarks used by the signal game
impl Default for BenchmarkTable {
    fn default() -> Self {
        Self {
            thresholds: [150, 200, 250, 300, 400, 500],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn tiers_order_best_first() {
        assert!(Tier::WorldClass < Tier::Excellent);
        assert!(Tier::Slow < Tier::VerySlow);
        let mut sorted = Tier::ALL;
        sorted.sort();
        assert_eq!(sorted, Tier::ALL);
    }

    #[test]
    fn first_matching_threshold_wins() {
        let t = BenchmarkTable::default();
        assert_eq!(t.rate(Some(0.0)), Rating::Rated(Tier::WorldClass));
        assert_eq!(t.rate(Some(150.0)), Rating::Rated(Tier::WorldClass));
        assert_eq!(t.rate(Some(150.5)), Rating::Rated(Tier::Excellent));
        assert_eq!(t.rate(Some(300.0)), Rating::Rated(Tier::Average));
        assert_eq!(t.rate(Some(499.0)), Rating::Rated(Tier::VerySlow));
        assert_eq!(t.rate(Some(10_000.0)), Rating::Rated(Tier::VerySlow));
    }

    #[test]
    fn no_samples_is_no_data() {
        let t = BenchmarkTable::default();
        assert_eq!(t.rate(None), Rating::NoData);
        assert_eq!(t.rate(Some(f64::NAN)), Rating::NoData);
        assert_eq!(Rating::NoData.label(), "No data");
        assert_eq!(Rating::NoData.tier(), None);
    }

    #[test]
    fn rating_is_monotonic() {
        let t = BenchmarkTable::new([100, 180, 260, 340, 420, 600]).unwrap();
        let mut previous = Tier::WorldClass;
        for ms in (0..1_000).step_by(7) {
            let tier = t.rate(Some(ms as f64)).tier().unwrap();
            assert!(tier >= previous, "{ms} ms rated {tier:?} after {previous:?}");
            previous = tier;
        }
    }

    #[test]
    fn rejects_unordered_thresholds() {
        assert_matches!(
            BenchmarkTable::new([100, 100, 200, 300, 400, 500]),
            Err(ConfigError::UnorderedThresholds(_))
        );
        assert_matches!(
            BenchmarkTable::new([600, 500, 400, 300, 200, 100]),
            Err(ConfigError::UnorderedThresholds(_))
        );
    }

    #[test]
    fn every_tier_has_label_and_color() {
        for tier in Tier::ALL {
            assert!(!tier.label().is_empty());
            assert!(tier.color_hint().starts_with('#'));
            assert_eq!(tier.color_hint().len(), 7);
        }
    }
}
