//! Stage Module - Progress to stage mapping
//!
//! One parametrized rule covers every scroll-driven section:
//!
//! | Rule | Output | Mapping |
//! |---|---|---|
//! | `WordCarousel` | `Offset` | `progress * -distance_em` |
//! | `PairReveal` | `Index 0..=2` | not started → 0, `< 0.5` → 1, else 2 |
//! | `GroupToggle` | `Index 1..=2` | `< 0.5` → 1, else 2 |
//! | `RowStagger` | `Index 0..=7` | `Steps { count: 7 }` |
//! | `Steps { count }` | `Index 0..=count` | not started → 0, exceeded → count, else `min(floor(p*count)+1, count)` |
//!
//! Every rule lands on its floor before the track starts and on its ceiling
//! once the track is exceeded. A fast fling that skips intermediate scroll
//! events still ends fully revealed.

use serde::Deserialize;

use crate::state::progress::TrackSample;
use crate::types::StageValue;

/// Default carousel travel in em units.
pub const WORD_CAROUSEL_DISTANCE_EM: f64 = 5.7;

/// Row count of the row stagger.
pub const ROW_STAGGER_ROWS: u8 = 7;

/// Progress boundary of the two-way toggles.
const HALFWAY: f64 = 0.5;

fn default_distance() -> f64 {
    WORD_CAROUSEL_DISTANCE_EM
}

/// Mapping from track progress to a stage.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageRule {
    WordCarousel {
        #[serde(default = "default_distance")]
        distance_em: f64,
    },
    PairReveal,
    GroupToggle,
    RowStagger,
    Steps {
        count: u8,
    },
}

impl Default for StageRule {
    fn default() -> Self {
        Self::word_carousel()
    }
}

impl StageRule {
    /// Carousel with the default travel.
    pub const fn word_carousel() -> Self {
        Self::WordCarousel {
            distance_em: WORD_CAROUSEL_DISTANCE_EM,
        }
    }

    /// Stage reported before the track enters scroll range.
    pub fn floor(&self) -> StageValue {
        match *self {
            Self::WordCarousel { .. } => StageValue::Offset(0.0),
            Self::PairReveal => StageValue::Index(0),
            Self::GroupToggle => StageValue::Index(1),
            Self::RowStagger | Self::Steps { .. } => StageValue::Index(0),
        }
    }

    /// Stage reported once the track is fully scrolled past.
    pub fn ceiling(&self) -> StageValue {
        match *self {
            Self::WordCarousel { distance_em } => StageValue::Offset(-distance_em),
            Self::PairReveal | Self::GroupToggle => StageValue::Index(2),
            Self::RowStagger => StageValue::Index(ROW_STAGGER_ROWS),
            Self::Steps { count } => StageValue::Index(count),
        }
    }

    /// Map one sample to a stage.
    pub fn map(&self, sample: &TrackSample) -> StageValue {
        if sample.not_started() {
            return self.floor();
        }
        if sample.exceeded() {
            return self.ceiling();
        }

        let progress = sample.progress;
        match *self {
            Self::WordCarousel { distance_em } => StageValue::Offset(progress * -distance_em),
            Self::PairReveal | Self::GroupToggle => {
                StageValue::Index(if progress < HALFWAY { 1 } else { 2 })
            }
            Self::RowStagger => StageValue::Index(steps(progress, ROW_STAGGER_ROWS)),
            Self::Steps { count } => StageValue::Index(steps(progress, count)),
        }
    }
}

/// `min(floor(progress * count) + 1, count)` for progress in [0,1].
fn steps(progress: f64, count: u8) -> u8 {
    if count == 0 {
        return 0;
    }
    let raw = (progress.clamp(0.0, 1.0) * count as f64).floor() as u32 + 1;
    raw.min(count as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::progress::TrackSample;
    use crate::types::Rect;

    const VIEWPORT: f64 = 800.0;

    /// Sample a 1600px track scrolled `scroll_top` pixels into it.
    fn at(scroll_top: f64) -> TrackSample {
        TrackSample::from_rect(Rect::new(-scroll_top, 1600.0), VIEWPORT)
    }

    fn all_rules() -> [StageRule; 5] {
        [
            StageRule::word_carousel(),
            StageRule::PairReveal,
            StageRule::GroupToggle,
            StageRule::RowStagger,
            StageRule::Steps { count: 4 },
        ]
    }

    #[test]
    fn test_not_started_maps_to_floor() {
        for rule in all_rules() {
            for scroll_top in [-1.0, -250.0, -5000.0] {
                assert_eq!(rule.map(&at(scroll_top)), rule.floor(), "{rule:?}");
            }
        }
    }

    #[test]
    fn test_exceeded_maps_to_ceiling() {
        for rule in all_rules() {
            for scroll_top in [800.5, 1200.0, 90_000.0] {
                assert_eq!(rule.map(&at(scroll_top)), rule.ceiling(), "{rule:?}");
            }
        }
    }

    #[test]
    fn test_degenerate_track_maps_to_ceiling() {
        let short = TrackSample::from_rect(Rect::new(0.0, 400.0), VIEWPORT);
        for rule in all_rules() {
            assert_eq!(rule.map(&short), rule.ceiling(), "{rule:?}");
        }
    }

    #[test]
    fn test_halfway_example() {
        let sample = at(400.0);
        assert_eq!(sample.progress, 0.5);
        assert_eq!(StageRule::GroupToggle.map(&sample), StageValue::Index(2));
        assert_eq!(StageRule::PairReveal.map(&sample), StageValue::Index(2));
    }

    #[test]
    fn test_pair_reveal_stages() {
        assert_eq!(StageRule::PairReveal.map(&at(-10.0)), StageValue::Index(0));
        assert_eq!(StageRule::PairReveal.map(&at(0.0)), StageValue::Index(1));
        assert_eq!(StageRule::PairReveal.map(&at(399.0)), StageValue::Index(1));
        assert_eq!(StageRule::PairReveal.map(&at(800.0)), StageValue::Index(2));
    }

    #[test]
    fn test_group_toggle_collapses_floor_into_first_group() {
        assert_eq!(StageRule::GroupToggle.map(&at(-10.0)), StageValue::Index(1));
        assert_eq!(StageRule::GroupToggle.map(&at(0.0)), StageValue::Index(1));
        assert_eq!(StageRule::GroupToggle.map(&at(399.0)), StageValue::Index(1));
    }

    #[test]
    fn test_word_carousel_is_continuous() {
        let rule = StageRule::word_carousel();
        assert_eq!(rule.map(&at(0.0)), StageValue::Offset(0.0));
        assert_eq!(rule.map(&at(400.0)), StageValue::Offset(-2.85));
        assert_eq!(rule.map(&at(800.0)), StageValue::Offset(-5.7));

        let custom = StageRule::WordCarousel { distance_em: 2.0 };
        assert_eq!(custom.map(&at(200.0)), StageValue::Offset(-0.5));
    }

    #[test]
    fn test_row_stagger_values() {
        let rule = StageRule::RowStagger;
        assert_eq!(rule.map(&at(0.0)), StageValue::Index(1));
        // 1/7 of the way in opens the second row
        assert_eq!(rule.map(&at(800.0 / 7.0 + 0.01)), StageValue::Index(2));
        assert_eq!(rule.map(&at(799.0)), StageValue::Index(7));
        assert_eq!(rule.map(&at(800.0)), StageValue::Index(7));
    }

    #[test]
    fn test_row_stagger_monotonic() {
        let rule = StageRule::RowStagger;
        let mut last = 0;
        for step in 0..=1000 {
            let p = step as f64 / 1000.0;
            let rows = rule.map(&at(p * 800.0)).index().unwrap();
            assert!(rows >= last, "rows dropped at p={p}");
            assert!(rows <= ROW_STAGGER_ROWS);
            last = rows;
        }
        assert_eq!(last, ROW_STAGGER_ROWS);
    }

    #[test]
    fn test_zero_steps() {
        let rule = StageRule::Steps { count: 0 };
        assert_eq!(rule.map(&at(400.0)), StageValue::Index(0));
        assert_eq!(rule.ceiling(), StageValue::Index(0));
    }

    #[test]
    fn test_deserialize_rules() {
        #[derive(Deserialize)]
        struct Wrapper {
            rule: StageRule,
        }

        let parse = |s: &str| toml::from_str::<Wrapper>(s).unwrap().rule;
        assert_eq!(parse(r#"rule = { kind = "pair_reveal" }"#), StageRule::PairReveal);
        assert_eq!(parse(r#"rule = { kind = "word_carousel" }"#), StageRule::word_carousel());
        assert_eq!(
            parse(r#"rule = { kind = "steps", count = 3 }"#),
            StageRule::Steps { count: 3 }
        );
    }
}
