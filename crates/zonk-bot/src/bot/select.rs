use super::{AiConfig, BehaviorMode, SelectionStrategy};
use std::cmp::Ordering;
use zonk_core::model::combination::Combination;
use zonk_core::model::tier::Tier;

const MIN_COMBINATION_THRESHOLD: f64 = 0.1;
const HOT_STREAK_WEIGHT: f64 = 10.0;
const DICE_USAGE_WEIGHT: f64 = 0.3;
const PASSIVE_BULK_MIN_POINTS: u32 = 200;
const PASSIVE_BULK_DICE: usize = 3;
const FULL_POOL_MIN_POINTS: u32 = 500;

/// A combination scored for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyResult {
    pub combination: Combination,
    pub tier: Tier,
    /// Points per die consumed.
    pub strategic_value: f64,
    /// Mode-specific multiplier applied on top of `strategic_value`.
    pub weight: f64,
    pub meets_threshold: bool,
}

impl StrategyResult {
    fn new(combination: &Combination, weight: f64, meets_threshold: bool) -> Self {
        Self {
            combination: combination.clone(),
            tier: combination.tier(),
            strategic_value: combination.strategic_value(),
            weight,
            meets_threshold,
        }
    }

    pub fn weighted_value(&self) -> f64 {
        self.strategic_value * self.weight
    }

    fn points(&self) -> u32 {
        self.combination.points()
    }

    fn dice_used(&self) -> usize {
        self.combination.dice_used()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPath {
    HotStreak,
    PointsFirst,
    MinimumDice,
    Threshold,
}

impl SelectionPath {
    pub const fn as_str(self) -> &'static str {
        match self {
            SelectionPath::HotStreak => "hot_streak",
            SelectionPath::PointsFirst => "points_first",
            SelectionPath::MinimumDice => "minimum_dice",
            SelectionPath::Threshold => "threshold",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub result: StrategyResult,
    pub path: SelectionPath,
}

pub struct CombinationSelector;

impl CombinationSelector {
    /// Turn-level choice: hot streak first, then points-first on big pools,
    /// then the configured strategy. `None` means the pool busted.
    pub fn choose(
        combinations: &[Combination],
        remaining_dice: usize,
        mode: BehaviorMode,
        config: &AiConfig,
    ) -> Option<Selection> {
        if combinations.is_empty() {
            return None;
        }

        if let Some(result) = Self::hot_streak(combinations, remaining_dice) {
            return Some(Selection {
                result,
                path: SelectionPath::HotStreak,
            });
        }

        if remaining_dice >= config.high_dice_threshold {
            return Self::points_first_select(combinations).map(|result| Selection {
                result,
                path: SelectionPath::PointsFirst,
            });
        }

        match config.selection {
            SelectionStrategy::MinimumDice => {
                Self::minimum_dice_select(combinations, remaining_dice, mode, config).map(
                    |result| Selection {
                        result,
                        path: SelectionPath::MinimumDice,
                    },
                )
            }
            SelectionStrategy::Threshold => {
                Self::threshold_select(combinations, mode, remaining_dice, config).map(|result| {
                    Selection {
                        result,
                        path: SelectionPath::Threshold,
                    }
                })
            }
        }
    }

    pub fn combination_threshold(config: &AiConfig, mode: BehaviorMode, dice_count: usize) -> f64 {
        let (initial, reduction) = config.threshold_curve(mode);
        let missing = 6usize.saturating_sub(dice_count) as f64;
        (initial - missing * reduction).max(MIN_COMBINATION_THRESHOLD)
    }

    pub fn threshold_select(
        combinations: &[Combination],
        mode: BehaviorMode,
        dice_count: usize,
        config: &AiConfig,
    ) -> Option<StrategyResult> {
        let threshold = Self::combination_threshold(config, mode, dice_count);
        let evaluated: Vec<StrategyResult> = combinations
            .iter()
            .map(|combo| {
                let meets = combo.tier().value_fraction() >= threshold;
                StrategyResult::new(combo, 1.0, meets)
            })
            .collect();

        let qualifying = evaluated.iter().filter(|result| result.meets_threshold);
        let picked = match mode {
            BehaviorMode::Aggressive => pick_best(qualifying, best_tier_then_points),
            BehaviorMode::Passive => pick_best(qualifying, best_value_then_fewest_dice),
        };

        picked
            .or_else(|| pick_best(evaluated.iter(), fewest_dice_then_points))
            .cloned()
    }

    pub fn minimum_dice_select(
        combinations: &[Combination],
        total_dice: usize,
        mode: BehaviorMode,
        config: &AiConfig,
    ) -> Option<StrategyResult> {
        if combinations.is_empty() {
            return None;
        }

        let floor = config.strategic_floor(mode);
        let evaluated: Vec<StrategyResult> = combinations
            .iter()
            .map(|combo| {
                let weight = dynamic_weight(combo, total_dice, mode);
                let mut result = StrategyResult::new(combo, weight, false);
                result.meets_threshold = passes_filters(&result, mode, floor);
                result
            })
            .collect();

        if let Some(result) = Self::hot_streak(combinations, total_dice) {
            let weight = dynamic_weight(&result.combination, total_dice, mode);
            return Some(StrategyResult { weight, ..result });
        }

        let mut sizes: Vec<usize> = evaluated.iter().map(StrategyResult::dice_used).collect();
        sizes.sort_unstable();
        sizes.dedup();

        for size in sizes {
            let group = evaluated
                .iter()
                .filter(|result| result.dice_used() == size && result.meets_threshold);
            let best = match mode {
                BehaviorMode::Aggressive => pick_best(group, most_points_then_tier),
                BehaviorMode::Passive => pick_best(group, best_weighted_then_points),
            };
            if let Some(best) = best {
                return Some(best.clone());
            }
        }

        pick_best(evaluated.iter(), |a: &StrategyResult, b: &StrategyResult| {
            cmp_f64(a.weighted_value(), b.weighted_value())
        })
        .cloned()
    }

    /// Highest total points, ties toward fewer dice.
    pub fn points_first_select(combinations: &[Combination]) -> Option<StrategyResult> {
        pick_best(combinations.iter(), |a: &Combination, b: &Combination| {
            a.points()
                .cmp(&b.points())
                .then_with(|| b.dice_used().cmp(&a.dice_used()))
        })
        .map(|combo| StrategyResult::new(combo, 1.0, true))
    }

    /// Highest-scoring combination that consumes the whole pool, if any.
    fn hot_streak(combinations: &[Combination], pool_size: usize) -> Option<StrategyResult> {
        let clearing = combinations
            .iter()
            .filter(|combo| combo.clears_pool(pool_size));
        pick_best(clearing, |a: &Combination, b: &Combination| a.points().cmp(&b.points()))
            .map(|combo| StrategyResult::new(combo, 1.0, true))
    }
}

fn dynamic_weight(combo: &Combination, total_dice: usize, mode: BehaviorMode) -> f64 {
    if mode != BehaviorMode::Aggressive || total_dice == 0 {
        return 1.0;
    }
    if combo.dice_used() == total_dice {
        HOT_STREAK_WEIGHT
    } else {
        1.0 + DICE_USAGE_WEIGHT * (combo.dice_used() as f64 / total_dice as f64)
    }
}

fn passes_filters(result: &StrategyResult, mode: BehaviorMode, floor: f64) -> bool {
    let points = result.points();
    let used = result.dice_used();
    if points == 0 || result.weighted_value() < floor {
        return false;
    }
    if mode.is_passive() && used > PASSIVE_BULK_DICE && points < PASSIVE_BULK_MIN_POINTS {
        return false;
    }
    if used == 6 && points < FULL_POOL_MIN_POINTS {
        return false;
    }
    true
}

fn best_tier_then_points(a: &StrategyResult, b: &StrategyResult) -> Ordering {
    b.tier
        .rank()
        .cmp(&a.tier.rank())
        .then_with(|| a.points().cmp(&b.points()))
}

fn best_value_then_fewest_dice(a: &StrategyResult, b: &StrategyResult) -> Ordering {
    cmp_f64(a.strategic_value, b.strategic_value).then_with(|| b.dice_used().cmp(&a.dice_used()))
}

fn most_points_then_tier(a: &StrategyResult, b: &StrategyResult) -> Ordering {
    a.points()
        .cmp(&b.points())
        .then_with(|| b.tier.rank().cmp(&a.tier.rank()))
        .then_with(|| cmp_f64(a.weighted_value(), b.weighted_value()))
}

fn best_weighted_then_points(a: &StrategyResult, b: &StrategyResult) -> Ordering {
    cmp_f64(a.weighted_value(), b.weighted_value())
        .then_with(|| b.dice_used().cmp(&a.dice_used()))
        .then_with(|| a.points().cmp(&b.points()))
}

fn fewest_dice_then_points(a: &StrategyResult, b: &StrategyResult) -> Ordering {
    b.dice_used()
        .cmp(&a.dice_used())
        .then_with(|| a.points().cmp(&b.points()))
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Maximum under `cmp`, keeping the earliest element among equals so the
/// catalog order breaks ties.
fn pick_best<'a, T, I, F>(items: I, mut cmp: F) -> Option<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: FnMut(&T, &T) -> Ordering,
    T: 'a,
{
    items.into_iter().fold(None, |best, item| match best {
        Some(current) if cmp(item, current) != Ordering::Greater => Some(current),
        _ => Some(item),
    })
}
