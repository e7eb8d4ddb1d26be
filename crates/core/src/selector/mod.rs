//! Daily random algorithm selection.
//!
//! Each family keeps one picked id that stays current for the refresh
//! interval (a day by default). The first `pick` after the interval has
//! elapsed draws a new id uniformly from the family's range.

mod clock;

pub use clock::{Clock, SystemClock};

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use crate::algorithm::AlgorithmFamily;
use crate::config::SelectorConfig;
use crate::metrics::SELECTOR_REFRESHES_TOTAL;

/// Current pick of one selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorState {
    pub selected_index: u32,
    pub last_refreshed: DateTime<Utc>,
}

/// Slowly-changing random pick for a single family.
pub struct DailySelector {
    family: AlgorithmFamily,
    refresh_interval: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<SelectorState>,
}

impl DailySelector {
    /// Start with `initial_index`, treating construction time as the last refresh.
    pub fn new(
        family: AlgorithmFamily,
        initial_index: u32,
        refresh_interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = SelectorState {
            selected_index: initial_index,
            last_refreshed: clock.now(),
        };
        Self {
            family,
            refresh_interval,
            clock,
            state: Mutex::new(state),
        }
    }

    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    /// Return the current pick, redrawing it first if it has gone stale.
    ///
    /// Stale means strictly older than the refresh interval. A clock that
    /// moved backwards never triggers a redraw.
    pub fn pick(&self) -> u32 {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let stale = now
            .signed_duration_since(state.last_refreshed)
            .to_std()
            .map(|age| age > self.refresh_interval)
            .unwrap_or(false);

        if stale {
            let index = rand::thread_rng().gen_range(self.family.id_range());
            info!(
                family = self.family.as_str(),
                previous = state.selected_index,
                index,
                "Refreshed daily random pick"
            );
            state.selected_index = index;
            state.last_refreshed = now;
            SELECTOR_REFRESHES_TOTAL
                .with_label_values(&[self.family.as_str()])
                .inc();
        }

        state.selected_index
    }

    /// Current state without triggering a refresh.
    pub fn snapshot(&self) -> SelectorState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The PLL and OLL selectors, each refreshed independently.
pub struct RandomSelectors {
    pll: DailySelector,
    oll: DailySelector,
}

impl RandomSelectors {
    pub fn new(config: &SelectorConfig, clock: Arc<dyn Clock>) -> Self {
        let interval = Duration::from_secs(config.refresh_interval_secs);
        Self {
            pll: DailySelector::new(
                AlgorithmFamily::Pll,
                config.pll_initial_index,
                interval,
                Arc::clone(&clock),
            ),
            oll: DailySelector::new(
                AlgorithmFamily::Oll,
                config.oll_initial_index,
                interval,
                clock,
            ),
        }
    }

    pub fn get(&self, family: AlgorithmFamily) -> &DailySelector {
        match family {
            AlgorithmFamily::Pll => &self.pll,
            AlgorithmFamily::Oll => &self.oll,
        }
    }

    pub fn pick(&self, family: AlgorithmFamily) -> u32 {
        self.get(family).pick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;
    use std::collections::HashSet;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn selector(family: AlgorithmFamily, initial: u32) -> (Arc<ManualClock>, DailySelector) {
        let clock = Arc::new(ManualClock::starting_now());
        let selector = DailySelector::new(family, initial, DAY, clock.clone());
        (clock, selector)
    }

    #[test]
    fn test_fresh_pick_returns_initial_index() {
        let (_clock, selector) = selector(AlgorithmFamily::Pll, 1);
        assert_eq!(selector.pick(), 1);
        assert_eq!(selector.pick(), 1);
    }

    #[test]
    fn test_pick_stable_within_window() {
        let (clock, selector) = selector(AlgorithmFamily::Pll, 1);
        clock.advance(chrono::Duration::hours(25));
        let first = selector.pick();
        clock.advance(chrono::Duration::hours(23));
        assert_eq!(selector.pick(), first);
    }

    #[test]
    fn test_exactly_one_interval_is_still_fresh() {
        let (clock, selector) = selector(AlgorithmFamily::Pll, 1);
        let before = selector.snapshot();
        clock.advance(chrono::Duration::hours(24));
        selector.pick();
        assert_eq!(selector.snapshot(), before);
    }

    #[test]
    fn test_stale_pick_refreshes_timestamp() {
        let (clock, selector) = selector(AlgorithmFamily::Oll, 23);
        clock.advance(chrono::Duration::hours(24) + chrono::Duration::seconds(1));
        let index = selector.pick();

        let state = selector.snapshot();
        assert_eq!(state.last_refreshed, clock.now());
        assert_eq!(state.selected_index, index);
        assert!(AlgorithmFamily::Oll.id_range().contains(&index));
    }

    #[test]
    fn test_backwards_clock_does_not_refresh() {
        let (clock, selector) = selector(AlgorithmFamily::Pll, 7);
        let start = clock.now();
        clock.set(start - chrono::Duration::days(3));
        assert_eq!(selector.pick(), 7);

        // Back at the start the pick is still younger than a day
        clock.set(start + chrono::Duration::hours(1));
        assert_eq!(selector.pick(), 7);
        assert_eq!(selector.snapshot().last_refreshed, start);
    }

    #[test]
    fn test_draws_stay_in_family_range() {
        for family in [AlgorithmFamily::Pll, AlgorithmFamily::Oll] {
            let initial = *family.id_range().start();
            let (clock, selector) = selector(family, initial);
            let mut seen = HashSet::new();

            for _ in 0..1000 {
                clock.advance(chrono::Duration::days(1) + chrono::Duration::seconds(1));
                let index = selector.pick();
                assert!(
                    family.id_range().contains(&index),
                    "{:?} draw {} out of range",
                    family,
                    index
                );
                seen.insert(index);
            }

            // 1000 uniform draws over 22+ values cover more than one
            assert!(seen.len() > 1);
        }
    }

    #[test]
    fn test_families_refresh_independently() {
        let clock = Arc::new(ManualClock::starting_now());
        let selectors = RandomSelectors::new(&SelectorConfig::default(), clock.clone());
        assert_eq!(selectors.get(AlgorithmFamily::Pll).family(), AlgorithmFamily::Pll);
        assert_eq!(selectors.get(AlgorithmFamily::Oll).family(), AlgorithmFamily::Oll);

        clock.advance(chrono::Duration::days(2));
        let oll = selectors.pick(AlgorithmFamily::Oll);
        assert!(AlgorithmFamily::Oll.id_range().contains(&oll));

        // PLL was never picked, so its baseline is untouched
        let pll_state = selectors.get(AlgorithmFamily::Pll).snapshot();
        assert_eq!(pll_state.selected_index, 1);
        assert_ne!(pll_state.last_refreshed, clock.now());
        assert_eq!(selectors.get(AlgorithmFamily::Oll).snapshot().last_refreshed, clock.now());
    }

    #[test]
    fn test_concurrent_stale_picks_draw_once() {
        let (clock, selector) = selector(AlgorithmFamily::Oll, 23);
        clock.advance(chrono::Duration::days(2));

        let picks: Vec<u32> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| selector.pick())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(picks.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(selector.snapshot().last_refreshed, clock.now());
    }
}
