// ABOUTME: Timing arithmetic for blocks
// ABOUTME: Clamps raw inputs, checks slot consistency, and rebalances inconsistent cycles

use crate::constants::timing::{
    ON_TIME_MAX, ON_TIME_MIN, ON_TIME_ROUNDING_STEP, REBALANCED_CYCLE, RELAX_TIME_MAX,
    RELAX_TIME_MIN, SECONDS_PER_MINUTE, TOTAL_DURATION_MAX, TOTAL_DURATION_MIN,
};

/// The three timing parameters of a block
///
/// `total_duration` is minutes; `on_time` and `relax_time` are seconds per
/// exercise slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub total_duration: u8,
    pub on_time: u8,
    pub relax_time: u8,
}

/// Fit raw timing into a consistent configuration
///
/// Each parameter is clamped to its legal range first. If the clamped cycle
/// does not divide the total duration evenly, the slot is rebalanced:
/// `on_time` rounds up to the next multiple of ten and `relax_time` becomes
/// the remainder of a sixty-second cycle, which divides any whole-minute
/// total.
#[must_use]
pub fn fit(raw: Timing) -> Timing {
    let total_duration = raw
        .total_duration
        .clamp(TOTAL_DURATION_MIN, TOTAL_DURATION_MAX);
    let relax_time = raw.relax_time.clamp(RELAX_TIME_MIN, RELAX_TIME_MAX);
    let on_time = raw.on_time.clamp(ON_TIME_MIN, ON_TIME_MAX);

    let fitted = Timing {
        total_duration,
        on_time,
        relax_time,
    };
    if is_consistent(fitted) {
        return fitted;
    }

    let on_time = on_time.div_ceil(ON_TIME_ROUNDING_STEP) * ON_TIME_ROUNDING_STEP;
    Timing {
        total_duration,
        on_time,
        relax_time: REBALANCED_CYCLE - on_time,
    }
}

/// Whether whole slots exactly cover the total duration
#[must_use]
pub fn is_consistent(timing: Timing) -> bool {
    let cycle = cycle_seconds(timing);
    if cycle == 0 {
        return false;
    }
    let total = total_seconds(timing);
    (total / cycle) * cycle == total
}

/// How many exercise slots the block can hold
#[must_use]
pub fn slot_capacity(timing: Timing) -> u32 {
    let cycle = cycle_seconds(timing);
    if cycle == 0 {
        return 0;
    }
    total_seconds(timing) / cycle
}

/// Whether the occupied slot count exhausts the block's total duration
#[must_use]
pub fn is_full(timing: Timing, occupied_slots: u32) -> bool {
    u64::from(occupied_slots) * u64::from(cycle_seconds(timing))
        == u64::from(total_seconds(timing))
}

fn total_seconds(timing: Timing) -> u32 {
    u32::from(timing.total_duration) * SECONDS_PER_MINUTE
}

fn cycle_seconds(timing: Timing) -> u32 {
    u32::from(timing.on_time) + u32::from(timing.relax_time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(total_duration: u8, on_time: u8, relax_time: u8) -> Timing {
        Timing {
            total_duration,
            on_time,
            relax_time,
        }
    }

    #[test]
    fn test_fit_keeps_consistent_input() {
        // 20 minutes of 40s on + 20s relax: exactly 20 slots
        let fitted = fit(timing(20, 40, 20));
        assert_eq!(fitted, timing(20, 40, 20));
    }

    #[test]
    fn test_fit_clamps_out_of_range_values() {
        let fitted = fit(timing(0, 0, 200));
        assert_eq!(fitted.total_duration, 10);
        assert!(fitted.on_time >= 20);
        assert!(fitted.relax_time <= 30);
    }

    #[test]
    fn test_fit_rebalances_inconsistent_cycle() {
        // 10 min = 600s; 45s + 13s = 58s does not divide 600
        let fitted = fit(timing(10, 45, 13));
        assert_eq!(fitted.on_time, 50);
        assert_eq!(fitted.relax_time, 10);
        assert!(is_consistent(fitted));
    }

    #[test]
    fn test_fit_rebalanced_cycle_always_divides() {
        for total in 10..=60 {
            for on in 20..=60 {
                for relax in 0..=30 {
                    let fitted = fit(timing(total, on, relax));
                    assert!(
                        is_consistent(fitted),
                        "inconsistent result for ({total}, {on}, {relax}): {fitted:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_fit_is_idempotent() {
        let once = fit(timing(33, 37, 11));
        assert_eq!(fit(once), once);
    }

    #[test]
    fn test_slot_capacity() {
        assert_eq!(slot_capacity(timing(20, 40, 20)), 20);
        assert_eq!(slot_capacity(timing(10, 60, 0)), 10);
        assert_eq!(slot_capacity(timing(10, 0, 0)), 0);
    }

    #[test]
    fn test_is_full_at_exact_capacity() {
        let t = timing(10, 60, 0);
        assert!(!is_full(t, 9));
        assert!(is_full(t, 10));
    }
}
