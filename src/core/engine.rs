//! Care state engine for Sprig plants.
//!
//! Pure functions over a [`Plant`] snapshot and an explicit `now`. Nothing
//! here performs I/O or reads the wall clock; callers decide whether and when
//! to persist the returned snapshot.
//!
//! Recompute logic:
//! 1. Untracked plants (never watered) are returned unchanged
//! 2. `elapsed = floor((now - last_watered_at) / 1 day)`, clamped at 0
//! 3. If `elapsed < frequency` → not overdue, health unchanged
//! 4. Else `overdue = elapsed - frequency + 1` and
//!    `health = clamp(baseline_health - overdue * 10)`
//!
//! Watering sets the baseline to `min(100, health + 20)` and restarts the
//! schedule from `now`.

use chrono::{DateTime, Duration, Utc};

use crate::core::plant::{Plant, MAX_HEALTH};

/// Health lost for each overdue day, counting the due day itself.
pub const DECAY_PER_OVERDUE_DAY: i64 = 10;

/// Health restored by a watering event.
pub const WATERING_BOOST: i64 = 20;

/// Whole days elapsed between `since` and `now`.
///
/// Partial days do not count. A `now` earlier than `since` yields 0, so
/// clock skew never produces negative decay or healing.
pub fn elapsed_days(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_days().max(0)
}

/// Clamp a raw health value into [0, 100].
pub fn clamp_health(raw: i64) -> u8 {
    // Bounded by MAX_HEALTH, so the cast is lossless.
    raw.clamp(0, MAX_HEALTH as i64) as u8
}

/// The due date implied by the watering history, if any.
///
/// `None` also when the due date falls outside chrono's representable range.
pub fn next_watering_at(plant: &Plant) -> Option<DateTime<Utc>> {
    let last = plant.last_watered_at?;
    Duration::try_days(plant.watering_frequency_days as i64)
        .and_then(|frequency| last.checked_add_signed(frequency))
}

/// Number of overdue days at `now`, counting the due day as 1.
///
/// Returns 0 when the plant is untracked or not yet due.
pub fn overdue_days(plant: &Plant, now: DateTime<Utc>) -> i64 {
    let Some(last) = plant.last_watered_at else {
        return 0;
    };

    let elapsed = elapsed_days(last, now);
    let frequency = plant.watering_frequency_days as i64;
    if elapsed < frequency {
        0
    } else {
        elapsed - frequency + 1
    }
}

/// Whole days until watering is due (≤ 0 means due now or overdue).
///
/// Returns `None` for untracked plants. Uses the same whole-day truncation as
/// [`elapsed_days`] but keeps the sign, so "due in 2 days" and "3 days late"
/// are both representable.
pub fn days_until_watering(plant: &Plant, now: DateTime<Utc>) -> Option<i64> {
    let last = plant.last_watered_at?;
    let frequency = plant.watering_frequency_days as i64;
    let elapsed = elapsed_days(last, now);
    Some(frequency - elapsed)
}

/// Derive current health, attention flag and next due date at `now`.
///
/// Deterministic and idempotent for a fixed `now`: the penalty is measured
/// from `baseline_health`, so recomputing an already recomputed snapshot
/// changes nothing. For a fixed watering baseline, health never increases as
/// `now` advances.
pub fn recompute(plant: &Plant, now: DateTime<Utc>) -> Plant {
    let mut next = plant.clone();

    if plant.last_watered_at.is_none() {
        return next;
    }

    next.next_watering_at = next_watering_at(plant);

    let overdue = overdue_days(plant, now);
    if overdue == 0 {
        next.needs_attention = false;
    } else {
        next.needs_attention = true;
        next.health =
            clamp_health(plant.baseline_health as i64 - overdue * DECAY_PER_OVERDUE_DAY);
    }

    next
}

/// Apply a watering event at `now`.
///
/// Heals from the snapshot's current `health`, so callers holding a stale
/// snapshot should [`recompute`] it first. This is the only transition that
/// advances `last_watered_at`.
pub fn record_watering(plant: &Plant, now: DateTime<Utc>) -> Plant {
    let mut next = plant.clone();

    let health = clamp_health(plant.health as i64 + WATERING_BOOST);
    next.last_watered_at = Some(now);
    next.needs_attention = false;
    next.health = health;
    next.baseline_health = health;
    next.next_watering_at = next_watering_at(&next);

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CareConfig;
    use crate::core::plant::{CareState, NewPlant};
    use chrono::TimeZone;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    fn make_plant(frequency: u32) -> Plant {
        NewPlant::new("user-1", "Calathea", "img://calathea")
            .watering_frequency_days(frequency)
            .build(day(0), &CareConfig::default())
            .unwrap()
    }

    fn watered_plant(frequency: u32, health: u8, at: DateTime<Utc>) -> Plant {
        let mut plant = make_plant(frequency);
        plant.last_watered_at = Some(at);
        plant.health = health;
        plant.baseline_health = health;
        plant
    }

    // Helpers

    #[test]
    fn test_elapsed_days_truncates_partial_days() {
        let start = day(0);
        assert_eq!(elapsed_days(start, start + Duration::hours(23)), 0);
        assert_eq!(elapsed_days(start, start + Duration::hours(24)), 1);
        assert_eq!(elapsed_days(start, start + Duration::hours(71)), 2);
    }

    #[test]
    fn test_elapsed_days_clamps_clock_skew() {
        assert_eq!(elapsed_days(day(5), day(2)), 0);
    }

    #[test]
    fn test_clamp_health() {
        assert_eq!(clamp_health(-50), 0);
        assert_eq!(clamp_health(0), 0);
        assert_eq!(clamp_health(55), 55);
        assert_eq!(clamp_health(100), 100);
        assert_eq!(clamp_health(140), 100);
    }

    #[test]
    fn test_next_watering_at() {
        let plant = watered_plant(3, 100, day(0));
        assert_eq!(next_watering_at(&plant), Some(day(3)));
        assert_eq!(next_watering_at(&make_plant(3)), None);
    }

    #[test]
    fn test_out_of_range_frequency_does_not_panic() {
        // Only reachable through a hand-edited record; creation rejects it.
        let mut plant = make_plant(3);
        plant.watering_frequency_days = u32::MAX;

        let watered = record_watering(&plant, day(0));
        assert_eq!(watered.last_watered_at, Some(day(0)));
        assert_eq!(watered.next_watering_at, None);

        let later = recompute(&watered, day(400));
        assert!(!later.needs_attention);
        assert_eq!(later.health, 100);
    }

    #[test]
    fn test_days_until_watering() {
        let plant = watered_plant(3, 100, day(0));
        assert_eq!(days_until_watering(&plant, day(0)), Some(3));
        assert_eq!(days_until_watering(&plant, day(2)), Some(1));
        assert_eq!(days_until_watering(&plant, day(3)), Some(0));
        assert_eq!(days_until_watering(&plant, day(5)), Some(-2));
        assert_eq!(days_until_watering(&make_plant(3), day(5)), None);
    }

    // Scenario A: frequency 3, watered Day0 at full health

    #[test]
    fn test_recompute_before_due_is_unchanged() {
        let plant = watered_plant(3, 100, day(0));
        let next = recompute(&plant, day(2));

        assert_eq!(next.health, 100);
        assert!(!next.needs_attention);
        assert_eq!(next.next_watering_at, Some(day(3)));
        assert_eq!(next.care_state(), CareState::Ok);
    }

    #[test]
    fn test_recompute_on_due_day_penalizes_once() {
        let plant = watered_plant(3, 100, day(0));
        let next = recompute(&plant, day(3));

        assert_eq!(overdue_days(&plant, day(3)), 1);
        assert_eq!(next.health, 90);
        assert!(next.needs_attention);
        assert_eq!(next.care_state(), CareState::Overdue);
    }

    #[test]
    fn test_recompute_two_days_late() {
        let plant = watered_plant(3, 100, day(0));
        let next = recompute(&plant, day(5));

        assert_eq!(overdue_days(&plant, day(5)), 3);
        assert_eq!(next.health, 70);
        assert!(next.needs_attention);
        // Due date stays in the past
        assert_eq!(next.next_watering_at, Some(day(3)));
    }

    #[test]
    fn test_recompute_partial_day_does_not_count() {
        let plant = watered_plant(3, 100, day(0));
        let next = recompute(&plant, day(3) - Duration::minutes(1));

        assert_eq!(next.health, 100);
        assert!(!next.needs_attention);
    }

    // Scenario B: water the Day5 plant

    #[test]
    fn test_record_watering_after_overdue() {
        let plant = recompute(&watered_plant(3, 100, day(0)), day(5));
        assert_eq!(plant.health, 70);

        let watered = record_watering(&plant, day(5));

        assert_eq!(watered.health, 90);
        assert_eq!(watered.baseline_health, 90);
        assert_eq!(watered.last_watered_at, Some(day(5)));
        assert_eq!(watered.next_watering_at, Some(day(8)));
        assert!(!watered.needs_attention);
    }

    #[test]
    fn test_decay_after_rewatering_uses_new_baseline() {
        let plant = recompute(&watered_plant(3, 100, day(0)), day(5));
        let watered = record_watering(&plant, day(5));

        let later = recompute(&watered, day(8));
        assert_eq!(later.health, 80);
        assert!(later.needs_attention);
    }

    // Scenario C: untracked plants

    #[test]
    fn test_recompute_untracked_is_identity() {
        let plant = make_plant(3);
        for n in [0, 1, 3, 30, 365] {
            assert_eq!(recompute(&plant, day(n)), plant);
        }
    }

    #[test]
    fn test_record_watering_leaves_untracked_state() {
        let plant = make_plant(3);
        let watered = record_watering(&plant, day(1));

        assert_eq!(watered.care_state(), CareState::Ok);
        assert_eq!(watered.health, 100);
        assert_eq!(watered.next_watering_at, Some(day(4)));
    }

    // Scenario D: health floor

    #[test]
    fn test_recompute_clamps_at_zero() {
        let plant = watered_plant(1, 100, day(0));
        let next = recompute(&plant, day(21));

        assert_eq!(overdue_days(&plant, day(21)), 21);
        assert_eq!(next.health, 0);
        assert!(next.needs_attention);
    }

    #[test]
    fn test_record_watering_caps_at_max() {
        let plant = watered_plant(3, 95, day(0));
        let watered = record_watering(&plant, day(1));
        assert_eq!(watered.health, 100);
    }

    #[test]
    fn test_recompute_with_skewed_clock_is_not_overdue() {
        let plant = watered_plant(3, 100, day(10));
        let next = recompute(&plant, day(4));

        assert_eq!(next.health, 100);
        assert!(!next.needs_attention);
        assert_eq!(next.next_watering_at, Some(day(13)));
    }

    #[test]
    fn test_recompute_repairs_stale_next_watering() {
        let mut plant = watered_plant(3, 100, day(0));
        plant.next_watering_at = Some(day(42));
        plant.watering_frequency_days = 5;

        let next = recompute(&plant, day(1));
        assert_eq!(next.next_watering_at, Some(day(5)));
    }

    #[test]
    fn test_recompute_does_not_touch_bookkeeping() {
        let plant = watered_plant(3, 100, day(0));
        let next = recompute(&plant, day(9));

        assert_eq!(next.id, plant.id);
        assert_eq!(next.last_watered_at, plant.last_watered_at);
        assert_eq!(next.baseline_health, plant.baseline_health);
        assert_eq!(next.updated_at, plant.updated_at);
    }

    // =========================================================================
    // Property-based tests
    // =========================================================================

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_tracked_plant() -> impl Strategy<Value = Plant> {
            (1u32..30, 0u8..=100, 0i64..400).prop_map(|(frequency, health, offset)| {
                watered_plant(frequency, health, day(0) + Duration::hours(offset))
            })
        }

        fn arb_now() -> impl Strategy<Value = DateTime<Utc>> {
            (0i64..24 * 120).prop_map(|hours| day(0) + Duration::hours(hours))
        }

        proptest! {
            // Property: recompute is idempotent for a fixed now
            #[test]
            fn prop_recompute_idempotent(plant in arb_tracked_plant(), now in arb_now()) {
                let once = recompute(&plant, now);
                let twice = recompute(&once, now);
                prop_assert_eq!(once, twice);
            }

            // Property: health never increases as time advances while overdue
            #[test]
            fn prop_decay_is_monotonic(
                plant in arb_tracked_plant(),
                a in arb_now(),
                b in arb_now(),
            ) {
                let (t1, t2) = if a <= b { (a, b) } else { (b, a) };
                let h1 = recompute(&plant, t1);
                let h2 = recompute(&plant, t2);
                if h1.needs_attention && h2.needs_attention {
                    prop_assert!(h1.health >= h2.health);
                }
            }

            // Property: watering heals by exactly the boost, capped at 100
            #[test]
            fn prop_watering_heal_bound(plant in arb_tracked_plant(), now in arb_now()) {
                let watered = record_watering(&plant, now);
                prop_assert_eq!(watered.health as u32, (plant.health as u32 + 20).min(100));
                prop_assert!(!watered.needs_attention);
                prop_assert_eq!(watered.last_watered_at, Some(now));
            }

            // Property: attention flag iff whole elapsed days >= frequency
            #[test]
            fn prop_attention_correctness(plant in arb_tracked_plant(), now in arb_now()) {
                let next = recompute(&plant, now);
                let last = plant.last_watered_at.unwrap();
                let expected = elapsed_days(last, now) >= plant.watering_frequency_days as i64;
                prop_assert_eq!(next.needs_attention, expected);
            }

            // Property: untracked plants are immune to recompute
            #[test]
            fn prop_untracked_immunity(
                frequency in 1u32..30,
                health in 0u8..=100,
                now in arb_now(),
            ) {
                let mut plant = make_plant(frequency);
                plant.health = health;
                prop_assert_eq!(recompute(&plant, now), plant);
            }

            // Property: health stays within [0, 100] and next due is derived
            #[test]
            fn prop_invariants_hold(plant in arb_tracked_plant(), now in arb_now()) {
                let next = recompute(&plant, now);
                prop_assert!(next.health <= 100);
                prop_assert_eq!(next.next_watering_at, next_watering_at(&plant));
            }
        }
    }
}
