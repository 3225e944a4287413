//! Pure slot generation. No clocks, no storage: callers pass the patterns,
//! busy intervals and cutoff instant, and get back a deterministic grid.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::contract::model::{RecurrencePattern, Slot};

/// Half-open interval overlap test.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

fn minutes_from_midnight(t: NaiveTime) -> i64 {
    use chrono::Timelike;
    t.hour() as i64 * 60 + t.minute() as i64
}

fn at_minute(day: NaiveDate, minutes: i64) -> DateTime<Utc> {
    (day.and_time(NaiveTime::MIN) + Duration::minutes(minutes)).and_utc()
}

/// Expand weekly patterns over `[from, to]` (dates inclusive) into candidate
/// slots, before any subtraction of blocks or appointments.
///
/// Each matching day's `[time_start, time_end)` window is partitioned into
/// consecutive `slot_duration_minutes` chunks; a trailing chunk that would
/// cross `time_end` is discarded. Exact duplicate intervals from different
/// patterns collapse to one, and when slots of different durations overlap
/// the longer duration wins. The result is sorted ascending by start.
pub fn candidate_grid(
    patterns: &[RecurrencePattern],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    let mut day = from;
    while day <= to {
        let weekday = day.weekday().num_days_from_sunday() as u8;
        for pattern in patterns.iter().filter(|p| p.active) {
            if pattern.weekday != weekday || day < pattern.date_start {
                continue;
            }
            if pattern.date_end.is_some_and(|end| day > end) {
                continue;
            }
            let duration = pattern.slot_duration_minutes as i64;
            if duration <= 0 {
                continue;
            }
            let window_end = minutes_from_midnight(pattern.time_end);
            let mut cursor = minutes_from_midnight(pattern.time_start);
            while cursor + duration <= window_end {
                slots.push(Slot {
                    start: at_minute(day, cursor),
                    end: at_minute(day, cursor + duration),
                });
                cursor += duration;
            }
        }
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }
    resolve_overlaps(slots)
}

/// Collapse exact duplicates and drop any slot overlapped by a strictly
/// longer one. Equal-duration overlaps (patterns on offset grids) both stay.
fn resolve_overlaps(mut slots: Vec<Slot>) -> Vec<Slot> {
    slots.sort();
    slots.dedup();
    let keep: Vec<bool> = slots
        .iter()
        .map(|s| {
            let len = s.end - s.start;
            !slots.iter().any(|other| {
                other.end - other.start > len
                    && overlaps(s.start, s.end, other.start, other.end)
            })
        })
        .collect();
    slots
        .into_iter()
        .zip(keep)
        .filter_map(|(s, k)| k.then_some(s))
        .collect()
}

/// Drop candidate slots that overlap a busy interval (block or non-cancelled
/// appointment) or start before `min_start`. Keeps the ascending order.
pub fn filter_available(
    grid: &[Slot],
    busy: &[(DateTime<Utc>, DateTime<Utc>)],
    min_start: DateTime<Utc>,
) -> Vec<Slot> {
    grid.iter()
        .filter(|slot| slot.start >= min_start)
        .filter(|slot| {
            !busy
                .iter()
                .any(|&(b_start, b_end)| overlaps(slot.start, slot.end, b_start, b_end))
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn pattern(
        weekday: u8,
        time_start: (u32, u32),
        time_end: (u32, u32),
        duration: i32,
    ) -> RecurrencePattern {
        let now = Utc::now();
        RecurrencePattern {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            service_type: "lesson".into(),
            date_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            date_end: None,
            weekday,
            time_start: NaiveTime::from_hms_opt(time_start.0, time_start.1, 0).unwrap(),
            time_end: NaiveTime::from_hms_opt(time_end.0, time_end.1, 0).unwrap(),
            slot_duration_minutes: duration,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    const EPOCH: DateTime<Utc> = DateTime::UNIX_EPOCH;

    #[test]
    fn monday_hour_window_yields_two_half_hour_slots() {
        // 2025-06-02 is a Monday (weekday 1 counting from Sunday).
        let p = pattern(1, (9, 0), (10, 0), 30);
        let grid = candidate_grid(&[p], date(2025, 6, 2), date(2025, 6, 2));
        assert_eq!(
            grid,
            vec![
                Slot {
                    start: utc(2025, 6, 2, 9, 0),
                    end: utc(2025, 6, 2, 9, 30)
                },
                Slot {
                    start: utc(2025, 6, 2, 9, 30),
                    end: utc(2025, 6, 2, 10, 0)
                },
            ]
        );
    }

    #[test]
    fn trailing_partial_chunk_is_discarded() {
        let p = pattern(1, (9, 0), (10, 15), 30);
        let grid = candidate_grid(&[p], date(2025, 6, 2), date(2025, 6, 2));
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.last().unwrap().end, utc(2025, 6, 2, 10, 0));
    }

    #[test]
    fn weekday_zero_means_sunday() {
        // 2025-06-01 is a Sunday.
        let p = pattern(0, (8, 0), (9, 0), 60);
        let grid = candidate_grid(&[p], date(2025, 6, 1), date(2025, 6, 7));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0].start, utc(2025, 6, 1, 8, 0));
    }

    #[test]
    fn pattern_repeats_across_weeks_within_window() {
        let p = pattern(1, (9, 0), (9, 30), 30);
        let grid = candidate_grid(&[p], date(2025, 6, 1), date(2025, 6, 15));
        // Mondays 2025-06-02 and 2025-06-09 fall inside the window.
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0].start, utc(2025, 6, 2, 9, 0));
        assert_eq!(grid[1].start, utc(2025, 6, 9, 9, 0));
    }

    #[test]
    fn pattern_date_bounds_are_respected() {
        let mut p = pattern(1, (9, 0), (9, 30), 30);
        p.date_start = date(2025, 6, 9);
        p.date_end = Some(date(2025, 6, 9));
        let grid = candidate_grid(&[p], date(2025, 6, 1), date(2025, 6, 30));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0].start, utc(2025, 6, 9, 9, 0));
    }

    #[test]
    fn inactive_patterns_produce_nothing() {
        let mut p = pattern(1, (9, 0), (10, 0), 30);
        p.active = false;
        let grid = candidate_grid(&[p], date(2025, 6, 2), date(2025, 6, 2));
        assert!(grid.is_empty());
    }

    #[test]
    fn duplicate_intervals_from_two_patterns_collapse() {
        let a = pattern(1, (9, 0), (10, 0), 30);
        let b = pattern(1, (9, 0), (10, 0), 30);
        let grid = candidate_grid(&[a, b], date(2025, 6, 2), date(2025, 6, 2));
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn longer_duration_wins_on_overlap() {
        let short = pattern(1, (9, 0), (10, 0), 30);
        let long = pattern(1, (9, 0), (10, 0), 60);
        let grid = candidate_grid(&[short, long], date(2025, 6, 2), date(2025, 6, 2));
        assert_eq!(
            grid,
            vec![Slot {
                start: utc(2025, 6, 2, 9, 0),
                end: utc(2025, 6, 2, 10, 0)
            }]
        );
    }

    #[test]
    fn equal_duration_offset_grids_both_survive() {
        let on_hour = pattern(1, (9, 0), (10, 0), 30);
        let offset = pattern(1, (9, 15), (10, 15), 30);
        let grid = candidate_grid(&[on_hour, offset], date(2025, 6, 2), date(2025, 6, 2));
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn grid_is_sorted_ascending() {
        let a = pattern(1, (14, 0), (15, 0), 30);
        let b = pattern(1, (9, 0), (10, 0), 30);
        let grid = candidate_grid(&[a, b], date(2025, 6, 2), date(2025, 6, 9));
        assert!(grid.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn busy_intervals_remove_overlapping_slots() {
        let p = pattern(1, (9, 0), (11, 0), 30);
        let grid = candidate_grid(&[p], date(2025, 6, 2), date(2025, 6, 2));
        assert_eq!(grid.len(), 4);
        // Block 09:45..10:15 clips the 09:30 and 10:00 slots.
        let busy = vec![(utc(2025, 6, 2, 9, 45), utc(2025, 6, 2, 10, 15))];
        let available = filter_available(&grid, &busy, EPOCH);
        assert_eq!(
            available.iter().map(|s| s.start).collect::<Vec<_>>(),
            vec![utc(2025, 6, 2, 9, 0), utc(2025, 6, 2, 10, 30)]
        );
    }

    #[test]
    fn touching_intervals_do_not_conflict() {
        let p = pattern(1, (9, 0), (10, 0), 30);
        let grid = candidate_grid(&[p], date(2025, 6, 2), date(2025, 6, 2));
        let busy = vec![(utc(2025, 6, 2, 9, 30), utc(2025, 6, 2, 10, 0))];
        let available = filter_available(&grid, &busy, EPOCH);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].start, utc(2025, 6, 2, 9, 0));
    }

    #[test]
    fn min_start_drops_slots_starting_before_cutoff() {
        let p = pattern(1, (9, 0), (10, 0), 30);
        let grid = candidate_grid(&[p], date(2025, 6, 2), date(2025, 6, 2));
        let available = filter_available(&grid, &[], utc(2025, 6, 2, 9, 15));
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].start, utc(2025, 6, 2, 9, 30));
    }
}
