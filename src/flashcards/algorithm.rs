//! SM-2 Spaced Repetition Algorithm
//!
//! Implementation of the SuperMemo 2 algorithm for calculating
//! review intervals based on answer quality.
//!
//! Quality ratings (0-5). The review buttons only produce 0, 3, 4 and 5:
//! - 0: Complete blackout, no recall ("again")
//! - 3: Correct response with serious difficulty ("hard")
//! - 4: Correct response after hesitation ("good")
//! - 5: Perfect response with no hesitation ("easy")

use chrono::{DateTime, Duration, Utc};

use super::models::{Quality, SchedulingState};

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Longest interval a card can be scheduled out, in days
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Qualities below this reset the card
const PASSING_QUALITY: u8 = 3;

/// Apply one review to a scheduling state.
///
/// `quality` is not validated; anything below 3 counts as a failure.
pub fn review(state: &SchedulingState, quality: u8, now: DateTime<Utc>) -> SchedulingState {
    let mut interval = state.interval;
    let mut repetitions = state.repetitions;

    if quality < PASSING_QUALITY {
        repetitions = 0;
        interval = 1;
    } else {
        interval = match repetitions {
            0 => 1,
            1 => 6,
            _ => (interval as f64 * state.ease_factor)
                .round()
                .clamp(1.0, MAX_INTERVAL_DAYS as f64) as u32,
        };
        repetitions += 1;
    }

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
    let miss = 5.0 - quality as f64;
    let ease_factor = (state.ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR);

    log::debug!(
        "SM-2 q={}: interval {} -> {}, reps {} -> {}, ease {:.2} -> {:.2}",
        quality,
        state.interval,
        interval,
        state.repetitions,
        repetitions,
        state.ease_factor,
        ease_factor
    );

    SchedulingState {
        ease_factor,
        interval,
        repetitions,
        next_review: Some(
            now.checked_add_signed(Duration::days(interval as i64))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        ),
        last_reviewed: Some(now),
    }
}

/// Apply a review from one of the four buttons
pub fn review_with(state: &SchedulingState, quality: Quality, now: DateTime<Utc>) -> SchedulingState {
    review(state, quality.score(), now)
}

/// Intervals each button would give, in `Quality::all()` order.
/// Used to label the review buttons.
pub fn preview_intervals(state: &SchedulingState) -> [u32; 4] {
    let now = Utc::now();
    Quality::all().map(|q| review_with(state, q, now).interval)
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: u32) -> String {
    if days == 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
