use crate::models::{ContributionCalendar, ContributionDay, ContributionStats};

/// Compute total, current and longest streak for a contribution calendar
///
/// Days are sorted by date and de-duplicated first. A day with a zero count
/// breaks a streak, and so does a missing date between two adjacent entries.
/// The current streak is counted backward from the last entry of the list,
/// which is not necessarily today.
pub fn compute_stats(calendar: &ContributionCalendar) -> ContributionStats {
    let days = normalize_days(&calendar.days);

    ContributionStats {
        total: calendar.total_contributions,
        current_streak: current_streak(&days),
        longest_streak: longest_streak(&days),
        days,
    }
}

/// Sort ascending by date, keeping the first entry for a repeated date
pub fn normalize_days(days: &[ContributionDay]) -> Vec<ContributionDay> {
    let mut sorted = days.to_vec();
    sorted.sort_by_key(|day| day.date);
    sorted.dedup_by_key(|day| day.date);
    sorted
}

/// Longest run of consecutive active days in a date-sorted list
pub fn longest_streak(days: &[ContributionDay]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<&ContributionDay> = None;

    for day in days {
        if previous.map_or(false, |prev| !is_next_day(prev, day)) {
            longest = longest.max(run);
            run = 0;
        }

        if day.count > 0 {
            run += 1;
        } else {
            longest = longest.max(run);
            run = 0;
        }
        previous = Some(day);
    }

    longest.max(run)
}

/// Run of consecutive active days ending at the last entry of a date-sorted list
pub fn current_streak(days: &[ContributionDay]) -> u32 {
    let mut streak = 0;
    let mut later: Option<&ContributionDay> = None;

    for day in days.iter().rev() {
        if day.count == 0 {
            break;
        }
        if later.map_or(false, |next| !is_next_day(day, next)) {
            break;
        }
        streak += 1;
        later = Some(day);
    }

    streak
}

fn is_next_day(earlier: &ContributionDay, later: &ContributionDay) -> bool {
    earlier.date.succ_opt() == Some(later.date)
}
