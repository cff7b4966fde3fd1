//! Week-indexed baby growth chart.
//!
//! Maps integer pregnancy weeks 4–40 to a size descriptor used by the
//! progress display. Weeks outside the table fall back to a fixed default
//! descriptor rather than failing.

use crate::BabySize;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// First and last week covered by the chart, inclusive.
pub const CHART_FIRST_WEEK: u32 = 4;
pub const CHART_LAST_WEEK: u32 = 40;

/// Cached chart - built once and reused across all lookups
static CHART: Lazy<HashMap<u32, BabySize>> = Lazy::new(build_chart);

/// Descriptor returned for any week outside the 4–40 range.
static FALLBACK: Lazy<BabySize> = Lazy::new(|| BabySize {
    name: "little one".into(),
    emoji: "👶".into(),
    length_cm: 50.0,
});

/// Look up the size descriptor for an elapsed-week count.
///
/// Total over all inputs: out-of-range weeks (including negative ones)
/// return the fallback descriptor.
pub fn size_for_week(weeks: i64) -> &'static BabySize {
    u32::try_from(weeks)
        .ok()
        .and_then(|w| CHART.get(&w))
        .unwrap_or(&FALLBACK)
}

fn entry(name: &str, emoji: &str, length_cm: f64) -> BabySize {
    BabySize {
        name: name.into(),
        emoji: emoji.into(),
        length_cm,
    }
}

fn build_chart() -> HashMap<u32, BabySize> {
    let rows = [
        (4, entry("poppy seed", "🌱", 0.2)),
        (5, entry("sesame seed", "🌾", 0.3)),
        (6, entry("pea", "🫛", 0.5)),
        (7, entry("blueberry", "🫐", 1.0)),
        (8, entry("raspberry", "🍒", 1.6)),
        (9, entry("grape", "🍇", 2.3)),
        (10, entry("strawberry", "🍓", 3.1)),
        (11, entry("green plum", "🫒", 4.1)),
        (12, entry("prune", "🌰", 5.4)),
        (13, entry("lemon", "🍋", 7.4)),
        (14, entry("peach", "🍑", 8.7)),
        (15, entry("apple", "🍎", 10.1)),
        (16, entry("avocado", "🥑", 11.6)),
        (17, entry("pear", "🍐", 13.0)),
        (18, entry("bell pepper", "🫑", 14.2)),
        (19, entry("tomato", "🍅", 15.3)),
        (20, entry("banana", "🍌", 16.4)),
        (21, entry("carrot", "🥕", 26.7)),
        (22, entry("papaya", "🥭", 27.8)),
        (23, entry("pomelo", "🍊", 28.9)),
        (24, entry("ear of corn", "🌽", 30.0)),
        (25, entry("cauliflower", "🥦", 34.6)),
        (26, entry("lettuce", "🥬", 35.6)),
        (27, entry("cabbage", "🥬", 36.6)),
        (28, entry("eggplant", "🍆", 37.6)),
        (29, entry("pumpkin", "🎃", 38.6)),
        (30, entry("cucumber", "🥒", 39.9)),
        (31, entry("coconut", "🥥", 41.1)),
        (32, entry("pineapple", "🍍", 42.4)),
        (33, entry("large pineapple", "🍍", 43.7)),
        (34, entry("cantaloupe", "🍈", 45.0)),
        (35, entry("honeydew melon", "🍈", 46.2)),
        (36, entry("papaya", "🥭", 47.4)),
        (37, entry("winter melon", "🍈", 48.6)),
        (38, entry("watermelon", "🍉", 49.8)),
        (39, entry("large watermelon", "🍉", 50.7)),
        (40, entry("large pumpkin", "🎃", 51.2)),
    ];

    rows.into_iter().collect()
}

/// Validate the chart for consistency and completeness
///
/// Returns a list of validation errors, or empty Vec if valid.
pub fn validate() -> Vec<String> {
    let mut errors = Vec::new();

    for week in CHART_FIRST_WEEK..=CHART_LAST_WEEK {
        match CHART.get(&week) {
            None => errors.push(format!("Chart is missing week {}", week)),
            Some(size) => {
                if size.name.is_empty() {
                    errors.push(format!("Week {} has an empty name", week));
                }
                if size.emoji.is_empty() {
                    errors.push(format!("Week {} has an empty emoji", week));
                }
                if size.length_cm <= 0.0 {
                    errors.push(format!(
                        "Week {} has non-positive length {}",
                        week, size.length_cm
                    ));
                }
            }
        }
    }

    for week in CHART.keys() {
        if !(CHART_FIRST_WEEK..=CHART_LAST_WEEK).contains(week) {
            errors.push(format!("Chart has out-of-range week {}", week));
        }
    }

    errors
}
