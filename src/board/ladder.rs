// Top-of-book selection for one outcome of one market

use crate::types::{Selection, Side};
use std::cmp::Ordering;

/// Number of price points shown per side
pub const DEPTH: usize = 3;

/// Best back prices for `name`: ascending by odds, first three.
/// Index 0 is rank 1st.
pub fn top_back<'a>(selections: &'a [Selection], name: &str) -> Vec<&'a Selection> {
    let mut levels = priced(selections, name, Side::Back);
    levels.sort_by(|a, b| cmp_odds(a, b));
    levels.truncate(DEPTH);
    levels
}

/// Best lay prices for `name`: descending by odds, first three.
/// Index 0 is rank 1st.
pub fn top_lay<'a>(selections: &'a [Selection], name: &str) -> Vec<&'a Selection> {
    let mut levels = priced(selections, name, Side::Lay);
    levels.sort_by(|a, b| cmp_odds(b, a));
    levels.truncate(DEPTH);
    levels
}

/// Distinct back outcome names in first-seen order
pub fn back_outcomes(selections: &[Selection]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for s in selections.iter().filter(|s| s.side == Side::Back && !s.name.is_empty()) {
        if !names.contains(&s.name.as_str()) {
            names.push(&s.name);
        }
    }
    names
}

fn priced<'a>(selections: &'a [Selection], name: &str, side: Side) -> Vec<&'a Selection> {
    selections
        .iter()
        .filter(|s| s.side == side && s.name == name && s.priced_odds().is_some())
        .collect()
}

// Only priced selections reach the sort, so odds are finite.
fn cmp_odds(a: &Selection, b: &Selection) -> Ordering {
    let a = a.priced_odds().unwrap_or_default();
    let b = b.priced_odds().unwrap_or_default();
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
