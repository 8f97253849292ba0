// Plain text view of a rendered board

use crate::board::{Board, Cell, MarketBoard, Row};
use std::fmt::Write;

const NAME_WIDTH: usize = 28;
const CELL_WIDTH: usize = 16;
const PLACEHOLDER: &str = "–";

pub fn render_text(board: &Board) -> String {
    if board.is_empty() {
        return "No markets available\n".to_string();
    }

    let mut out = String::new();
    for market in &board.markets {
        write_market(&mut out, market);
    }
    out
}

fn write_market(out: &mut String, market: &MarketBoard) {
    let mut header = format!("{} [{}]", market.name, market.state.label());
    if let (Some(min), Some(max)) = (market.min_stake, market.max_stake) {
        let _ = write!(header, " stake {}-{}", min, max);
    }
    out.push_str(&header);
    out.push('\n');

    if market.rows.is_empty() {
        out.push_str("  No selections\n");
        return;
    }
    for row in &market.rows {
        write_row(out, row);
    }
}

fn write_row(out: &mut String, row: &Row) {
    let badge = if row.suspended { "[S]" } else { "" };
    let mut line = format!("  {:<name$} {:<3} ", row.name, badge, name = NAME_WIDTH);
    for c in &row.back {
        let _ = write!(line, "{:<width$}", cell_text(c), width = CELL_WIDTH);
    }
    line.push_str("| ");
    for c in &row.lay {
        let _ = write!(line, "{:<width$}", cell_text(c), width = CELL_WIDTH);
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Placeholder { .. } => PLACEHOLDER.to_string(),
        Cell::Price {
            selection,
            suspended,
            ..
        } => {
            let odds = selection.odds.unwrap_or_default();
            let stake = selection.stake.unwrap_or_default();
            if *suspended {
                format!("{}/{} (S)", odds, stake)
            } else {
                format!("{}/{}", odds, stake)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fixtures::{market, sel, snapshot};
    use crate::board::render;
    use crate::types::{MarketState, Side};

    #[test]
    fn empty_board_prints_placeholder() {
        assert_eq!(render_text(&render(&[])), "No markets available\n");
    }

    #[test]
    fn renders_headers_and_cells() {
        let markets = snapshot();
        let text = render_text(&render(&markets));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "MATCH_ODDS [OPEN] stake 100-50000");
        assert!(lines[1].starts_with("  St. Lucia Kings"));
        // back reads worst to best, lay best to worst
        let back_start = lines[1].find("1.88/300").unwrap();
        let best_back = lines[1].find("1.86/1200").unwrap();
        let lay_start = lines[1].find("| 1.9/500").unwrap();
        assert!(back_start < best_back && best_back < lay_start);
        assert!(lines[2].contains("2.06/80 (S)"));
        assert!(text.contains("Bookmaker [SUSPENDED]"));
    }

    #[test]
    fn missing_prices_print_placeholders() {
        let markets = vec![market(
            "m",
            "Fancy",
            MarketState::Open,
            vec![sel("y", "Yes", Side::Back, 1.5, 100.0)],
        )];
        let text = render_text(&render(&markets));
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row.matches(PLACEHOLDER).count(), 5);
    }

    #[test]
    fn market_without_back_prices() {
        let markets = vec![market(
            "m",
            "Fancy",
            MarketState::Open,
            vec![sel("n", "No", Side::Lay, 1.5, 100.0)],
        )];
        let text = render_text(&render(&markets));
        assert_eq!(text, "Fancy [OPEN] stake 100-50000\n  No selections\n");
    }

    #[test]
    fn text_is_stable_across_renders() {
        let markets = snapshot();
        assert_eq!(render_text(&render(&markets)), render_text(&render(&markets.clone())));
    }
}
