pub mod ladder;
pub mod text;

use crate::types::{Market, MarketState, Selection, Side};
use serde::{Deserialize, Serialize};

pub use ladder::DEPTH;

/// Position of a price within its ladder. `First` is the kept price at
/// index 0 after sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd")]
    Second,
    #[serde(rename = "3rd")]
    Third,
}

impl Rank {
    pub fn index(self) -> usize {
        match self {
            Rank::First => 0,
            Rank::Second => 1,
            Rank::Third => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell<'a> {
    Price {
        rank: Rank,
        selection: &'a Selection,
        suspended: bool,
    },
    Placeholder {
        rank: Rank,
    },
}

impl<'a> Cell<'a> {
    pub fn rank(&self) -> Rank {
        match self {
            Cell::Price { rank, .. } | Cell::Placeholder { rank } => *rank,
        }
    }

    /// Selection behind a live (non-suspended) price cell
    pub fn live_selection(&self) -> Option<&'a Selection> {
        match self {
            Cell::Price {
                selection,
                suspended: false,
                ..
            } => Some(*selection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row<'a> {
    pub name: &'a str,
    pub suspended: bool,
    /// Left-to-right: 3rd, 2nd, 1st
    pub back: [Cell<'a>; DEPTH],
    /// Left-to-right: 1st, 2nd, 3rd
    pub lay: [Cell<'a>; DEPTH],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketBoard<'a> {
    #[serde(skip)]
    pub market: &'a Market,
    pub id: &'a str,
    pub name: &'a str,
    pub state: MarketState,
    pub min_stake: Option<f64>,
    pub max_stake: Option<f64>,
    pub rows: Vec<Row<'a>>,
}

/// Rendered odds board. Borrows the snapshot it was rendered from and never
/// outlives it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board<'a> {
    pub markets: Vec<MarketBoard<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAddress {
    pub market: usize,
    pub row: usize,
    pub side: Side,
    pub rank: Rank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickOutcome {
    Forwarded,
    Suspended,
    Placeholder,
    NoHandler,
    Missing,
}

pub fn render(markets: &[Market]) -> Board<'_> {
    Board {
        markets: markets.iter().map(render_market).collect(),
    }
}

fn render_market(market: &Market) -> MarketBoard<'_> {
    let rows = ladder::back_outcomes(&market.selections)
        .into_iter()
        .map(|name| render_row(market, name))
        .collect();

    MarketBoard {
        market,
        id: &market.id,
        name: &market.name,
        state: market.state,
        min_stake: market.min_stake,
        max_stake: market.max_stake,
        rows,
    }
}

fn render_row<'a>(market: &'a Market, name: &'a str) -> Row<'a> {
    let open = market.state.is_open();
    let backs = ladder::top_back(&market.selections, name);
    let lays = ladder::top_lay(&market.selections, name);

    let lead_suspended = market
        .selections
        .iter()
        .find(|s| s.side == Side::Back && s.name == name)
        .map(|s| s.suspended)
        .unwrap_or(false);

    Row {
        name,
        suspended: !open || lead_suspended,
        back: [
            cell(&backs, Rank::Third, open),
            cell(&backs, Rank::Second, open),
            cell(&backs, Rank::First, open),
        ],
        lay: [
            cell(&lays, Rank::First, open),
            cell(&lays, Rank::Second, open),
            cell(&lays, Rank::Third, open),
        ],
    }
}

fn cell<'a>(levels: &[&'a Selection], rank: Rank, market_open: bool) -> Cell<'a> {
    match levels.get(rank.index()) {
        Some(&selection) => Cell::Price {
            rank,
            selection,
            suspended: !market_open || selection.suspended,
        },
        None => Cell::Placeholder { rank },
    }
}

impl<'a> Board<'a> {
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    pub fn cell(&self, addr: &CellAddress) -> Option<&Cell<'a>> {
        let row = self.markets.get(addr.market)?.rows.get(addr.row)?;
        let cells = match addr.side {
            Side::Back => &row.back,
            Side::Lay => &row.lay,
            Side::Unknown => return None,
        };
        cells.iter().find(|c| c.rank() == addr.rank)
    }

    /// Forward a click on `addr` to `on_select`. Only live price cells reach
    /// the handler; everything else is a silent no-op.
    pub fn click(
        &self,
        addr: &CellAddress,
        on_select: Option<&mut dyn FnMut(&Selection, &Market)>,
    ) -> ClickOutcome {
        let (Some(market), Some(cell)) = (self.markets.get(addr.market), self.cell(addr)) else {
            return ClickOutcome::Missing;
        };

        match cell {
            Cell::Placeholder { .. } => ClickOutcome::Placeholder,
            Cell::Price {
                suspended: true, ..
            } => ClickOutcome::Suspended,
            Cell::Price { selection, .. } => match on_select {
                Some(handler) => {
                    handler(*selection, market.market);
                    ClickOutcome::Forwarded
                }
                None => ClickOutcome::NoHandler,
            },
        }
    }

    pub fn locate(&self, market_id: &str, outcome: &str, side: Side, rank: Rank) -> Option<CellAddress> {
        if side == Side::Unknown {
            return None;
        }
        let market = self.markets.iter().position(|m| m.id == market_id)?;
        let row = self.markets[market].rows.iter().position(|r| r.name == outcome)?;
        Some(CellAddress {
            market,
            row,
            side,
            rank,
        })
    }

    /// Every cell a click would be forwarded from
    pub fn clickable_cells(&self) -> Vec<(CellAddress, &'a Selection)> {
        let mut cells = Vec::new();
        for (m, market) in self.markets.iter().enumerate() {
            for (r, row) in market.rows.iter().enumerate() {
                let sides = [(Side::Back, &row.back), (Side::Lay, &row.lay)];
                for (side, side_cells) in sides {
                    for c in side_cells.iter() {
                        if let Some(selection) = c.live_selection() {
                            let addr = CellAddress {
                                market: m,
                                row: r,
                                side,
                                rank: c.rank(),
                            };
                            cells.push((addr, selection));
                        }
                    }
                }
            }
        }
        cells
    }
}
