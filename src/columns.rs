//! Typed dashboard table columns, cells, sorting, and chain filtering.

use std::borrow::Borrow;
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::Chain;
use crate::chart::{build_sparkline, trading_direction, ChartError, Sparkline, TradingDirection};
use crate::collections::CollectionRecord;
use crate::favorites::FavItem;
use crate::period::Period;

pub const DEFAULT_THUMB: &str = "/img/thumbs/thumb1.png";
pub const AMOUNT_UNIT: &str = "ETH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    Fav,
    Thumb,
    Name,
    Chain,
    FloorPrice,
    FloorChange,
    TopOffer,
    Sales,
    Owners,
    Listed,
    Volume,
    FloorChart,
}

pub const COLUMNS: [ColumnKey; 12] = [
    ColumnKey::Fav,
    ColumnKey::Thumb,
    ColumnKey::Name,
    ColumnKey::Chain,
    ColumnKey::FloorPrice,
    ColumnKey::FloorChange,
    ColumnKey::TopOffer,
    ColumnKey::Sales,
    ColumnKey::Owners,
    ColumnKey::Listed,
    ColumnKey::Volume,
    ColumnKey::FloorChart,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ColumnError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("column {0} is not sortable")]
    NotSortable(&'static str),
}

impl ColumnKey {
    pub fn accessor_key(self) -> &'static str {
        match self {
            Self::Fav => "fav",
            Self::Thumb => "thumb",
            Self::Name => "name",
            Self::Chain => "chain",
            Self::FloorPrice => "floor_price",
            Self::FloorChange => "floor_change",
            Self::TopOffer => "top_offer",
            Self::Sales => "sales",
            Self::Owners => "owners",
            Self::Listed => "listed",
            Self::Volume => "volume",
            Self::FloorChart => "floor_chart",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fav | Self::Thumb => "",
            Self::Name => "Name",
            Self::Chain => "Chain",
            Self::FloorPrice | Self::FloorChart => "Floor",
            Self::FloorChange => "FL. Ch",
            Self::TopOffer => "Top Offer",
            Self::Sales => "Sales",
            Self::Owners => "Owners",
            Self::Listed => "Listed",
            Self::Volume => "Volume",
        }
    }

    pub fn sortable(self) -> bool {
        matches!(
            self,
            Self::Name
                | Self::FloorPrice
                | Self::FloorChange
                | Self::Sales
                | Self::Owners
                | Self::Listed
                | Self::Volume
        )
    }

    pub fn includes_period(self) -> bool {
        matches!(
            self,
            Self::FloorPrice | Self::FloorChange | Self::Sales | Self::Volume | Self::FloorChart
        )
    }

    pub fn header(self, period: Period) -> String {
        if self.includes_period() {
            format!("{} {}", self.label(), period)
        } else {
            self.label().to_string()
        }
    }
}

pub fn parse_column(input: &str) -> Result<ColumnKey, ColumnError> {
    COLUMNS
        .iter()
        .copied()
        .find(|column| column.accessor_key() == input)
        .ok_or_else(|| ColumnError::UnknownColumn(input.to_string()))
}

/// One rendered cell; each column produces exactly one variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Fav { is_favorite: bool },
    Thumb { src: &'a str, chain_badge: String },
    Name(&'a str),
    Chain(Chain),
    Amount { amount: &'a str, unit: &'static str },
    FloorChange { text: &'a str, trend: TradingDirection },
    Count(u64),
    Percent(&'a str),
    Sparkline(Sparkline),
}

pub fn build_cell<'a>(
    column: ColumnKey,
    record: &'a CollectionRecord,
    period: Period,
    favorites: &[FavItem],
) -> Result<Cell<'a>, ChartError> {
    Ok(match column {
        ColumnKey::Fav => Cell::Fav {
            is_favorite: favorites.iter().any(|fav| fav.name == record.name),
        },
        ColumnKey::Thumb => Cell::Thumb {
            src: record.thumb.as_deref().unwrap_or(DEFAULT_THUMB),
            chain_badge: record.chain.badge_slug(),
        },
        ColumnKey::Name => Cell::Name(&record.name),
        ColumnKey::Chain => Cell::Chain(record.chain),
        ColumnKey::FloorPrice => amount_cell(&record.floor_price),
        ColumnKey::TopOffer => amount_cell(&record.top_offer),
        ColumnKey::Volume => amount_cell(&record.volume),
        ColumnKey::FloorChange => Cell::FloorChange {
            text: &record.floor_change,
            trend: trading_direction(&record.floor_chart)?,
        },
        ColumnKey::Sales => Cell::Count(record.sales),
        ColumnKey::Owners => Cell::Count(record.owners),
        ColumnKey::Listed => Cell::Percent(&record.listed),
        ColumnKey::FloorChart => {
            Cell::Sparkline(build_sparkline(&record.floor_chart, period.as_str())?)
        }
    })
}

fn amount_cell(raw: &str) -> Cell<'_> {
    Cell::Amount {
        amount: raw.split_whitespace().next().unwrap_or(""),
        unit: AMOUNT_UNIT,
    }
}

/// Leading numeric value of strings such as `"10.5 Ethereum"`, `"-3.0%"`, `"$25500"`.
pub fn leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start().trim_start_matches('$');
    let end = trimmed
        .char_indices()
        .find(|(idx, c)| !(c.is_ascii_digit() || *c == '.' || (*idx == 0 && (*c == '-' || *c == '+'))))
        .map(|(idx, _)| idx)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// A period record paired with its index in the unsorted period list. The
/// index is the row id handed to the favorites toggle, so it must survive
/// filtering and sorting.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRecord {
    pub id: usize,
    pub record: CollectionRecord,
}

impl Borrow<CollectionRecord> for IndexedRecord {
    fn borrow(&self) -> &CollectionRecord {
        &self.record
    }
}

/// Stable sort; in ascending order unparseable amounts sort after numeric ones.
pub fn sort_records<R: Borrow<CollectionRecord>>(
    records: &mut [R],
    column: ColumnKey,
    order: SortOrder,
) -> Result<(), ColumnError> {
    if !column.sortable() {
        return Err(ColumnError::NotSortable(column.accessor_key()));
    }

    records.sort_by(|a, b| {
        let a = <R as Borrow<CollectionRecord>>::borrow(a);
        let b = <R as Borrow<CollectionRecord>>::borrow(b);
        let ordering = match column {
            ColumnKey::Name => a.name.cmp(&b.name),
            ColumnKey::Sales => a.sales.cmp(&b.sales),
            ColumnKey::Owners => a.owners.cmp(&b.owners),
            ColumnKey::FloorPrice => compare_numeric(&a.floor_price, &b.floor_price),
            ColumnKey::FloorChange => compare_numeric(&a.floor_change, &b.floor_change),
            ColumnKey::Listed => compare_numeric(&a.listed, &b.listed),
            ColumnKey::Volume => compare_numeric(&a.volume, &b.volume),
            _ => Ordering::Equal,
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    Ok(())
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    match (leading_number(a), leading_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `None` is the "All Chains" selection.
pub fn filter_by_chain(records: &[CollectionRecord], chain: Option<Chain>) -> Vec<IndexedRecord> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| chain.map_or(true, |wanted| record.chain == wanted))
        .map(|(id, record)| IndexedRecord {
            id,
            record: record.clone(),
        })
        .collect()
}
