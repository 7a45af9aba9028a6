//! Period-bucketed NFT collection dataset and resolver.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::chain::{normalize_chain, Chain};
use crate::period::{parse_period, Period, PeriodError, ALL_PERIODS};

const BUNDLED_DATASET: &str = include_str!("../data/nft_collections.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub name: String,
    pub chain: Chain,
    pub floor_price: String,
    pub floor_usd: String,
    pub floor_change: String,
    pub top_offer: String,
    pub sales: u64,
    pub owners: u64,
    pub listed: String,
    pub volume: String,
    pub floor_chart: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodCollections {
    pub collections: Vec<CollectionRecord>,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed dataset json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("dataset is missing period {0}")]
    MissingPeriod(Period),
}

// Source shape before chain validation.
#[derive(Debug, Deserialize)]
struct RawRecord {
    name: String,
    chain: String,
    floor_price: String,
    floor_usd: String,
    floor_change: String,
    top_offer: String,
    sales: u64,
    owners: u64,
    listed: String,
    volume: String,
    floor_chart: Vec<f64>,
    #[serde(default)]
    thumb: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPeriod {
    collections: Vec<RawRecord>,
}

/// Immutable five-bucket dataset, validated once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDataset {
    buckets: HashMap<Period, PeriodCollections>,
}

impl CollectionDataset {
    pub fn from_json_str(raw: &str) -> Result<Self, DatasetError> {
        let mut parsed: HashMap<String, RawPeriod> = serde_json::from_str(raw)?;
        let mut buckets = HashMap::with_capacity(ALL_PERIODS.len());

        for period in ALL_PERIODS {
            let raw_period = parsed
                .remove(period.as_str())
                .ok_or(DatasetError::MissingPeriod(period))?;
            let collections = raw_period
                .collections
                .into_iter()
                .map(|record| validate_record(period, record))
                .collect();
            buckets.insert(period, PeriodCollections { collections });
        }

        Ok(Self { buckets })
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let raw = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn bundled() -> Result<Self, DatasetError> {
        Self::from_json_str(BUNDLED_DATASET)
    }

    pub fn get(&self, period: Period) -> &PeriodCollections {
        // Construction guarantees every period is present.
        &self.buckets[&period]
    }

    pub fn resolve(&self, label: &str) -> Result<&PeriodCollections, PeriodError> {
        parse_period(label).map(|period| self.get(period))
    }

    pub fn total_records(&self) -> usize {
        self.buckets.values().map(|b| b.collections.len()).sum()
    }
}

fn validate_record(period: Period, raw: RawRecord) -> CollectionRecord {
    let chain = normalize_chain(&raw.chain);
    if chain.as_str() != raw.chain {
        debug!(
            component = "collections",
            event = "dataset.chain_normalized",
            period = %period,
            collection = %raw.name,
            raw_chain = %raw.chain,
            chain = %chain
        );
    }

    CollectionRecord {
        name: raw.name,
        chain,
        floor_price: raw.floor_price,
        floor_usd: raw.floor_usd,
        floor_change: raw.floor_change,
        top_offer: raw.top_offer,
        sales: raw.sales,
        owners: raw.owners,
        listed: raw.listed,
        volume: raw.volume,
        floor_chart: raw.floor_chart,
        thumb: raw.thumb,
    }
}

pub fn log_dataset_loaded(source: &str, dataset: &CollectionDataset) {
    info!(
        component = "collections",
        event = "dataset.loaded",
        source,
        periods = ALL_PERIODS.len(),
        records = dataset.total_records()
    );
}
