//! NFT collection statistics board.
//!
//! - period-bucketed collection dataset with chain validation at load
//! - floor-chart downsampling and up/down trend classification
//! - persisted favorites set
//! - typed table columns and the HTTP/HTML dashboard surface

mod chain;
mod chart;
mod collections;
mod columns;
mod config;
mod dashboard;
mod error;
mod favorites;
mod observability;
mod period;

pub use chain::{normalize_chain, parse_chain, Chain, ALL_CHAINS, DEFAULT_CHAIN};
pub use chart::{
    average_over_window, build_sparkline, partition_windows, trading_direction,
    window_size_for_label, ChartError, Direction, Sparkline, TradingDirection, WindowSize,
    DEFAULT_WINDOW_SIZE, DOWN_COLOR, UP_COLOR,
};
pub use collections::{
    log_dataset_loaded, CollectionDataset, CollectionRecord, DatasetError, PeriodCollections,
};
pub use columns::{
    build_cell, filter_by_chain, leading_number, parse_column, sort_records, Cell, ColumnError,
    ColumnKey, IndexedRecord, SortOrder, AMOUNT_UNIT, COLUMNS, DEFAULT_THUMB,
};
pub use config::{server_config_from_env, ConfigError, ServerConfig, DEFAULT_BIND_ADDR};
pub use dashboard::{
    collections_router, dashboard_rows, render_dashboard_html, sparkline_svg, CollectionChart,
    DashboardQuery, ToggleResponse,
};
pub use error::ApiError;
pub use favorites::{
    FavItem, Favorites, FavoritesError, FavoritesStore, FileFavoritesStore,
    InMemoryFavoritesStore, FAVORITES_KEY,
};
pub use observability::{
    init_logging, log_app_bind, log_app_start, log_favorites_store_selected,
    logging_config_from_env, LoggingConfig, LoggingInitError,
};
pub use period::{
    current_period, parse_period, Period, PeriodError, ALL_PERIODS, INVALID_PERIOD_MESSAGE,
};
