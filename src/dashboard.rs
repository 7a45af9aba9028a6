//! Collections API, favorites routes, and the server-rendered dashboard table.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::chain::{parse_chain, Chain, ALL_CHAINS};
use crate::chart::{build_sparkline, ChartError, Direction, Sparkline};
use crate::collections::{CollectionDataset, CollectionRecord, PeriodCollections};
use crate::columns::{
    build_cell, filter_by_chain, parse_column, sort_records, Cell, ColumnError, IndexedRecord,
    SortOrder, COLUMNS,
};
use crate::error::ApiError;
use crate::favorites::{FavItem, Favorites};
use crate::period::{current_period, Period, PeriodError, ALL_PERIODS};

const SPARKLINE_WIDTH: f64 = 120.0;
const SPARKLINE_HEIGHT: f64 = 32.0;

#[derive(Clone)]
struct AppState {
    dataset: Arc<CollectionDataset>,
    favorites: Arc<Mutex<Favorites>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub period: Option<String>,
    pub chain: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionChart {
    pub name: String,
    #[serde(flatten)]
    pub sparkline: Sparkline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToggleResponse {
    pub favorite: bool,
    pub items: Vec<FavItem>,
}

pub fn collections_router(dataset: Arc<CollectionDataset>, favorites: Favorites) -> Router {
    Router::new()
        .route("/api/collections/{period}", get(get_collections))
        .route("/api/collections/{period}/charts", get(get_charts))
        .route("/api/favorites", get(list_favorites).post(add_favorite))
        .route("/api/favorites/toggle", post(toggle_favorite))
        .route("/api/favorites/{id}", delete(remove_favorite))
        .route("/dashboard", get(get_dashboard_html))
        .with_state(AppState {
            dataset,
            favorites: Arc::new(Mutex::new(favorites)),
        })
}

/// Period records after the optional chain filter and sort from the query,
/// each still tagged with its index in the unsorted period list.
pub fn dashboard_rows(
    dataset: &CollectionDataset,
    period: Period,
    chain: Option<Chain>,
    sort: Option<(&str, SortOrder)>,
) -> Result<Vec<IndexedRecord>, ColumnError> {
    let mut rows = filter_by_chain(&dataset.get(period).collections, chain);
    if let Some((column, order)) = sort {
        sort_records(&mut rows, parse_column(column)?, order)?;
    }
    Ok(rows)
}

pub fn render_dashboard_html(
    period: Period,
    chain: Option<Chain>,
    rows: &[IndexedRecord],
    favorites: &[FavItem],
) -> Result<String, ChartError> {
    let now_utc = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

    let mut out = String::new();
    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("<title>NFT Collections</title>\n");
    out.push_str("<style>:root{--bg:#0a0a0a;--card:#141414;--ink:#f4f4f5;--muted:#9ca3af;--line:#262626;--fav:#facc15}*{box-sizing:border-box}body{margin:0;background:var(--bg);color:var(--ink);font-family:\"Supply\",\"Inter\",\"Segoe UI\",sans-serif}.shell{max-width:1400px;margin:0 auto;padding:24px 18px}.hero h1{margin:0 0 10px;font-size:1.5rem}.hero-meta{display:flex;gap:16px;flex-wrap:wrap;font-size:.85rem;color:var(--muted)}.tabs{display:flex;gap:6px;margin:14px 0}.tabs a{color:var(--muted);text-decoration:none;padding:6px 10px;border-radius:8px;border:1px solid var(--line)}.tabs a.active{color:var(--ink);background:var(--card)}.card{background:var(--card);border:1px solid var(--line);border-radius:14px;overflow:auto}table{width:100%;border-collapse:collapse;min-width:1100px}th{font-size:.75rem;color:var(--muted);text-align:right;padding:10px;border-bottom:1px solid var(--line)}td{font-size:.85rem;text-align:right;padding:8px 10px;border-bottom:1px solid var(--line);white-space:nowrap}td.name{text-align:left}.unit{color:var(--muted);margin-left:4px}.fav-btn{background:none;border:0;cursor:pointer;color:#374151;font-size:1rem}.fav-btn.is-fav{color:var(--fav)}.thumb{position:relative;width:32px;height:32px}.thumb img{width:32px;height:32px;border-radius:6px;object-fit:cover}.thumb span{position:absolute;right:-2px;bottom:-2px;width:10px;height:10px;border-radius:50%;background:#374151}</style>\n");
    out.push_str("</head><body><main class=\"shell\">\n");
    out.push_str("<section class=\"hero\"><h1>NFT Collections</h1><div class=\"hero-meta\">");
    out.push_str(&format!("<span>Period: {}</span>", period));
    out.push_str(&format!(
        "<span>Chain: {}</span>",
        escape_html(chain.map_or("All Chains", Chain::as_str))
    ));
    out.push_str(&format!("<span>Rows: {}</span>", rows.len()));
    out.push_str(&format!(
        "<span>Generated: {}</span>",
        escape_html(&now_utc)
    ));
    out.push_str("</div></section>\n");

    out.push_str("<nav class=\"tabs\">");
    for tab in ALL_PERIODS {
        let class = if tab == period { "active" } else { "" };
        out.push_str(&format!(
            "<a class=\"{class}\" href=\"/dashboard?period={tab}\">{tab}</a>"
        ));
    }
    out.push_str("</nav>\n");
    out.push_str(&chain_select_html(period, chain));

    out.push_str("<section class=\"card\"><table id=\"collections-table\">\n<thead><tr>");
    for column in COLUMNS {
        out.push_str(&format!("<th data-key=\"{}\">", column.accessor_key()));
        out.push_str(&escape_html(&column.header(period)));
        out.push_str("</th>");
    }
    out.push_str("</tr></thead><tbody>\n");

    for row in rows {
        out.push_str(&format!("<tr data-row=\"{}\">", row.id));
        for column in COLUMNS {
            let cell = build_cell(column, &row.record, period, favorites)?;
            out.push_str(&render_cell(row.id, &row.record, &cell));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody></table></section>\n");
    out.push_str("<script>document.querySelectorAll('.fav-btn').forEach(function(btn){btn.addEventListener('click',function(){fetch('/api/favorites/toggle',{method:'POST',headers:{'Content-Type':'application/json'},body:JSON.stringify({id:btn.dataset.id,name:btn.dataset.name})}).then(function(){window.location.reload();});});});</script>\n");
    out.push_str("</main></body></html>\n");
    Ok(out)
}

fn chain_select_html(period: Period, selected: Option<Chain>) -> String {
    let mut out = String::from("<form class=\"chain-filter\" method=\"get\" action=\"/dashboard\">");
    out.push_str(&format!(
        "<input type=\"hidden\" name=\"period\" value=\"{period}\">"
    ));
    out.push_str("<select name=\"chain\" onchange=\"this.form.submit()\"><option value=\"\">All Chains</option>");
    for chain in ALL_CHAINS {
        let sel = if selected == Some(chain) { " selected" } else { "" };
        let label = escape_html(chain.as_str());
        out.push_str(&format!("<option value=\"{label}\"{sel}>{label}</option>"));
    }
    out.push_str("</select></form>\n");
    out
}

fn render_cell(row_id: usize, record: &CollectionRecord, cell: &Cell<'_>) -> String {
    match cell {
        Cell::Fav { is_favorite } => format!(
            "<td><button class=\"fav-btn{}\" data-id=\"{row_id}\" data-name=\"{}\">&#9733;</button></td>",
            if *is_favorite { " is-fav" } else { "" },
            escape_html(&record.name)
        ),
        Cell::Thumb { src, chain_badge } => format!(
            "<td><div class=\"thumb\"><img src=\"{}\" alt=\"NFT Thumbnail\"><span data-chain-type=\"{}\"></span></div></td>",
            escape_html(src),
            escape_html(chain_badge)
        ),
        Cell::Name(name) => format!("<td class=\"name\">{}</td>", escape_html(name)),
        Cell::Chain(chain) => format!("<td>{}</td>", escape_html(chain.as_str())),
        Cell::Amount { amount, unit } => format!(
            "<td><span>{}</span><span class=\"unit\">{unit}</span></td>",
            escape_html(amount)
        ),
        Cell::FloorChange { text, trend } => {
            let arrow = match trend.direction {
                Direction::Up => "&#9650;",
                Direction::Down => "&#9660;",
            };
            format!(
                "<td class=\"floor-change\" style=\"color:{}\">{arrow} {}</td>",
                trend.color,
                escape_html(text)
            )
        }
        Cell::Count(value) => format!("<td>{value}</td>"),
        Cell::Percent(text) => format!("<td>{}</td>", escape_html(text)),
        Cell::Sparkline(chart) => format!("<td>{}</td>", sparkline_svg(chart)),
    }
}

/// Inline SVG polyline scaled into a fixed box.
pub fn sparkline_svg(chart: &Sparkline) -> String {
    let min = chart.y.iter().copied().fold(f64::INFINITY, f64::min);
    let max = chart.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let step = if chart.y.len() > 1 {
        SPARKLINE_WIDTH / (chart.y.len() - 1) as f64
    } else {
        0.0
    };

    let mut points: Vec<String> = chart
        .y
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let x = i as f64 * step;
            let y = if range > 0.0 {
                SPARKLINE_HEIGHT - (value - min) / range * SPARKLINE_HEIGHT
            } else {
                SPARKLINE_HEIGHT / 2.0
            };
            format!("{x:.1},{y:.1}")
        })
        .collect();
    if points.len() == 1 {
        points.push(format!("{SPARKLINE_WIDTH:.1},{:.1}", SPARKLINE_HEIGHT / 2.0));
    }

    format!(
        "<svg class=\"sparkline\" width=\"{SPARKLINE_WIDTH}\" height=\"{SPARKLINE_HEIGHT}\" viewBox=\"0 0 {SPARKLINE_WIDTH} {SPARKLINE_HEIGHT}\"><polyline fill=\"none\" stroke=\"{}\" stroke-width=\"2\" points=\"{}\"/></svg>",
        chart.color,
        points.join(" ")
    )
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn parse_sort_order(raw: Option<&str>) -> SortOrder {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("desc") => SortOrder::Desc,
        _ => SortOrder::Asc,
    }
}

fn resolve_logged<'a>(
    dataset: &'a CollectionDataset,
    label: &str,
    route: &'static str,
) -> Result<&'a PeriodCollections, PeriodError> {
    dataset.resolve(label).inspect_err(|_| {
        warn!(
            component = "collections_api",
            event = "http.collections.invalid_period",
            route,
            period = label
        );
    })
}

async fn get_collections(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<PeriodCollections>, ApiError> {
    let bucket = resolve_logged(&state.dataset, &period, "collections")?;
    info!(
        component = "collections_api",
        event = "http.collections.request",
        period = %period,
        records = bucket.collections.len()
    );
    Ok(Json(bucket.clone()))
}

async fn get_charts(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<Vec<CollectionChart>>, ApiError> {
    let bucket = resolve_logged(&state.dataset, &period, "charts")?;
    let charts = bucket
        .collections
        .iter()
        .map(|record| -> Result<CollectionChart, ChartError> {
            Ok(CollectionChart {
                name: record.name.clone(),
                sparkline: build_sparkline(&record.floor_chart, &period)?,
            })
        })
        .collect::<Result<Vec<_>, ChartError>>()?;

    info!(
        component = "collections_api",
        event = "http.charts.request",
        period = %period,
        charts = charts.len()
    );
    Ok(Json(charts))
}

async fn get_dashboard_html(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = current_period(query.period.as_deref());
    let chain = query.chain.as_deref().and_then(parse_chain);
    let order = parse_sort_order(query.order.as_deref());
    let sort = query
        .sort
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|column| (column, order));

    let rows = dashboard_rows(&state.dataset, period, chain, sort)?;
    let favorites = state.favorites.lock().await.items().to_vec();

    info!(
        component = "collections_api",
        event = "http.dashboard.request",
        period = %period,
        rows = rows.len()
    );
    Ok(Html(render_dashboard_html(period, chain, &rows, &favorites)?))
}

async fn list_favorites(State(state): State<AppState>) -> Json<Vec<FavItem>> {
    Json(state.favorites.lock().await.items().to_vec())
}

async fn add_favorite(
    State(state): State<AppState>,
    Json(item): Json<FavItem>,
) -> Result<Json<Vec<FavItem>>, ApiError> {
    let mut favorites = state.favorites.lock().await;
    favorites.add(item)?;
    Ok(Json(favorites.items().to_vec()))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Json(item): Json<FavItem>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let mut favorites = state.favorites.lock().await;
    let favorite = favorites.toggle(item)?;
    Ok(Json(ToggleResponse {
        favorite,
        items: favorites.items().to_vec(),
    }))
}

async fn remove_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<FavItem>>, ApiError> {
    let mut favorites = state.favorites.lock().await;
    favorites.remove(&id)?;
    Ok(Json(favorites.items().to_vec()))
}
