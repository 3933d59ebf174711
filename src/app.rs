//! Application state management for transitboard
//!
//! This module contains the per-session controller: it owns the response cache and
//! the refresh state, loads every data source into its own section, and handles
//! keyboard input.

use chrono::{DateTime, Duration, Local, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use serde_json::Value;
use tracing::warn;

use crate::api::{ApiError, Endpoint, TransitClient, VehicleKind};
use crate::cache::{FetchError, RefreshingCache};
use crate::cli::StartupConfig;
use crate::data::{
    AlertsBoard, DecodeError, LinesBoard, LocationBounds, SearchMode, Section, StatsBoard,
    StatusFilter, SummaryBoard, TrendBoard, UnionBoard, Vehicle, VehicleFilter, VehicleSort,
    VehicleSummary, VehiclesBoard,
};
use crate::refresh::{RefreshState, TickOutcome};

/// Dashboard pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Network KPIs, performance gauge and 24-hour trends
    Overview,
    /// Train lines, bus routes and Union Station departures
    Lines,
    /// Vehicle tracker with search and map
    Vehicles,
    /// TTC summary and service alerts
    Alerts,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Overview, Page::Lines, Page::Vehicles, Page::Alerts];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Lines => "Lines",
            Page::Vehicles => "Vehicles",
            Page::Alerts => "TTC Alerts",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Page::Overview => 0,
            Page::Lines => 1,
            Page::Vehicles => 2,
            Page::Alerts => 3,
        }
    }

    pub fn next(&self) -> Page {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    pub fn prev(&self) -> Page {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }
}

/// Which field the vehicle search box edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    RouteCode,
    TripNumber,
}

impl SearchField {
    pub fn label(&self) -> &'static str {
        match self {
            SearchField::RouteCode => "Route code",
            SearchField::TripNumber => "Trip number",
        }
    }
}

/// Keyboard input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the vehicle search box
    Search { field: SearchField, buffer: String },
}

/// Every data source, each loaded independently
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub stats: Section<StatsBoard>,
    pub trends: Section<TrendBoard>,
    pub vehicles: Section<VehiclesBoard>,
    pub union: Section<UnionBoard>,
    pub train_lines: Section<LinesBoard>,
    pub bus_routes: Section<LinesBoard>,
    pub alerts: Section<AlertsBoard>,
    pub summary: Section<SummaryBoard>,
}

/// Main application struct managing state and data
pub struct App {
    /// Current page
    pub page: Page,
    /// Loaded data per source
    pub dashboard: Dashboard,
    /// Vehicle tracker filters
    pub vehicle_filter: VehicleFilter,
    /// Vehicle table ordering
    pub vehicle_sort: VehicleSort,
    /// Keyboard input mode
    pub input: InputMode,
    /// First visible row of the current page's table
    pub table_offset: usize,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating a manual refresh has been requested
    pub refresh_requested: bool,
    /// When data was last loaded
    pub last_refresh: Option<DateTime<Local>>,
    last_load_at: Option<DateTime<Utc>>,
    cache: RefreshingCache<Endpoint, Value>,
    refresh: RefreshState,
    client: TransitClient,
    ttl: Duration,
}

type FetchResult = Result<Value, FetchError<Endpoint, Value>>;

impl App {
    /// Creates a new App for a session starting now
    pub fn new(config: &StartupConfig) -> Result<Self, ApiError> {
        let client = TransitClient::with_config(&config.go_api, &config.ttc_api, config.timeout)?;
        Ok(Self::with_client(client, config, Utc::now()))
    }

    /// Creates a new App with a custom client and session start time
    pub fn with_client(client: TransitClient, config: &StartupConfig, now: DateTime<Utc>) -> Self {
        Self {
            page: config.initial_page,
            dashboard: Dashboard::default(),
            vehicle_filter: VehicleFilter::default(),
            vehicle_sort: VehicleSort::default(),
            input: InputMode::Normal,
            table_offset: 0,
            should_quit: false,
            show_help: false,
            refresh_requested: false,
            last_refresh: None,
            last_load_at: None,
            cache: RefreshingCache::new(),
            refresh: RefreshState::new(&config.refresh, now),
            client,
            ttl: config.ttl,
        }
    }

    pub fn refresh_state(&self) -> &RefreshState {
        &self.refresh
    }

    pub fn cache(&self) -> &RefreshingCache<Endpoint, Value> {
        &self.cache
    }

    /// Runs the refresh check for one pass of the UI loop
    ///
    /// A pending manual refresh takes priority over the periodic timer. Without
    /// either, data is reloaded once the last load is older than the cache TTL,
    /// so expired entries are refetched even when the TTL is shorter than the
    /// refresh interval or auto-refresh is off.
    ///
    /// # Returns
    /// `true` when data should be reloaded
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if self.refresh_requested {
            self.refresh_requested = false;
            self.refresh.manual_refresh(now, &self.cache);
            return true;
        }
        if self.refresh.tick(now, &self.cache) == TickOutcome::RefreshOccurred {
            return true;
        }
        self.reload_due(now)
    }

    /// Whether the last load has outlived the cache TTL
    ///
    /// Strictly greater, so with equal TTL and interval the periodic tick wins
    /// and the data is fetched once.
    pub fn reload_due(&self, now: DateTime<Utc>) -> bool {
        self.last_load_at.map_or(false, |at| now - at > self.ttl)
    }

    /// Loads every data source through the cache
    pub async fn load_all_data(&mut self) {
        self.load_all_data_at(Utc::now()).await;
    }

    /// Loads every data source as seen at time `now`
    ///
    /// Endpoints are fetched concurrently. Fresh cache entries are served without
    /// a network call; each failure only affects its own section.
    pub async fn load_all_data_at(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        let cache = &self.cache;
        let client = &self.client;

        let fetches = Endpoint::ALL.iter().map(|&endpoint| async move {
            let result = cache
                .get_at(endpoint, ttl, now, || client.fetch_json(endpoint))
                .await;
            (endpoint, result)
        });
        let results: Vec<(Endpoint, FetchResult)> = futures::future::join_all(fetches).await;

        for (endpoint, result) in results {
            self.apply(endpoint, result, now);
        }

        self.last_load_at = Some(now);
        self.last_refresh = Some(Local::now());
    }

    fn apply(&mut self, endpoint: Endpoint, result: FetchResult, now: DateTime<Utc>) {
        let fetched_at = self
            .cache
            .peek(&endpoint, now)
            .map(|cached| cached.cached_at)
            .unwrap_or(now);
        let d = &mut self.dashboard;

        match endpoint {
            Endpoint::Stats => {
                update_section(&mut d.stats, endpoint, result, fetched_at, StatsBoard::from_value)
            }
            Endpoint::TimeSeries => {
                update_section(&mut d.trends, endpoint, result, fetched_at, TrendBoard::from_value)
            }
            Endpoint::Vehicles => update_section(
                &mut d.vehicles,
                endpoint,
                result,
                fetched_at,
                VehiclesBoard::from_value,
            ),
            Endpoint::Union => {
                update_section(&mut d.union, endpoint, result, fetched_at, UnionBoard::from_value)
            }
            Endpoint::Lines(VehicleKind::Trains) => update_section(
                &mut d.train_lines,
                endpoint,
                result,
                fetched_at,
                LinesBoard::from_value,
            ),
            Endpoint::Lines(VehicleKind::Buses) => update_section(
                &mut d.bus_routes,
                endpoint,
                result,
                fetched_at,
                LinesBoard::from_value,
            ),
            Endpoint::Alerts => {
                update_section(&mut d.alerts, endpoint, result, fetched_at, AlertsBoard::from_value)
            }
            Endpoint::Summary => update_section(
                &mut d.summary,
                endpoint,
                result,
                fetched_at,
                SummaryBoard::from_value,
            ),
        }
    }

    /// Vehicles that pass the current filter, in table order
    pub fn filtered_vehicles(&self) -> Vec<&Vehicle> {
        let mut vehicles = self
            .dashboard
            .vehicles
            .value()
            .map(|board| self.vehicle_filter.apply(&board.vehicles))
            .unwrap_or_default();
        self.vehicle_sort.sort(&mut vehicles);
        vehicles
    }

    /// Aggregates over the filtered vehicles, if vehicle data is available
    pub fn vehicle_summary(&self) -> Option<VehicleSummary> {
        let board = self.dashboard.vehicles.value()?;
        let filtered = self.vehicle_filter.apply(&board.vehicles);
        Some(VehicleSummary::new(&filtered, board.vehicles.len()))
    }

    /// Rows in the current page's scrollable table
    pub fn row_count(&self) -> usize {
        match self.page {
            Page::Overview => 0,
            Page::Lines => self.dashboard.union.value().map_or(0, |b| b.rows.len()),
            Page::Vehicles => self.filtered_vehicles().len(),
            Page::Alerts => self.dashboard.alerts.value().map_or(0, |b| b.shown().len()),
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q` / `Esc`: Quit (or close help)
    /// - `Tab` / `Right`, `Shift-Tab` / `Left`, `1`-`4`: Switch page
    /// - `r`: Refresh now
    /// - `a`: Toggle auto-refresh
    /// - `j` / `k`: Scroll the page's table
    /// - `?`: Toggle help
    /// - Vehicles page: `/` search, `t` trains, `b` buses, `m` moving only,
    ///   `s` cycle status, `l` location box, `c` clear filters, `o` sort column,
    ///   `O` sort order
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        if let InputMode::Search { .. } = self.input {
            self.handle_search_key(key_event);
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab | KeyCode::Right => self.set_page(self.page.next()),
            KeyCode::BackTab | KeyCode::Left => self.set_page(self.page.prev()),
            KeyCode::Char('1') => self.set_page(Page::Overview),
            KeyCode::Char('2') => self.set_page(Page::Lines),
            KeyCode::Char('3') => self.set_page(Page::Vehicles),
            KeyCode::Char('4') => self.set_page(Page::Alerts),
            KeyCode::Char('r') => {
                self.refresh_requested = true;
            }
            KeyCode::Char('a') => {
                self.refresh.toggle_auto_refresh();
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                let last = self.row_count().saturating_sub(1);
                self.table_offset = (self.table_offset + 1).min(last);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.table_offset = self.table_offset.saturating_sub(1);
            }
            _ if self.page == Page::Vehicles => self.handle_vehicle_key(key_event),
            _ => {}
        }
    }

    fn set_page(&mut self, page: Page) {
        self.page = page;
        self.table_offset = 0;
    }

    fn handle_vehicle_key(&mut self, key_event: KeyEvent) {
        let filter = &mut self.vehicle_filter;
        match key_event.code {
            KeyCode::Char('/') => {
                self.input = InputMode::Search {
                    field: SearchField::RouteCode,
                    buffer: String::new(),
                };
            }
            KeyCode::Char('t') => filter.include_trains = !filter.include_trains,
            KeyCode::Char('b') => filter.include_buses = !filter.include_buses,
            KeyCode::Char('m') => filter.moving_only = !filter.moving_only,
            KeyCode::Char('s') => {
                let next = match filter.mode {
                    SearchMode::Status(status) => status.next(),
                    _ => StatusFilter::OnTime,
                };
                filter.mode = SearchMode::Status(next);
            }
            KeyCode::Char('l') => {
                filter.mode = match filter.mode {
                    SearchMode::Location(_) => SearchMode::All,
                    _ => SearchMode::Location(LocationBounds::default()),
                };
            }
            KeyCode::Char('c') => *filter = VehicleFilter::default(),
            KeyCode::Char('o') => self.vehicle_sort.key = self.vehicle_sort.key.next(),
            KeyCode::Char('O') => self.vehicle_sort.ascending = !self.vehicle_sort.ascending,
            _ => return,
        }
        self.table_offset = 0;
    }

    fn handle_search_key(&mut self, key_event: KeyEvent) {
        let InputMode::Search { field, buffer } = &mut self.input else {
            return;
        };

        match key_event.code {
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Tab => {
                *field = match *field {
                    SearchField::RouteCode => SearchField::TripNumber,
                    SearchField::TripNumber => SearchField::RouteCode,
                };
            }
            KeyCode::Enter => {
                let query = buffer.trim().to_string();
                self.vehicle_filter.mode = match *field {
                    _ if query.is_empty() => SearchMode::All,
                    SearchField::RouteCode => SearchMode::RouteCode(query.to_uppercase()),
                    SearchField::TripNumber => SearchMode::TripNumber(query),
                };
                self.input = InputMode::Normal;
                self.table_offset = 0;
            }
            KeyCode::Esc => {
                self.input = InputMode::Normal;
            }
            _ => {}
        }
    }
}

/// Replaces a section with the outcome of its latest fetch
///
/// A failed fetch keeps showing the last good data as stale: the copy carried by
/// the cache error if there is one, otherwise whatever the section displayed
/// before. With neither, the section becomes unavailable.
fn update_section<T>(
    slot: &mut Section<T>,
    endpoint: Endpoint,
    result: FetchResult,
    fetched_at: DateTime<Utc>,
    decode: fn(&Value) -> Result<T, DecodeError>,
) where
    T: Default,
{
    let previous = std::mem::take(slot);

    *slot = match result {
        Ok(value) => match decode(&value) {
            Ok(value) => Section::Ready { value, fetched_at },
            Err(e) => {
                warn!(event = "app.decode_failed", endpoint = %endpoint, error = %e);
                Section::Unavailable(format!("Unable to load {}: {}", endpoint.label(), e))
            }
        },
        Err(err) => {
            let error = format!("Unable to load {}: {}", endpoint.label(), err.source);
            let from_cache = err
                .stale
                .and_then(|cached| decode(&cached.data).ok().map(|v| (v, cached.cached_at)));

            match (from_cache, previous) {
                (Some((value, fetched_at)), _) => Section::Stale {
                    value,
                    fetched_at,
                    error,
                },
                (None, Section::Ready { value, fetched_at })
                | (None, Section::Stale { value, fetched_at, .. }) => Section::Stale {
                    value,
                    fetched_at,
                    error,
                },
                (None, _) => Section::Unavailable(error),
            }
        }
    };
}
