//! Upstream transit API
//!
//! Describes the GO Transit and TTC endpoints the dashboard polls and provides an
//! HTTP client that turns them into decoded JSON values for the cache.

mod client;

pub use client::{ApiError, TransitClient, DEFAULT_TIMEOUT};

use std::fmt;

/// Default base URL for GO Transit endpoints
pub const GO_API_BASE_URL: &str = "https://ttc-alerts-api.vercel.app/api/go";

/// Default base URL for TTC endpoints
pub const TTC_API_BASE_URL: &str = "https://ttc-alerts-api.vercel.app/api";

/// Vehicle class used by the `lines` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleKind {
    Trains,
    Buses,
}

impl VehicleKind {
    /// Query parameter value for the `vehicleType` field
    pub fn as_query(&self) -> &'static str {
        match self {
            VehicleKind::Trains => "trains",
            VehicleKind::Buses => "buses",
        }
    }
}

/// A distinct upstream request, used as the cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// GO network statistics (`[{metric, value}]`)
    Stats,
    /// GO 24-hour activity series (`[{target, datapoints}]`)
    TimeSeries,
    /// GO live vehicle positions (`{vehicles: [...]}`)
    Vehicles,
    /// Union Station departures board
    Union,
    /// Per-line performance for trains or buses
    Lines(VehicleKind),
    /// TTC service alerts
    Alerts,
    /// TTC network summary (`[{metric, value}]`)
    Summary,
}

impl Endpoint {
    /// Every endpoint the dashboard reads, in load order
    pub const ALL: [Endpoint; 8] = [
        Endpoint::Stats,
        Endpoint::TimeSeries,
        Endpoint::Vehicles,
        Endpoint::Union,
        Endpoint::Lines(VehicleKind::Trains),
        Endpoint::Lines(VehicleKind::Buses),
        Endpoint::Alerts,
        Endpoint::Summary,
    ];

    /// Builds the request URL against the configured base URLs
    ///
    /// GO endpoints select their payload with a `type` query parameter, while the
    /// TTC endpoints are sibling paths under the TTC base.
    pub fn url(&self, go_base: &str, ttc_base: &str) -> String {
        let go_base = go_base.trim_end_matches('/');
        let ttc_base = ttc_base.trim_end_matches('/');
        match self {
            Endpoint::Stats => format!("{}?type=stats", go_base),
            Endpoint::TimeSeries => format!("{}?type=timeseries", go_base),
            Endpoint::Vehicles => format!("{}?type=vehicles", go_base),
            Endpoint::Union => format!("{}?type=union", go_base),
            Endpoint::Lines(kind) => {
                format!("{}?type=lines&vehicleType={}", go_base, kind.as_query())
            }
            Endpoint::Alerts => format!("{}/alerts", ttc_base),
            Endpoint::Summary => format!("{}/summary", ttc_base),
        }
    }

    /// Human-readable label used in "Unable to load ..." messages
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::Stats => "GO Transit statistics",
            Endpoint::TimeSeries => "activity trends",
            Endpoint::Vehicles => "vehicle positions",
            Endpoint::Union => "Union Station departures",
            Endpoint::Lines(VehicleKind::Trains) => "train lines",
            Endpoint::Lines(VehicleKind::Buses) => "bus routes",
            Endpoint::Alerts => "TTC alerts",
            Endpoint::Summary => "TTC summary",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Stats => write!(f, "go/stats"),
            Endpoint::TimeSeries => write!(f, "go/timeseries"),
            Endpoint::Vehicles => write!(f, "go/vehicles"),
            Endpoint::Union => write!(f, "go/union"),
            Endpoint::Lines(kind) => write!(f, "go/lines/{}", kind.as_query()),
            Endpoint::Alerts => write!(f, "ttc/alerts"),
            Endpoint::Summary => write!(f, "ttc/summary"),
        }
    }
}
