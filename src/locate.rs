//! Waiting for a location fix and resolving it to a district.

use crate::model::District;
use crate::nearest::nearest;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::timeout;

/// Upper bound on how long a location request may take.
pub const DEFAULT_LOCATE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
}

impl FromStr for Coordinates {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = value
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG but got {value:?}"))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid latitude {lat:?}: {err}"))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid longitude {lng:?}: {err}"))?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(format!("coordinates out of range: {lat},{lng}"));
        }
        Ok(Self { lat, lng })
    }
}

/// Waits for a single location request, giving up after `limit`.
///
/// Failures and timeouts are logged and yield `None`; the caller falls back to manual
/// selection.
pub async fn await_fix<F, E>(request: F, limit: Duration) -> Option<Coordinates>
where
    F: Future<Output = Result<Coordinates, E>>,
    E: std::fmt::Display,
{
    match timeout(limit, request).await {
        Ok(Ok(fix)) => Some(fix),
        Ok(Err(err)) => {
            log::warn!("location unavailable: {err}");
            None
        }
        Err(_) => {
            log::warn!("no location fix within {}s", limit.as_secs_f64());
            None
        }
    }
}

pub async fn locate_district<F, E>(
    request: F,
    districts: &[District],
    limit: Duration,
) -> Option<&District>
where
    F: Future<Output = Result<Coordinates, E>>,
    E: std::fmt::Display,
{
    let fix = await_fix(request, limit).await?;
    let found = nearest(fix, districts);
    if let Some(district) = found {
        log::info!(
            "nearest district to {:.4},{:.4} is {} ({})",
            fix.lat,
            fix.lng,
            district.name,
            district.id
        );
    }
    found
}
