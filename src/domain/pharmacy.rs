//! Pharmacy finder: filters, great-circle distance and display formatting.

use serde::{Deserialize, Serialize};

use crate::domain::types::Coordinates;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two points, in meters.
pub fn haversine_distance(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude().to_radians();
    let lat2 = to.latitude().to_radians();
    let dlat = (to.latitude() - from.latitude()).to_radians();
    let dlon = (to.longitude() - from.longitude()).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Renders a distance as `"850 m"` below one kilometer and `"1.2 km"` above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.max(0.0).round() as u64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Filters accepted by the pharmacy finder. Empty strings mean "no filter".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProximityFilter {
    pub ville: Option<String>,
    pub quartier: Option<String>,
    pub search: Option<String>,
    pub garde: Option<bool>,
    pub origin: Option<Coordinates>,
}

fn normalized(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

impl ProximityFilter {
    /// Lower-cased city filter, when set.
    pub fn ville_key(&self) -> Option<String> {
        normalized(&self.ville)
    }

    /// Lower-cased district filter, when set.
    pub fn quartier_key(&self) -> Option<String> {
        normalized(&self.quartier)
    }

    /// Lower-cased free-text search, when set.
    pub fn search_key(&self) -> Option<String> {
        normalized(&self.search)
    }

    /// Only an explicit `garde=true` restricts the listing.
    pub fn on_duty_only(&self) -> bool {
        self.garde.unwrap_or(false)
    }
}
