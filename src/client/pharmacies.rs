//! Pharmacy finder queries against `/public/pharmacies`.

use reqwest::Method;

use crate::client::{FetchOutcome, ResourceClient, documents_from};
use crate::domain::document::ResourceDocument;
use crate::domain::pharmacy::{ProximityFilter, format_distance};
use crate::domain::records::Pharmacy;
use crate::domain::types::Coordinates;

/// Builder for the finder query string. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityQuery {
    filter: ProximityFilter,
}

impl ProximityQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ville(mut self, ville: impl Into<String>) -> Self {
        self.filter.ville = Some(ville.into());
        self
    }

    pub fn quartier(mut self, quartier: impl Into<String>) -> Self {
        self.filter.quartier = Some(quartier.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.filter.search = Some(search.into());
        self
    }

    pub fn on_duty(mut self, garde: bool) -> Self {
        self.filter.garde = Some(garde);
        self
    }

    pub fn near(mut self, position: Coordinates) -> Self {
        self.filter.origin = Some(position);
        self
    }

    pub fn filter(&self) -> &ProximityFilter {
        &self.filter
    }

    /// Query pairs as sent on the wire.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let filter = &self.filter;
        let mut pairs = Vec::new();
        let text = [
            ("ville", &filter.ville),
            ("quartier", &filter.quartier),
            ("search", &filter.search),
        ];
        for (key, value) in text {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }
        if let Some(garde) = filter.garde {
            pairs.push(("garde", garde.to_string()));
        }
        if let Some(origin) = filter.origin {
            pairs.push(("latitude", origin.latitude().to_string()));
            pairs.push(("longitude", origin.longitude().to_string()));
        }
        pairs
    }
}

/// Decodes finder results, skipping malformed entries.
pub fn decode_pharmacies(docs: &[ResourceDocument]) -> Vec<Pharmacy> {
    docs.iter()
        .filter_map(|doc| match Pharmacy::decode(doc) {
            Ok(pharmacy) => Some(pharmacy),
            Err(err) => {
                log::warn!("Skipping pharmacy {:?}: {err}", doc.id);
                None
            }
        })
        .collect()
}

/// `"850 m"` / `"1.2 km"` label for results that carry a distance.
pub fn distance_label(pharmacy: &Pharmacy) -> Option<String> {
    pharmacy.distance.map(format_distance)
}

impl ResourceClient {
    /// Runs the finder. Each call hits the server; nothing is cached.
    pub async fn fetch_pharmacies(&self, query: &ProximityQuery) -> FetchOutcome {
        let url = match self.url(&["public", "pharmacies"]) {
            Ok(url) => url,
            Err(err) => {
                log::error!("Failed to search pharmacies: {err}");
                return FetchOutcome::Loaded(Vec::new());
            }
        };
        let pairs = query.to_pairs();

        match self
            .read(|| self.request(Method::GET, url.clone(), None).query(&pairs))
            .await
        {
            Ok(data) => FetchOutcome::Loaded(documents_from(data)),
            Err(err) if err.is_transient() => {
                log::error!("Pharmacy finder unavailable: {err}");
                FetchOutcome::Unavailable
            }
            Err(err) => {
                log::error!("Failed to search pharmacies: {err}");
                FetchOutcome::Loaded(Vec::new())
            }
        }
    }
}
