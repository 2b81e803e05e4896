//! Pharmacy finder: filtering and distance ordering of the directory.

use serde_json::Value;

use crate::domain::collection::Collection;
use crate::domain::document::ResourceDocument;
use crate::domain::pharmacy::{ProximityFilter, haversine_distance};
use crate::domain::records::Pharmacy;
use crate::forms::pharmacies::PharmaciesQuery;
use crate::repository::{DocumentListQuery, DocumentReader};
use crate::services::ServiceResult;

fn matches_key(value: Option<&str>, key: &str) -> bool {
    value.is_some_and(|v| v.trim().to_lowercase() == key)
}

fn matches_search(pharmacy: &Pharmacy, needle: &str) -> bool {
    [
        Some(pharmacy.name.as_str()),
        Some(pharmacy.address.as_str()),
        pharmacy.city.as_deref(),
        pharmacy.district.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

fn keep(pharmacy: &Pharmacy, filter: &ProximityFilter) -> bool {
    if !pharmacy.flags.is_active {
        return false;
    }
    if filter.on_duty_only() && !pharmacy.on_duty {
        return false;
    }
    if let Some(ville) = filter.ville_key() {
        if !matches_key(pharmacy.city.as_deref(), &ville) {
            return false;
        }
    }
    if let Some(quartier) = filter.quartier_key() {
        if !matches_key(pharmacy.district.as_deref(), &quartier) {
            return false;
        }
    }
    if let Some(search) = filter.search_key() {
        if !matches_search(pharmacy, &search) {
            return false;
        }
    }
    true
}

/// Applies a validated filter to the pharmacy directory.
///
/// With an origin, every result carries a `distance` in meters and the list
/// is ordered nearest first; pharmacies without coordinates are left out.
/// Without an origin the list is ordered by name.
pub fn find_pharmacies<R>(repo: &R, filter: &ProximityFilter) -> ServiceResult<Vec<ResourceDocument>>
where
    R: DocumentReader + ?Sized,
{
    let (_total, documents) = repo.list_documents(DocumentListQuery::new(Collection::Pharmacies))?;

    let mut matches: Vec<(Pharmacy, ResourceDocument)> = documents
        .into_iter()
        .map(|d| d.into_resource())
        .filter_map(|doc| match Pharmacy::decode(&doc) {
            Ok(pharmacy) => Some((pharmacy, doc)),
            Err(err) => {
                log::warn!("Skipping pharmacy {:?}: {err}", doc.id);
                None
            }
        })
        .filter(|(pharmacy, _)| keep(pharmacy, filter))
        .collect();

    let Some(origin) = filter.origin else {
        matches.sort_by_key(|(pharmacy, _)| pharmacy.name.to_lowercase());
        return Ok(matches.into_iter().map(|(_, doc)| doc).collect());
    };

    let mut located: Vec<(f64, ResourceDocument)> = matches
        .into_iter()
        .filter_map(|(pharmacy, mut doc)| {
            let position = pharmacy.coordinates?;
            let distance = haversine_distance(origin, position);
            doc.fields
                .insert("distance".to_string(), Value::from(distance.round()));
            Some((distance, doc))
        })
        .collect();

    located.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(located.into_iter().map(|(_, doc)| doc).collect())
}

/// Validates the raw query string and runs the finder.
pub fn search_pharmacies<R>(repo: &R, query: PharmaciesQuery) -> ServiceResult<Vec<ResourceDocument>>
where
    R: DocumentReader + ?Sized,
{
    let filter = ProximityFilter::try_from(query)?;
    find_pharmacies(repo, &filter)
}
