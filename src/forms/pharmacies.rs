use serde::Deserialize;
use validator::Validate;

use crate::domain::pharmacy::ProximityFilter;
use crate::domain::types::Coordinates;
use crate::forms::FormError;

#[derive(Debug, Default, Deserialize, Validate)]
/// Query string of the pharmacy finder. Every field may be sent empty.
pub struct PharmaciesQuery {
    #[validate(length(max = 100))]
    pub ville: Option<String>,
    #[validate(length(max = 100))]
    pub quartier: Option<String>,
    #[validate(length(max = 200))]
    pub search: Option<String>,
    pub garde: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_garde(value: Option<&str>) -> Result<Option<bool>, FormError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some("true") | Some("1") | Some("on") => Ok(Some(true)),
        Some("false") | Some("0") | Some("off") => Ok(Some(false)),
        Some(_) => Err(FormError::InvalidGarde),
    }
}

fn parse_degrees(value: Option<&str>) -> Result<Option<f64>, FormError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|_| FormError::InvalidCoordinates),
    }
}

impl TryFrom<PharmaciesQuery> for ProximityFilter {
    type Error = FormError;

    fn try_from(query: PharmaciesQuery) -> Result<Self, Self::Error> {
        query.validate()?;

        let garde = parse_garde(query.garde.as_deref())?;
        let latitude = parse_degrees(query.latitude.as_deref())?;
        let longitude = parse_degrees(query.longitude.as_deref())?;

        let origin = match (latitude, longitude) {
            (Some(lat), Some(lon)) => {
                Some(Coordinates::new(lat, lon).map_err(|_| FormError::InvalidCoordinates)?)
            }
            (None, None) => None,
            _ => return Err(FormError::IncompleteCoordinates),
        };

        Ok(ProximityFilter {
            ville: non_blank(query.ville),
            quartier: non_blank(query.quartier),
            search: non_blank(query.search),
            garde,
            origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> PharmaciesQuery {
        PharmaciesQuery::default()
    }

    #[test]
    fn empty_parameters_mean_no_filter() {
        let filter = ProximityFilter::try_from(PharmaciesQuery {
            ville: Some(String::new()),
            garde: Some(String::new()),
            latitude: Some(String::new()),
            longitude: Some(String::new()),
            ..query()
        })
        .unwrap();
        assert_eq!(filter, ProximityFilter::default());
    }

    #[test]
    fn parses_coordinates_and_garde() {
        let filter = ProximityFilter::try_from(PharmaciesQuery {
            ville: Some("Dakar".into()),
            garde: Some("true".into()),
            latitude: Some("14.6928".into()),
            longitude: Some("-17.4467".into()),
            ..query()
        })
        .unwrap();
        assert_eq!(filter.ville.as_deref(), Some("Dakar"));
        assert!(filter.on_duty_only());
        let origin = filter.origin.unwrap();
        assert_eq!(origin.latitude(), 14.6928);
        assert_eq!(origin.longitude(), -17.4467);
    }

    #[test]
    fn rejects_half_a_position() {
        let result = ProximityFilter::try_from(PharmaciesQuery {
            latitude: Some("14.7".into()),
            ..query()
        });
        assert!(matches!(result, Err(FormError::IncompleteCoordinates)));
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let result = ProximityFilter::try_from(PharmaciesQuery {
            latitude: Some("95".into()),
            longitude: Some("10".into()),
            ..query()
        });
        assert!(matches!(result, Err(FormError::InvalidCoordinates)));

        let result = ProximityFilter::try_from(PharmaciesQuery {
            latitude: Some("north".into()),
            longitude: Some("10".into()),
            ..query()
        });
        assert!(matches!(result, Err(FormError::InvalidCoordinates)));
    }

    #[test]
    fn rejects_unknown_garde_values() {
        let result = ProximityFilter::try_from(PharmaciesQuery {
            garde: Some("maybe".into()),
            ..query()
        });
        assert!(matches!(result, Err(FormError::InvalidGarde)));
    }

    #[test]
    fn rejects_oversized_search() {
        let result = ProximityFilter::try_from(PharmaciesQuery {
            search: Some("x".repeat(201)),
            ..query()
        });
        assert!(matches!(result, Err(FormError::Validation(_))));
    }
}
