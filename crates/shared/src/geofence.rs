use serde::{Deserialize, Serialize};

use crate::calc;
use crate::models::{Poi, Position, ProximityState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiDistance {
    pub poi_id: String,
    /// Meters from the visitor to the POI center.
    pub distance: f64,
    pub in_range: bool,
}

/// A POI is in range iff its distance is at most its geofence radius.
pub fn is_within(position: &Position, poi: &Poi) -> bool {
    calc::distance(position.coordinates, poi.coordinates) <= poi.geofence_radius
}

/// Derive the full proximity state from scratch.
///
/// Without a fix every POI is reported as out of range.
pub fn evaluate(position: Option<&Position>, pois: &[Poi]) -> ProximityState {
    let mut state = ProximityState::default();
    for poi in pois {
        let in_range = position.is_some_and(|p| is_within(p, poi));
        state.insert(poi.id.clone(), in_range);
    }
    state
}

/// Distance and range flag for every POI, in POI order.
pub fn distances(position: &Position, pois: &[Poi]) -> Vec<PoiDistance> {
    pois.iter()
        .map(|poi| {
            let distance = calc::distance(position.coordinates, poi.coordinates);
            PoiDistance {
                poi_id: poi.id.clone(),
                distance,
                in_range: distance <= poi.geofence_radius,
            }
        })
        .collect()
}

/// The closest POI to `position`, if any.
pub fn nearest(position: &Position, pois: &[Poi]) -> Option<PoiDistance> {
    distances(position, pois)
        .into_iter()
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}


#[cfg(test)]
mod tests {
    use super::fixtures::{poi, position};
    use super::*;

    #[test]
    fn test_no_position_means_nothing_in_range() {
        let pois = vec![poi("church", 52.14, 12.593, 50.0), poi("mill", 52.15, 12.6, 5000.0)];
        let state = evaluate(None, &pois);
        assert_eq!(state.len(), 2);
        assert!(!state.any_in_range());
        assert_eq!(state.get("church"), Some(false));
        assert_eq!(state.get("mill"), Some(false));
    }

    #[test]
    fn test_close_position_is_in_range() {
        let pois = vec![poi("church", 52.1400, 12.5930, 50.0)];
        let p = position(52.1400, 12.5931);
        assert!(evaluate(Some(&p), &pois).is_in_range("church"));
    }

    #[test]
    fn test_far_position_is_out_of_range() {
        let pois = vec![poi("church", 52.1400, 12.5930, 50.0)];
        let p = position(52.1450, 12.6000);
        assert!(calc::distance(p.coordinates, pois[0].coordinates) > 500.0);
        assert!(!evaluate(Some(&p), &pois).is_in_range("church"));
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let p = position(52.1400, 12.5931);
        let church = poi("church", 52.1400, 12.5930, 0.0);
        let exact = calc::distance(p.coordinates, church.coordinates);
        let pois = vec![poi("church", 52.1400, 12.5930, exact)];
        assert!(evaluate(Some(&p), &pois).is_in_range("church"));
        let pois = vec![poi("church", 52.1400, 12.5930, exact - 1e-6)];
        assert!(!evaluate(Some(&p), &pois).is_in_range("church"));
    }

    #[test]
    fn test_evaluate_matches_distance_predicate() {
        let pois = vec![
            poi("a", 52.1400, 12.5930, 50.0),
            poi("b", 52.1410, 12.5940, 150.0),
            poi("c", 52.2000, 12.7000, 10.0),
        ];
        let p = position(52.1405, 12.5935);
        let state = evaluate(Some(&p), &pois);
        for x in &pois {
            let expected = calc::distance(p.coordinates, x.coordinates) <= x.geofence_radius;
            assert_eq!(state.is_in_range(&x.id), expected, "poi {}", x.id);
        }
    }

    #[test]
    fn test_nearest_picks_closest() {
        let pois = vec![
            poi("far", 52.2000, 12.7000, 10.0),
            poi("near", 52.1401, 12.5930, 20.0),
        ];
        let p = position(52.1400, 12.5930);
        let n = nearest(&p, &pois).unwrap();
        assert_eq!(n.poi_id, "near");
        assert!(n.in_range);
    }

    #[test]
    fn test_nearest_empty() {
        assert!(nearest(&position(0.0, 0.0), &[]).is_none());
    }
}
