//! Contract between the core and the map render surface.
//!
//! The surface draws a [`Scene`] and reports back [`SurfaceEvent`]s. Marker
//! and circle looks come from an injected [`MapStyle`]; the only per-POI
//! input to a circle's look is its proximity flag.

use serde::{Deserialize, Serialize};

use crate::i18n;
use crate::models::{GeoCoordinate, Locale, ViewState};
use crate::session::TourSession;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapStyle {
    /// `{z}/{x}/{y}` tile URL template.
    pub tile_url: String,
    pub attribution: String,
    pub marker_icon_url: String,
    /// Width and height in pixels.
    pub marker_icon_size: [f64; 2],
    /// Pixel of the icon that sits on the coordinate.
    pub marker_icon_anchor: [f64; 2],
    /// Popup offset from the coordinate.
    pub popup_anchor: [f64; 2],
    pub in_range_color: String,
    pub out_of_range_color: String,
    pub fill_opacity: f64,
    pub stroke_width: f64,
    pub user_marker_color: String,
    pub user_marker_radius: f64,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            tile_url: String::from("https://tile.openstreetmap.org/{z}/{x}/{y}.png"),
            attribution: String::from("© OpenStreetMap contributors"),
            marker_icon_url: String::from("/static/images/marker-icon.svg"),
            marker_icon_size: [25.0, 41.0],
            marker_icon_anchor: [12.0, 41.0],
            popup_anchor: [1.0, -34.0],
            in_range_color: String::from("#2e7d32"),
            out_of_range_color: String::from("#c62828"),
            fill_opacity: 0.2,
            stroke_width: 2.0,
            user_marker_color: String::from("#1e88e5"),
            user_marker_radius: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleStyle {
    pub stroke: String,
    pub fill: String,
    pub fill_opacity: f64,
    pub stroke_width: f64,
}

/// Geofence circle look as a pure function of the proximity flag.
pub fn circle_style(in_range: bool, style: &MapStyle) -> CircleStyle {
    let color = if in_range {
        &style.in_range_color
    } else {
        &style.out_of_range_color
    };
    CircleStyle {
        stroke: color.clone(),
        fill: color.clone(),
        fill_opacity: style.fill_opacity,
        stroke_width: style.stroke_width,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoiMarker {
    pub poi_id: String,
    pub coordinates: GeoCoordinate,
    pub title: String,
    pub popup: String,
    pub in_range: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceCircle {
    pub poi_id: String,
    pub center: GeoCoordinate,
    pub radius_m: f64,
    pub style: CircleStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserMarker {
    pub coordinates: GeoCoordinate,
    pub label: &'static str,
}

/// Everything the surface needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub view: ViewState,
    /// Changes only when the core moved the view; the surface re-centers on change.
    pub view_revision: u64,
    pub markers: Vec<PoiMarker>,
    pub circles: Vec<GeofenceCircle>,
    pub user: Option<UserMarker>,
}

/// Events the surface reports back to the core.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    PoiActivated(String),
    /// End of a pan or zoom gesture with the surface's resulting view.
    ViewMoved {
        center: GeoCoordinate,
        zoom: Option<u8>,
    },
}

pub fn build_scene(session: &TourSession, style: &MapStyle, locale: Locale) -> Scene {
    let proximity = session.proximity();
    let mut markers = Vec::with_capacity(session.pois().len());
    let mut circles = Vec::with_capacity(session.pois().len());

    for poi in session.pois() {
        let in_range = proximity.is_in_range(&poi.id);
        let popup = if in_range {
            i18n::popup_unlocked(locale).to_string()
        } else {
            i18n::popup_locked(session.distance_to(poi), locale)
        };
        markers.push(PoiMarker {
            poi_id: poi.id.clone(),
            coordinates: poi.coordinates,
            title: poi.name.get(locale).to_string(),
            popup,
            in_range,
        });
        circles.push(GeofenceCircle {
            poi_id: poi.id.clone(),
            center: poi.coordinates,
            radius_m: poi.geofence_radius,
            style: circle_style(in_range, style),
        });
    }

    let user = session.position().map(|p| UserMarker {
        coordinates: p.coordinates,
        label: i18n::you_are_here(locale),
    });

    Scene {
        view: session.view(),
        view_revision: session.view_revision(),
        markers,
        circles,
        user,
    }
}
