use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::calc;
use crate::geofence;
use crate::models::{LocationError, Poi, Position, ProximityState, ViewState};
use crate::render::SurfaceEvent;
use crate::tracker::{LocationTracker, LocationUpdate, PositionSource, SubscriptionHandle, WatchOptions};
use crate::view::{RecenterUnavailable, ViewReconciler, ViewWriter};

/// Outcome of a visitor tapping a POI marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PoiActivation {
    /// Visitor is inside the geofence: launch the quiz for this POI.
    QuizUnlocked { poi_id: String },
    /// Visitor is outside; `distance` is known once a fix exists.
    Locked { poi_id: String, distance: Option<f64> },
}

/// Live state of one tour: latest fix, latest error, proximity and view.
#[derive(Debug, Clone)]
pub struct TourSession {
    pois: Vec<Poi>,
    position: Option<Position>,
    error: Option<LocationError>,
    proximity: ProximityState,
    view: ViewReconciler,
}

impl TourSession {
    pub fn new(pois: Vec<Poi>) -> Self {
        let proximity = geofence::evaluate(None, &pois);
        Self {
            pois,
            position: None,
            error: None,
            proximity,
            view: ViewReconciler::new(),
        }
    }

    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    pub fn poi(&self, id: &str) -> Option<&Poi> {
        self.pois.iter().find(|p| p.id == id)
    }

    /// Swap in a new POI set (e.g. after the provider finished loading).
    pub fn set_pois(&mut self, pois: Vec<Poi>) {
        self.pois = pois;
        self.proximity = geofence::evaluate(self.position.as_ref(), &self.pois);
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn error(&self) -> Option<LocationError> {
        self.error
    }

    pub fn proximity(&self) -> &ProximityState {
        &self.proximity
    }

    pub fn view(&self) -> ViewState {
        self.view.view()
    }

    pub fn view_writer(&self) -> ViewWriter {
        self.view.writer()
    }

    pub fn view_revision(&self) -> u64 {
        self.view.revision()
    }

    /// The recenter control is enabled once any fix has been obtained.
    pub fn recenter_enabled(&self) -> bool {
        self.position.is_some()
    }

    pub fn apply_update(&mut self, update: LocationUpdate) {
        self.error = None;
        self.position = Some(update.position);
        let previous = std::mem::replace(
            &mut self.proximity,
            geofence::evaluate(self.position.as_ref(), &self.pois),
        );
        for poi_id in self.proximity.entered_since(&previous) {
            tracing::info!(poi_id, "entered geofence");
        }
        for poi_id in previous.entered_since(&self.proximity) {
            tracing::info!(poi_id, "left geofence");
        }
        if update.first_fix {
            self.view.apply_first_fix(update.position.coordinates);
        }
    }

    /// Record a tracking error. Position and proximity keep their last values.
    pub fn apply_error(&mut self, error: LocationError) {
        self.error = Some(error);
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn recenter(&mut self) -> Result<ViewState, RecenterUnavailable> {
        self.view.recenter(self.position.map(|p| p.coordinates))
    }

    pub fn handle_surface_event(&mut self, event: SurfaceEvent) -> Option<PoiActivation> {
        match event {
            SurfaceEvent::ViewMoved { center, zoom } => {
                self.view.manual_move(center, zoom);
                None
            }
            SurfaceEvent::PoiActivated(poi_id) => self.activate_poi(&poi_id),
        }
    }

    /// Unknown ids yield `None`.
    pub fn activate_poi(&self, poi_id: &str) -> Option<PoiActivation> {
        let poi = self.poi(poi_id)?;
        if self.proximity.is_in_range(poi_id) {
            tracing::info!(poi_id, "quiz unlocked");
            return Some(PoiActivation::QuizUnlocked {
                poi_id: poi.id.clone(),
            });
        }
        let distance = self
            .position
            .map(|p| calc::distance(p.coordinates, poi.coordinates));
        Some(PoiActivation::Locked {
            poi_id: poi.id.clone(),
            distance,
        })
    }

    /// Distance from the latest fix to a POI.
    pub fn distance_to(&self, poi: &Poi) -> Option<f64> {
        self.position
            .map(|p| calc::distance(p.coordinates, poi.coordinates))
    }
}

/// Shared mutable access to a session from inside tracker callbacks.
///
/// Implemented for `Rc<RefCell<_>>` here; UI layers wrap their own reactive
/// cell.
pub trait SessionCell: Clone + 'static {
    fn update(&self, f: impl FnOnce(&mut TourSession));
}

impl SessionCell for Rc<RefCell<TourSession>> {
    fn update(&self, f: impl FnOnce(&mut TourSession)) {
        f(&mut self.borrow_mut());
    }
}

/// Start `tracker` with callbacks that feed `session`.
pub fn track<S: PositionSource, C: SessionCell>(
    tracker: &mut LocationTracker<S>,
    session: &C,
    options: WatchOptions,
) -> Option<SubscriptionHandle> {
    let on_update = session.clone();
    let on_error = session.clone();
    tracker.start(
        move |update| on_update.update(|s| s.apply_update(update)),
        move |error| on_error.update(|s| s.apply_error(error)),
        options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geofence::fixtures::{poi, position};
    use crate::models::{GeoCoordinate, RECENTER_ZOOM};
    use crate::tracker::testing::FakeSource;
    use crate::tracker::{SourceReading, CODE_PERMISSION_DENIED, CODE_TIMEOUT};

    fn church_pois() -> Vec<Poi> {
        vec![
            poi("church", 52.1400, 12.5930, 50.0),
            poi("mill", 52.1450, 12.6000, 30.0),
        ]
    }

    fn tracked() -> (FakeSource, LocationTracker<FakeSource>, Rc<RefCell<TourSession>>) {
        let source = FakeSource::new();
        let mut tracker = LocationTracker::new(source.clone());
        let session = Rc::new(RefCell::new(TourSession::new(church_pois())));
        track(&mut tracker, &session, WatchOptions::default());
        (source, tracker, session)
    }

    #[test]
    fn test_new_session_has_nothing_in_range() {
        let s = TourSession::new(church_pois());
        assert_eq!(s.proximity().len(), 2);
        assert!(!s.proximity().any_in_range());
        assert!(!s.recenter_enabled());
        assert_eq!(s.view(), ViewState::fallback());
    }

    #[test]
    fn test_first_fix_centers_view() {
        let (source, _tracker, session) = tracked();
        source.fix(52.1400, 12.5931);
        let s = session.borrow();
        assert_eq!(s.view().center, GeoCoordinate::new(52.1400, 12.5931));
        assert_eq!(s.view().zoom, RECENTER_ZOOM);
        assert!(s.proximity().is_in_range("church"));
        assert!(!s.proximity().is_in_range("mill"));
    }

    #[test]
    fn test_second_fix_does_not_move_view() {
        let (source, _tracker, session) = tracked();
        source.fix(52.1400, 12.5931);
        source.fix(52.1450, 12.6000);
        let s = session.borrow();
        assert_eq!(s.view().center, GeoCoordinate::new(52.1400, 12.5931));
        assert_eq!(s.position().unwrap().coordinates, GeoCoordinate::new(52.1450, 12.6000));
        assert!(!s.proximity().is_in_range("church"));
        assert!(s.proximity().is_in_range("mill"));
    }

    #[test]
    fn test_manual_move_survives_later_fixes() {
        let (source, _tracker, session) = tracked();
        source.fix(52.1400, 12.5931);
        let dragged = GeoCoordinate::new(52.1300, 12.5800);
        session.borrow_mut().handle_surface_event(SurfaceEvent::ViewMoved {
            center: dragged,
            zoom: Some(16),
        });
        source.fix(52.1401, 12.5932);
        let s = session.borrow();
        assert_eq!(s.view().center, dragged);
        assert_eq!(s.view().zoom, 16);
        assert_eq!(s.view_writer(), ViewWriter::UserSet);
    }

    #[test]
    fn test_error_recovery_does_not_recenter_again() {
        let (source, _tracker, session) = tracked();
        source.fix(52.1400, 12.5931);
        let dragged = GeoCoordinate::new(52.1300, 12.5800);
        session.borrow_mut().handle_surface_event(SurfaceEvent::ViewMoved {
            center: dragged,
            zoom: None,
        });
        source.error(CODE_TIMEOUT);
        assert_eq!(session.borrow().error(), Some(LocationError::Timeout));
        source.fix(52.1402, 12.5933);
        let s = session.borrow();
        assert_eq!(s.error(), None);
        assert_eq!(s.view().center, dragged);
    }

    #[test]
    fn test_error_keeps_last_position_and_proximity() {
        let (source, _tracker, session) = tracked();
        source.fix(52.1400, 12.5931);
        source.error(CODE_PERMISSION_DENIED);
        let s = session.borrow();
        assert_eq!(s.error(), Some(LocationError::PermissionDenied));
        assert!(s.position().is_some());
        assert!(s.proximity().is_in_range("church"));
    }

    #[test]
    fn test_recenter_requires_fix() {
        let mut s = TourSession::new(church_pois());
        assert_eq!(s.recenter(), Err(RecenterUnavailable));
        assert!(!s.recenter_enabled());
        assert_eq!(s.view(), ViewState::fallback());
    }

    #[test]
    fn test_recenter_uses_latest_fix() {
        let (source, _tracker, session) = tracked();
        source.fix(52.1400, 12.5931);
        source.fix(52.1450, 12.6000);
        session.borrow_mut().handle_surface_event(SurfaceEvent::ViewMoved {
            center: GeoCoordinate::new(50.0, 10.0),
            zoom: Some(8),
        });
        let v = session.borrow_mut().recenter().unwrap();
        assert_eq!(v.center, GeoCoordinate::new(52.1450, 12.6000));
        assert_eq!(v.zoom, RECENTER_ZOOM);
        assert!(session.borrow().recenter_enabled());
    }

    #[test]
    fn test_late_callback_after_stop_leaves_state_untouched() {
        let (source, mut tracker, session) = tracked();
        source.fix(52.1400, 12.5931);
        let before_position = *session.borrow().position().unwrap();
        let before_proximity = session.borrow().proximity().clone();

        tracker.stop_active();
        let watch = source.cleared()[0];
        source.emit_late(watch, SourceReading::Fix(position(52.1450, 12.6000)));

        let s = session.borrow();
        assert_eq!(*s.position().unwrap(), before_position);
        assert_eq!(*s.proximity(), before_proximity);
    }

    #[test]
    fn test_activate_in_range_unlocks_quiz() {
        let mut s = TourSession::new(church_pois());
        s.apply_update(LocationUpdate {
            position: position(52.1400, 12.5931),
            first_fix: true,
        });
        assert_eq!(
            s.handle_surface_event(SurfaceEvent::PoiActivated("church".into())),
            Some(PoiActivation::QuizUnlocked {
                poi_id: "church".into()
            })
        );
    }

    #[test]
    fn test_activate_out_of_range_reports_distance() {
        let mut s = TourSession::new(church_pois());
        assert_eq!(
            s.activate_poi("mill"),
            Some(PoiActivation::Locked {
                poi_id: "mill".into(),
                distance: None
            })
        );
        s.apply_update(LocationUpdate {
            position: position(52.1400, 12.5930),
            first_fix: true,
        });
        match s.activate_poi("mill") {
            Some(PoiActivation::Locked {
                distance: Some(d), ..
            }) => assert!(d > 500.0),
            other => panic!("unexpected activation {other:?}"),
        }
        assert_eq!(s.activate_poi("castle"), None);
    }

    #[test]
    fn test_set_pois_reevaluates() {
        let mut s = TourSession::new(Vec::new());
        s.apply_update(LocationUpdate {
            position: position(52.1400, 12.5931),
            first_fix: true,
        });
        assert!(s.proximity().is_empty());
        s.set_pois(church_pois());
        assert!(s.proximity().is_in_range("church"));
    }

    /// A cell that counts writes, standing in for a UI framework's signal.
    #[derive(Clone)]
    struct CountingCell {
        session: Rc<RefCell<TourSession>>,
        writes: Rc<std::cell::Cell<usize>>,
    }

    impl SessionCell for CountingCell {
        fn update(&self, f: impl FnOnce(&mut TourSession)) {
            self.writes.set(self.writes.get() + 1);
            f(&mut self.session.borrow_mut());
        }
    }

    #[test]
    fn test_track_through_custom_cell() {
        let source = FakeSource::new();
        let mut tracker = LocationTracker::new(source.clone());
        let cell = CountingCell {
            session: Rc::new(RefCell::new(TourSession::new(church_pois()))),
            writes: Rc::new(std::cell::Cell::new(0)),
        };
        assert!(track(&mut tracker, &cell, WatchOptions::default()).is_some());

        source.fix(52.1400, 12.5931);
        source.emit(SourceReading::Error {
            code: CODE_TIMEOUT,
            message: "slow".into(),
        });
        assert_eq!(cell.writes.get(), 2);
        let s = cell.session.borrow();
        assert!(s.proximity().is_in_range("church"));
        assert_eq!(s.error(), Some(LocationError::Timeout));
    }

    #[test]
    fn test_track_reports_missing_capability() {
        let mut tracker = LocationTracker::new(FakeSource::unavailable());
        let session = Rc::new(RefCell::new(TourSession::new(church_pois())));
        assert!(track(&mut tracker, &session, WatchOptions::default()).is_none());
        assert_eq!(
            session.borrow().error(),
            Some(LocationError::CapabilityUnavailable)
        );
    }
}
