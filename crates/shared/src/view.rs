//! Single owner of the map's center and zoom.
//!
//! Three sources write the view: the first fix of a tracking session, an
//! explicit recenter request, and manual navigation on the map surface. The
//! reconciler records which kind of source wrote last; the UI uses that to
//! tell whether the map currently follows the visitor. The surface itself keys
//! on `revision`: programmatic writes bump it so the surface knows to move,
//! manual writes never do, because the surface already shows the view the
//! user navigated to.

use crate::models::{GeoCoordinate, ViewState, RECENTER_ZOOM};

pub const MIN_ZOOM: u8 = 2;
pub const MAX_ZOOM: u8 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewWriter {
    /// Fallback view, nothing has written yet.
    Uninitialized,
    /// First fix or recenter.
    SystemSet,
    /// Pan or zoom on the map surface.
    UserSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no position fix is known yet")]
pub struct RecenterUnavailable;

#[derive(Debug, Clone)]
pub struct ViewReconciler {
    view: ViewState,
    writer: ViewWriter,
    revision: u64,
}

impl Default for ViewReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewReconciler {
    pub fn new() -> Self {
        Self {
            view: ViewState::fallback(),
            writer: ViewWriter::Uninitialized,
            revision: 0,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn writer(&self) -> ViewWriter {
        self.writer
    }

    /// Incremented on every programmatic write.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Center on the first fix of a tracking session.
    ///
    /// The caller decides what counts as "first"; the tracker flags exactly
    /// one fix per `start`.
    pub fn apply_first_fix(&mut self, fix: GeoCoordinate) -> ViewState {
        tracing::debug!(lat = fix.latitude, lon = fix.longitude, "centering on first fix");
        self.set_programmatic(fix)
    }

    /// Center on the latest known position at the recenter zoom.
    pub fn recenter(
        &mut self,
        latest: Option<GeoCoordinate>,
    ) -> Result<ViewState, RecenterUnavailable> {
        let Some(center) = latest else {
            tracing::debug!("recenter requested without a known position");
            return Err(RecenterUnavailable);
        };
        Ok(self.set_programmatic(center))
    }

    /// Adopt the view the surface reports at the end of a gesture.
    ///
    /// The center is taken verbatim. A missing zoom keeps the current one.
    pub fn manual_move(&mut self, center: GeoCoordinate, zoom: Option<u8>) -> ViewState {
        self.view.center = center;
        if let Some(z) = zoom {
            self.view.zoom = clamp_zoom(z);
        }
        self.writer = ViewWriter::UserSet;
        self.view
    }

    fn set_programmatic(&mut self, center: GeoCoordinate) -> ViewState {
        self.view = ViewState {
            center,
            zoom: RECENTER_ZOOM,
        };
        self.writer = ViewWriter::SystemSet;
        self.revision += 1;
        self.view
    }
}

pub fn clamp_zoom(zoom: u8) -> u8 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}
