//! Geofencing and live-location engine for the walking tour.
//!
//! Data flows one way: a [`tracker::LocationTracker`] delivers fixes, the
//! [`session::TourSession`] re-derives proximity with [`geofence::evaluate`],
//! and the map surface draws the [`render::Scene`] built from the session.
//! Gestures and the recenter control flow back through the session into the
//! [`view::ViewReconciler`].

pub mod calc;
pub mod geofence;
pub mod i18n;
pub mod models;
pub mod projection;
pub mod quiz;
pub mod render;
pub mod session;
pub mod tracker;
pub mod view;
