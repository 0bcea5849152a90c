//! `navigator.geolocation` as a [`PositionSource`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use geotour_shared::models::{GeoCoordinate, LocationError, Position as CorePosition};
use geotour_shared::tracker::{
    PositionSource, ReadingCallback, SourceReading, WatchId, WatchOptions,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Geolocation, Position, PositionError, PositionOptions};

type SuccessClosure = Closure<dyn FnMut(Position)>;
type ErrorClosure = Closure<dyn FnMut(PositionError)>;

/// JS closures must outlive the watch they were registered for.
#[derive(Default)]
pub struct BrowserGeolocation {
    closures: RefCell<HashMap<i32, (SuccessClosure, ErrorClosure)>>,
}

fn geolocation() -> Option<Geolocation> {
    let geo = web_sys::window()?.navigator().geolocation().ok()?;
    if geo.is_undefined() || geo.is_null() {
        None
    } else {
        Some(geo)
    }
}

fn millis(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

fn position_options(options: &WatchOptions) -> PositionOptions {
    let opts = PositionOptions::new();
    opts.set_enable_high_accuracy(options.high_accuracy);
    opts.set_maximum_age(millis(options.maximum_age));
    opts.set_timeout(millis(options.timeout));
    opts
}

fn to_position(p: &Position) -> CorePosition {
    let coords = p.coords();
    CorePosition {
        coordinates: GeoCoordinate::new(coords.latitude(), coords.longitude()),
        timestamp_ms: p.timestamp(),
    }
}

impl BrowserGeolocation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PositionSource for BrowserGeolocation {
    fn is_available(&self) -> bool {
        geolocation().is_some()
    }

    fn watch(
        &self,
        options: &WatchOptions,
        callback: ReadingCallback,
    ) -> Result<WatchId, LocationError> {
        let geo = geolocation().ok_or(LocationError::CapabilityUnavailable)?;
        let callback = Rc::new(RefCell::new(callback));

        let on_fix = {
            let callback = Rc::clone(&callback);
            Closure::<dyn FnMut(Position)>::new(move |p: Position| {
                (*callback.borrow_mut())(SourceReading::Fix(to_position(&p)));
            })
        };
        let on_error = {
            let callback = Rc::clone(&callback);
            Closure::<dyn FnMut(PositionError)>::new(
                move |e: PositionError| {
                    (*callback.borrow_mut())(SourceReading::Error {
                        code: e.code(),
                        message: e.message(),
                    });
                },
            )
        };

        let id = geo
            .watch_position_with_error_callback_and_options(
                on_fix.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &position_options(options),
            )
            .map_err(|err| {
                tracing::warn!(?err, "watchPosition threw");
                LocationError::Unknown
            })?;

        self.closures.borrow_mut().insert(id, (on_fix, on_error));
        Ok(WatchId(id))
    }

    fn clear_watch(&self, id: WatchId) {
        if let Some(geo) = geolocation() {
            geo.clear_watch(id.0);
        }
        self.closures.borrow_mut().remove(&id.0);
    }
}
