use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use geotour_shared::i18n;
use geotour_shared::models::Locale;
use geotour_shared::render::{self, MapStyle, SurfaceEvent};
use geotour_shared::session::{track, PoiActivation, SessionCell, TourSession};
use geotour_shared::tracker::{LocationTracker, WatchOptions};

use crate::api;
use crate::components::error_banner::ErrorBanner;
use crate::components::language_switch::{initial_locale, LanguageSwitch};
use crate::components::map_view::MapView;
use crate::components::quiz_dialog::{QuizPanel, QuizState};
use crate::components::recenter_button::RecenterButton;
use crate::geolocation::BrowserGeolocation;

/// Tracker callbacks write through the page's signal.
#[derive(Clone, Copy)]
struct SignalSession(Signal<TourSession>);

impl SessionCell for SignalSession {
    fn update(&self, f: impl FnOnce(&mut TourSession)) {
        let mut signal = self.0;
        f(&mut signal.write());
    }
}

/// Detail card for the selected POI.
#[derive(Debug, Clone, PartialEq)]
struct PoiCard {
    poi_id: String,
    name: String,
    description: String,
    status: String,
    unlocked: bool,
}

fn poi_card(session: &TourSession, poi_id: &str, locale: Locale) -> Option<PoiCard> {
    let poi = session.poi(poi_id)?;
    let unlocked = session.proximity().is_in_range(poi_id);
    let status = if unlocked {
        i18n::popup_unlocked(locale).to_string()
    } else {
        i18n::popup_locked(session.distance_to(poi), locale)
    };
    Some(PoiCard {
        poi_id: poi.id.clone(),
        name: poi.name.get(locale).to_string(),
        description: poi.description.get(locale).to_string(),
        status,
        unlocked,
    })
}

#[component]
pub fn Tour(poi_id: Option<String>) -> Element {
    let pois_resource = use_resource(|| api::fetch_pois());

    let mut session = use_signal(|| TourSession::new(Vec::new()));
    let locale = use_signal(initial_locale);
    let mut selected = use_signal(|| poi_id.clone());
    let mut quiz = use_signal(|| None::<QuizState>);
    let style = use_hook(MapStyle::default);

    let tracker = use_hook(|| Rc::new(RefCell::new(LocationTracker::new(BrowserGeolocation::new()))));

    // Start watching once the page is mounted
    use_effect({
        let tracker = tracker.clone();
        move || {
            let mut tracker = tracker.borrow_mut();
            track(&mut *tracker, &SignalSession(session), WatchOptions::default());
        }
    });

    use_drop({
        let tracker = tracker.clone();
        move || tracker.borrow_mut().stop_active()
    });

    // Feed fetched POIs into the session
    use_effect(move || {
        if let Some(Ok(pois)) = &*pois_resource.read() {
            session.write().set_pois(pois.clone());
        }
    });

    let mut open_quiz = move |poi_id: String| {
        quiz.set(Some(QuizState::Loading {
            poi_id: poi_id.clone(),
        }));
        spawn(async move {
            let state = match api::fetch_quiz(&poi_id).await {
                Ok(Some(set)) => QuizState::Ready(set),
                Ok(None) => QuizState::Missing {
                    poi_id: poi_id.clone(),
                },
                Err(e) => QuizState::Failed(e),
            };
            // The dialog may have been closed or switched meanwhile
            let still_wanted = quiz.read().as_ref().is_some_and(|q| q.is_loading(&poi_id));
            if still_wanted {
                quiz.set(Some(state));
            }
        });
    };

    let cur_locale = *locale.read();
    let load_error = match &*pois_resource.read() {
        Some(Err(e)) => Some(e.clone()),
        _ => None,
    };

    let s = session.read();
    let scene = render::build_scene(&s, &style, cur_locale);
    let error = s.error();
    let recenter_enabled = s.recenter_enabled();
    let view_writer = s.view_writer();
    let card = selected
        .read()
        .as_deref()
        .and_then(|id| poi_card(&s, id, cur_locale));
    let quiz_name = quiz
        .read()
        .as_ref()
        .and_then(|q| q.poi_id())
        .and_then(|id| s.poi(id))
        .map(|poi| poi.name.get(cur_locale).to_string())
        .unwrap_or_default();
    drop(s);

    let quiz_state = quiz.read().clone().map(|state| {
        let key = state.poi_id().unwrap_or_default().to_string();
        (state, key)
    });

    let title = i18n::app_title(cur_locale);
    let start_label = i18n::start_quiz(cur_locale);
    let close_label = i18n::close(cur_locale);

    rsx! {
        div { class: "app", lang: cur_locale.code(),
            div { class: "header",
                h1 { "{title}" }
                LanguageSwitch { locale }
            }

            ErrorBanner {
                error,
                locale: cur_locale,
                on_dismiss: move |_| session.write().dismiss_error(),
            }

            if let Some(message) = load_error {
                div { class: "error-banner", role: "alert", "{message}" }
            }

            div { class: "map-area",
                MapView {
                    scene,
                    style: style.clone(),
                    on_event: move |event: SurfaceEvent| {
                        if let SurfaceEvent::PoiActivated(id) = &event {
                            selected.set(Some(id.clone()));
                        }
                        let activation = session.write().handle_surface_event(event);
                        if let Some(PoiActivation::QuizUnlocked { poi_id }) = activation {
                            open_quiz(poi_id);
                        }
                    },
                }

                RecenterButton {
                    enabled: recenter_enabled,
                    writer: view_writer,
                    locale: cur_locale,
                    on_recenter: move |_| {
                        if let Err(err) = session.write().recenter() {
                            tracing::debug!(%err, "recenter ignored");
                        }
                    },
                }
            }

            if let Some(card) = card {
                div { class: "poi-card",
                    div { class: "poi-card-header",
                        h2 { "{card.name}" }
                        button {
                            class: "secondary",
                            "aria-label": "{close_label}",
                            onclick: move |_| selected.set(None),
                            "×"
                        }
                    }
                    if !card.description.is_empty() {
                        p { "{card.description}" }
                    }
                    p { class: if card.unlocked { "poi-status unlocked" } else { "poi-status" }, "{card.status}" }
                    if card.unlocked {
                        button {
                            onclick: {
                                let poi_id = card.poi_id.clone();
                                move |_| open_quiz(poi_id.clone())
                            },
                            "{start_label}"
                        }
                    }
                }
            }

            if let Some((state, key)) = quiz_state {
                QuizPanel {
                    key: "{key}",
                    state,
                    poi_name: quiz_name,
                    locale: cur_locale,
                    on_close: move |_| quiz.set(None),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotour_shared::models::{GeoCoordinate, LocalizedText, Poi, Position};
    use geotour_shared::tracker::LocationUpdate;

    fn session() -> TourSession {
        TourSession::new(vec![Poi {
            id: "church".to_string(),
            coordinates: GeoCoordinate::new(52.14, 12.593),
            geofence_radius: 50.0,
            name: LocalizedText::new("Village church", "Dorfkirche"),
            description: LocalizedText::new("Old.", "Alt."),
        }])
    }

    fn fix(session: &mut TourSession, latitude: f64, longitude: f64) {
        session.apply_update(LocationUpdate {
            position: Position {
                coordinates: GeoCoordinate::new(latitude, longitude),
                timestamp_ms: 0.0,
            },
            first_fix: true,
        });
    }

    #[test]
    fn test_card_for_unknown_poi() {
        assert!(poi_card(&session(), "castle", Locale::En).is_none());
    }

    #[test]
    fn test_card_locked_without_fix() {
        let card = poi_card(&session(), "church", Locale::De).unwrap();
        assert_eq!(card.name, "Dorfkirche");
        assert_eq!(card.description, "Alt.");
        assert!(!card.unlocked);
        assert_eq!(card.status, i18n::popup_locked(None, Locale::De));
    }

    #[test]
    fn test_card_unlocked_in_range() {
        let mut s = session();
        fix(&mut s, 52.1401, 12.593);
        let card = poi_card(&s, "church", Locale::En).unwrap();
        assert!(card.unlocked);
        assert_eq!(card.status, i18n::popup_unlocked(Locale::En));
    }

    #[test]
    fn test_card_locked_shows_distance() {
        let mut s = session();
        fix(&mut s, 52.15, 12.593);
        let card = poi_card(&s, "church", Locale::En).unwrap();
        assert!(!card.unlocked);
        assert!(card.status.contains("km away") || card.status.contains("m away"));
    }
}
