use dioxus::prelude::*;
use geotour_shared::i18n;
use geotour_shared::models::{Locale, LocationError};

#[component]
pub fn ErrorBanner(error: Option<LocationError>, locale: Locale, on_dismiss: EventHandler<()>) -> Element {
    let Some(error) = error else {
        return rsx! {};
    };
    let message = i18n::location_error(error, locale);

    rsx! {
        div { class: "error-banner", role: "alert",
            span { "{message}" }
            button {
                class: "secondary",
                "aria-label": i18n::close(locale),
                onclick: move |_| on_dismiss.call(()),
                "×"
            }
        }
    }
}
