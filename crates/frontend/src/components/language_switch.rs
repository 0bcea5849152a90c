use dioxus::prelude::*;
use geotour_shared::models::Locale;

const STORAGE_KEY: &str = "geotour.locale";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Locale from the last visit, else the browser language, else English.
pub fn initial_locale() -> Locale {
    let stored = local_storage().and_then(|s| s.get_item(STORAGE_KEY).ok().flatten());
    let browser = web_sys::window().and_then(|w| w.navigator().language());
    stored
        .or(browser)
        .and_then(|tag| Locale::parse(&tag))
        .unwrap_or_default()
}

fn remember(locale: Locale) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(STORAGE_KEY, locale.code());
    }
}

#[component]
pub fn LanguageSwitch(locale: Signal<Locale>) -> Element {
    let current = *locale.read();
    let next = current.toggled();
    let label = next.code().to_uppercase();

    rsx! {
        button {
            class: "language-switch",
            lang: next.code(),
            title: "{label}",
            onclick: move |_| {
                locale.set(next);
                remember(next);
            },
            "{label}"
        }
    }
}
