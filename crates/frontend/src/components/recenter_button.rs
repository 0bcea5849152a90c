use dioxus::prelude::*;
use geotour_shared::i18n;
use geotour_shared::models::Locale;
use geotour_shared::view::ViewWriter;

/// Highlighted while the map shows a view the visitor navigated to.
fn button_class(writer: ViewWriter) -> &'static str {
    match writer {
        ViewWriter::UserSet => "recenter-button detached",
        ViewWriter::Uninitialized | ViewWriter::SystemSet => "recenter-button",
    }
}

/// Disabled until the first fix has arrived.
#[component]
pub fn RecenterButton(
    enabled: bool,
    writer: ViewWriter,
    locale: Locale,
    on_recenter: EventHandler<()>,
) -> Element {
    let label = i18n::recenter_label(locale);
    let title = if enabled {
        label
    } else {
        i18n::waiting_for_fix(locale)
    };
    let class = button_class(writer);

    rsx! {
        button {
            class: "{class}",
            "aria-label": "{label}",
            title: "{title}",
            disabled: !enabled,
            onclick: move |_| on_recenter.call(()),
            "◎ {label}"
        }
    }
}
