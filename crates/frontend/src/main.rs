mod api;
mod components;
mod geolocation;
mod pages;

use dioxus::prelude::*;
use pages::tour::Tour;

const CSS: Asset = asset!("/assets/main.css");
const FAVICON: Asset = asset!("/assets/favicon.svg");

/// Deep links only preselect a POI card; every route renders the same tour.
#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
    #[route("/poi/:id")]
    PoiLink { id: String },
    #[route("/:..segments")]
    Unknown { segments: Vec<String> },
}

#[component]
fn Home() -> Element {
    rsx! { Tour { poi_id: None::<String> } }
}

#[component]
fn PoiLink(id: String) -> Element {
    rsx! { Tour { poi_id: Some(id) } }
}

#[component]
fn Unknown(segments: Vec<String>) -> Element {
    tracing::debug!(path = %segments.join("/"), "unknown route, showing the tour");
    rsx! { Tour { poi_id: None::<String> } }
}

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Title { "Village Tour" }
        document::Meta { name: "viewport", content: "width=device-width, initial-scale=1, maximum-scale=1" }
        document::Link { rel: "icon", r#type: "image/svg+xml", href: FAVICON }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}
