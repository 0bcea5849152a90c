use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use geotour_shared::models::ViewState;
use geotour_shared::projection;
use geotour_shared::render::{MapStyle, Scene, SurfaceEvent};
use geotour_shared::view;

const MAP_CONTAINER_ID: &str = "tour-map-container";

/// Mouse movement in pixels below which a press counts as a click.
const DRAG_THRESHOLD: f64 = 3.0;

/// Same for touch.
const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

/// Size used until the container has been measured.
const DEFAULT_SIZE: (f64, f64) = (800.0, 600.0);

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

/// Get the bounding client rect of the map container element.
fn container_rect() -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(MAP_CONTAINER_ID)?;
    Some(element.get_bounding_client_rect())
}

// ---------------------------------------------------------------------------
// Gesture math (pure functions, easily testable)
// ---------------------------------------------------------------------------

/// The view the surface shows: its own gesture result while that result is
/// based on the current core revision, otherwise the core's view.
fn displayed_view(local: Option<(u64, ViewState)>, scene: &Scene) -> ViewState {
    match local {
        Some((revision, view)) if revision == scene.view_revision => view,
        _ => scene.view,
    }
}

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// One zoom level per wheel notch.
fn wheel_zoom(zoom: u8, delta_y: f64) -> u8 {
    if delta_y < 0.0 {
        view::clamp_zoom(zoom.saturating_add(1))
    } else if delta_y > 0.0 {
        view::clamp_zoom(zoom.saturating_sub(1))
    } else {
        zoom
    }
}

/// Whole zoom levels gained by spreading two fingers by `scale`.
fn pinch_zoom(start_zoom: u8, scale: f64) -> u8 {
    if scale.is_nan() || scale <= 0.0 {
        return start_zoom;
    }
    let steps = scale.log2().round() as i32;
    let zoom = (start_zoom as i32 + steps).clamp(view::MIN_ZOOM as i32, view::MAX_ZOOM as i32);
    zoom as u8
}

/// Distance between two client-coordinate points.
fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Stable across pans so the browser keeps already loaded tile images.
fn tile_key(t: &projection::PlacedTile) -> String {
    format!("{}/{}/{}", t.tile.z, t.column, t.tile.y)
}

/// Topmost POI marker whose icon covers the screen point.
fn marker_at(
    scene: &Scene,
    view: &ViewState,
    size: (f64, f64),
    style: &MapStyle,
    sx: f64,
    sy: f64,
) -> Option<String> {
    let [w, h] = style.marker_icon_size;
    let [ax, ay] = style.marker_icon_anchor;
    scene
        .markers
        .iter()
        .rev()
        .find(|m| {
            let (mx, my) = projection::to_screen(view, size.0, size.1, m.coordinates);
            let left = mx - ax;
            let top = my - ay;
            sx >= left && sx <= left + w && sy >= top && sy <= top + h
        })
        .map(|m| m.poi_id.clone())
}

// ---------------------------------------------------------------------------
// SVG overlay
// ---------------------------------------------------------------------------

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn build_overlay_svg(scene: &Scene, view: &ViewState, size: (f64, f64), style: &MapStyle) -> String {
    let mut svg = String::with_capacity(4096);
    build_geofence_circles(&mut svg, scene, view, size);
    build_poi_markers(&mut svg, scene, view, size, style);
    build_user_marker(&mut svg, scene, view, size, style);
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" style="position:absolute;top:0;left:0;pointer-events:none;">{svg}</svg>"#,
        w = size.0,
        h = size.1,
    )
}

fn build_geofence_circles(svg: &mut String, scene: &Scene, view: &ViewState, size: (f64, f64)) {
    for c in &scene.circles {
        let (cx, cy) = projection::to_screen(view, size.0, size.1, c.center);
        let r = projection::meters_to_pixels(c.radius_m, c.center.latitude, view.zoom);
        let s = &c.style;
        svg.push_str(&format!(
            r#"<circle data-poi="{}" cx="{cx}" cy="{cy}" r="{r}" fill="{}" fill-opacity="{}" stroke="{}" stroke-width="{}"/>"#,
            escape_xml(&c.poi_id),
            s.fill,
            s.fill_opacity,
            s.stroke,
            s.stroke_width,
        ));
    }
}

fn build_poi_markers(
    svg: &mut String,
    scene: &Scene,
    view: &ViewState,
    size: (f64, f64),
    style: &MapStyle,
) {
    let [w, h] = style.marker_icon_size;
    let [ax, ay] = style.marker_icon_anchor;
    for m in &scene.markers {
        let (mx, my) = projection::to_screen(view, size.0, size.1, m.coordinates);
        let title = escape_xml(&m.title);
        svg.push_str(&format!(
            r#"<g role="img"><title>{title}</title><image href="{}" x="{}" y="{}" width="{w}" height="{h}"/></g>"#,
            escape_xml(&style.marker_icon_url),
            mx - ax,
            my - ay,
        ));
    }
}

fn build_user_marker(
    svg: &mut String,
    scene: &Scene,
    view: &ViewState,
    size: (f64, f64),
    style: &MapStyle,
) {
    let Some(user) = &scene.user else { return };
    let (ux, uy) = projection::to_screen(view, size.0, size.1, user.coordinates);
    let r = style.user_marker_radius;
    svg.push_str(&format!(
        r#"<g role="img"><title>{}</title><circle cx="{ux}" cy="{uy}" r="{r}" fill="{}" stroke="white" stroke-width="3"/></g>"#,
        escape_xml(user.label),
        style.user_marker_color,
    ));
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    start: (f64, f64),
    start_view: ViewState,
    moved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TouchGesture {
    Pan(Drag),
    Pinch {
        start_distance: f64,
        start_view: ViewState,
        /// Midpoint relative to the container.
        mid: (f64, f64),
    },
}

#[component]
pub fn MapView(scene: Scene, style: MapStyle, on_event: EventHandler<SurfaceEvent>) -> Element {
    let mut size = use_signal(|| DEFAULT_SIZE);
    // Gesture result paired with the core revision it was based on
    let mut local = use_signal(|| None::<(u64, ViewState)>);
    let mut drag = use_signal(|| None::<Drag>);
    let mut touch = use_signal(|| None::<TouchGesture>);
    let mut open_popup = use_signal(|| None::<String>);

    let current = displayed_view(*local.read(), &scene);
    let cur_size = *size.read();
    let revision = scene.view_revision;

    let svg_html = build_overlay_svg(&scene, &current, cur_size, &style);
    let tiles: Vec<(String, String, String)> =
        projection::visible_tiles(&current, cur_size.0, cur_size.1)
            .into_iter()
            .map(|t| {
                let key = tile_key(&t);
                let pos = format!("left:{}px;top:{}px;", t.left, t.top);
                (key, t.tile.url(&style.tile_url), pos)
            })
            .collect();

    let popup = open_popup.read().as_ref().and_then(|id| {
        let marker = scene.markers.iter().find(|m| &m.poi_id == id)?;
        let (px, py) = projection::to_screen(&current, cur_size.0, cur_size.1, marker.coordinates);
        let [ox, oy] = style.popup_anchor;
        let pos = format!("left:{}px;top:{}px;", px + ox, py + oy);
        let class = if marker.in_range {
            "map-popup unlocked"
        } else {
            "map-popup"
        };
        Some((pos, class, marker.title.clone(), marker.popup.clone()))
    });

    let container_class = if drag.read().is_some_and(|d| d.moved) {
        "map-container dragging"
    } else {
        "map-container"
    };

    let mut measure = move || {
        if let Some(rect) = container_rect() {
            size.set((rect.width(), rect.height()));
        }
    };

    // Tap/click resolution needs the scene the user saw
    let click_scene = scene.clone();
    let click_style = style.clone();
    let tap_scene = scene.clone();
    let tap_style = style.clone();
    let wheel_scene = scene.clone();
    let down_scene = scene.clone();
    let touch_scene = scene.clone();
    let leave_scene = scene.clone();

    let mut activate = move |hit: Option<String>| match hit {
        Some(poi_id) => {
            open_popup.set(Some(poi_id.clone()));
            on_event.call(SurfaceEvent::PoiActivated(poi_id));
        }
        None => open_popup.set(None),
    };

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",
            onmounted: move |_| measure(),
            onresize: move |_| measure(),

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let from = displayed_view(*local.read(), &wheel_scene);
                let new_zoom = wheel_zoom(from.zoom, wheel_delta_y(evt.data().delta()));
                if new_zoom == from.zoom {
                    return;
                }
                let Some(rect) = container_rect() else { return };
                let client = evt.data().client_coordinates();
                let to = projection::zoom_around(
                    &from,
                    rect.width(),
                    rect.height(),
                    client.x - rect.left(),
                    client.y - rect.top(),
                    new_zoom,
                );
                local.set(Some((revision, to)));
                on_event.call(SurfaceEvent::ViewMoved { center: to.center, zoom: Some(to.zoom) });
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                drag.set(Some(Drag {
                    start: (client.x, client.y),
                    start_view: displayed_view(*local.read(), &down_scene),
                    moved: false,
                }));
            },

            onmousemove: move |evt: Event<MouseData>| {
                let Some(mut d) = *drag.read() else { return };
                let client = evt.client_coordinates();
                let dx = client.x - d.start.0;
                let dy = client.y - d.start.1;
                if !d.moved && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                    d.moved = true;
                    drag.set(Some(d));
                }
                if d.moved {
                    let center = projection::pan_center(&d.start_view, dx, dy);
                    local.set(Some((revision, ViewState { center, zoom: d.start_view.zoom })));
                }
            },

            onmouseup: move |evt: Event<MouseData>| {
                let Some(d) = drag.take() else { return };
                let shown = displayed_view(*local.read(), &click_scene);
                if d.moved {
                    on_event.call(SurfaceEvent::ViewMoved { center: shown.center, zoom: None });
                    return;
                }
                let Some(rect) = container_rect() else { return };
                let client = evt.client_coordinates();
                let hit = marker_at(
                    &click_scene,
                    &shown,
                    (rect.width(), rect.height()),
                    &click_style,
                    client.x - rect.left(),
                    client.y - rect.top(),
                );
                activate(hit);
            },

            onmouseleave: move |_| {
                if let Some(d) = drag.take() {
                    if d.moved {
                        let shown = displayed_view(*local.read(), &leave_scene);
                        on_event.call(SurfaceEvent::ViewMoved { center: shown.center, zoom: None });
                    }
                }
            },

            // --- Touch event handlers ---

            ontouchstart: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();
                let start_view = displayed_view(*local.read(), &touch_scene);
                if touches.len() == 1 {
                    let c = touches[0].client_coordinates();
                    touch.set(Some(TouchGesture::Pan(Drag {
                        start: (c.x, c.y),
                        start_view,
                        moved: false,
                    })));
                } else if touches.len() >= 2 {
                    let Some(rect) = container_rect() else { return };
                    let c0 = touches[0].client_coordinates();
                    let c1 = touches[1].client_coordinates();
                    let p0 = (c0.x, c0.y);
                    let p1 = (c1.x, c1.y);
                    touch.set(Some(TouchGesture::Pinch {
                        start_distance: point_distance(p0, p1),
                        start_view,
                        mid: ((p0.0 + p1.0) / 2.0 - rect.left(), (p0.1 + p1.1) / 2.0 - rect.top()),
                    }));
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();
                let Some(gesture) = *touch.read() else { return };
                match gesture {
                    TouchGesture::Pinch { start_distance, start_view, mid } if touches.len() >= 2 => {
                        if start_distance < 1.0 {
                            return;
                        }
                        let c0 = touches[0].client_coordinates();
                        let c1 = touches[1].client_coordinates();
                        let scale = point_distance((c0.x, c0.y), (c1.x, c1.y)) / start_distance;
                        let zoom = pinch_zoom(start_view.zoom, scale);
                        let (w, h) = *size.read();
                        let to = projection::zoom_around(&start_view, w, h, mid.0, mid.1, zoom);
                        local.set(Some((revision, to)));
                    }
                    TouchGesture::Pan(mut d) if touches.len() == 1 => {
                        let c = touches[0].client_coordinates();
                        let cur = (c.x, c.y);
                        if !d.moved && point_distance(d.start, cur) > TOUCH_DRAG_THRESHOLD {
                            d.moved = true;
                            touch.set(Some(TouchGesture::Pan(d)));
                        }
                        if d.moved {
                            let center =
                                projection::pan_center(&d.start_view, cur.0 - d.start.0, cur.1 - d.start.1);
                            local.set(Some((revision, ViewState { center, zoom: d.start_view.zoom })));
                        }
                    }
                    _ => {}
                }
            },

            ontouchend: move |evt: Event<TouchData>| {
                // Wait for all fingers to lift
                if !evt.data().touches().is_empty() {
                    return;
                }
                let Some(gesture) = touch.take() else { return };
                let shown = displayed_view(*local.read(), &tap_scene);
                match gesture {
                    TouchGesture::Pinch { .. } => {
                        on_event.call(SurfaceEvent::ViewMoved {
                            center: shown.center,
                            zoom: Some(shown.zoom),
                        });
                    }
                    TouchGesture::Pan(d) if d.moved => {
                        on_event.call(SurfaceEvent::ViewMoved { center: shown.center, zoom: None });
                    }
                    TouchGesture::Pan(d) => {
                        let Some(rect) = container_rect() else { return };
                        let hit = marker_at(
                            &tap_scene,
                            &shown,
                            (rect.width(), rect.height()),
                            &tap_style,
                            d.start.0 - rect.left(),
                            d.start.1 - rect.top(),
                        );
                        activate(hit);
                    }
                }
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                touch.set(None);
            },

            div { class: "map-tiles",
                for (key, src, pos) in tiles {
                    img {
                        key: "{key}",
                        class: "map-tile",
                        src: "{src}",
                        draggable: "false",
                        style: "{pos}",
                    }
                }
            }

            div {
                class: "map-overlay",
                dangerous_inner_html: "{svg_html}",
            }

            if let Some((pos, class, title, text)) = popup {
                div { class: "{class}", style: "{pos}",
                    strong { "{title}" }
                    p { "{text}" }
                }
            }

            div { class: "map-attribution", "{style.attribution}" }
        }
    }
}
