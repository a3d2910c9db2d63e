//! Map viewport control.
//!
//! [`MapViewportController`] is the only thing that moves the map. It sends
//! discrete [`ViewportCommand`]s to a [`MapSurface`] and derives the marker
//! set from its own state plus the [`SelectionStore`]. [`TerminalMap`] is the
//! surface drawn by the UI: it animates between viewports over the command's
//! duration, advanced on each tick.

use crate::config::MapConfig;
use crate::models::{LatLng, Location, ViewportCommand};
use crate::store::SelectionStore;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const LIVE_POSITION_LABEL: &str = "You are here";

/// Something the controller can pan and zoom.
pub trait MapSurface {
    fn fly_to(&mut self, command: ViewportCommand);
    fn center(&self) -> LatLng;
    fn zoom(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// The device's live position.
    LivePosition,
    /// The selected location, or the default place before any selection.
    Selected,
    /// The highlighted search candidate, before it is committed.
    Preview,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: LatLng,
    pub label: String,
}

/// Where the live-position lookup stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeolocationStatus {
    Pending,
    Found,
    Unavailable(String),
}

pub struct MapViewportController<S: MapSurface> {
    surface: S,
    store: SelectionStore,
    default_center: LatLng,
    default_label: String,
    recenter_duration: Duration,
    live_position: Option<LatLng>,
    recentered: bool,
    geolocation: GeolocationStatus,
    preview: Option<Location>,
}

impl<S: MapSurface> MapViewportController<S> {
    pub fn new(surface: S, store: SelectionStore, config: &MapConfig) -> Self {
        Self {
            surface,
            store,
            default_center: config.default_center(),
            default_label: config.default_label.clone(),
            recenter_duration: config.recenter_duration(),
            live_position: None,
            recentered: false,
            geolocation: GeolocationStatus::Pending,
            preview: None,
        }
    }

    pub fn fly_to(&mut self, target: LatLng, zoom: f64, duration: Duration) {
        debug!(
            "flyTo [{:.5}, {:.5}] zoom {} over {:?}",
            target.lat, target.lng, zoom, duration
        );
        self.surface.fly_to(ViewportCommand {
            target,
            zoom,
            duration,
        });
    }

    /// Records the live position. The first fix also becomes the selected
    /// location and recenters the map; later fixes only move the marker.
    pub fn on_location_found(&mut self, position: LatLng) {
        self.live_position = Some(position);
        self.geolocation = GeolocationStatus::Found;

        if !self.recentered {
            self.recentered = true;
            info!("Live position found at ({}, {})", position.lat, position.lng);
            self.store
                .update(Location::new(position.lng, position.lat, LIVE_POSITION_LABEL));
            let zoom = self.surface.zoom();
            self.fly_to(position, zoom, self.recenter_duration);
        }
    }

    pub fn on_location_error(&mut self, reason: &str) {
        warn!("Live position unavailable: {}", reason);
        self.geolocation = GeolocationStatus::Unavailable(reason.to_string());
    }

    pub fn set_preview(&mut self, candidate: Option<Location>) {
        self.preview = candidate;
    }

    pub fn live_position(&self) -> Option<LatLng> {
        self.live_position
    }

    pub fn geolocation(&self) -> &GeolocationStatus {
        &self.geolocation
    }

    /// Current marker set, live position first.
    pub fn markers(&self) -> Vec<Marker> {
        let mut markers = Vec::with_capacity(3);

        if let Some(position) = self.live_position {
            markers.push(Marker {
                kind: MarkerKind::LivePosition,
                position,
                label: LIVE_POSITION_LABEL.to_string(),
            });
        }

        let selected = self
            .store
            .get()
            .and_then(|loc| loc.coordinates().ok().map(|p| (p, loc.label)));
        let (position, label) =
            selected.unwrap_or_else(|| (self.default_center, self.default_label.clone()));
        markers.push(Marker {
            kind: MarkerKind::Selected,
            position,
            label,
        });

        if let Some(preview) = &self.preview {
            if let Ok(position) = preview.coordinates() {
                markers.push(Marker {
                    kind: MarkerKind::Preview,
                    position,
                    label: preview.label.clone(),
                });
            }
        }

        markers
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

struct Flight {
    from: LatLng,
    to: LatLng,
    from_zoom: f64,
    to_zoom: f64,
    started: Instant,
    duration: Duration,
}

/// The map drawn on the terminal canvas.
pub struct TerminalMap {
    center: LatLng,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    flight: Option<Flight>,
}

impl TerminalMap {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            center: config.default_center(),
            zoom: config.default_zoom.clamp(config.min_zoom, config.max_zoom),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            flight: None,
        }
    }

    pub fn fly_to_at(&mut self, command: ViewportCommand, now: Instant) {
        let to_zoom = command.zoom.clamp(self.min_zoom, self.max_zoom);
        if command.duration.is_zero() {
            self.center = command.target;
            self.zoom = to_zoom;
            self.flight = None;
            return;
        }
        self.flight = Some(Flight {
            from: self.center,
            to: command.target,
            from_zoom: self.zoom,
            to_zoom,
            started: now,
            duration: command.duration,
        });
    }

    /// Moves an in-progress flight forward to `now`.
    pub fn advance(&mut self, now: Instant) {
        let Some(flight) = &self.flight else {
            return;
        };

        let elapsed = now.saturating_duration_since(flight.started);
        let t = (elapsed.as_secs_f64() / flight.duration.as_secs_f64()).min(1.0);
        let eased = ease_in_out(t);

        self.center = LatLng::new(
            lerp(flight.from.lat, flight.to.lat, eased),
            lerp(flight.from.lng, flight.to.lng, eased),
        );
        self.zoom = lerp(flight.from_zoom, flight.to_zoom, eased);

        if t >= 1.0 {
            self.center = flight.to;
            self.zoom = flight.to_zoom;
            self.flight = None;
        }
    }

    pub fn is_animating(&self) -> bool {
        self.flight.is_some()
    }

    /// Manual zoom; interrupts any flight in progress.
    pub fn zoom_by(&mut self, delta: f64) {
        self.flight = None;
        self.zoom = (self.zoom.round() + delta).clamp(self.min_zoom, self.max_zoom);
    }

    /// Degrees of latitude from the center to the top edge.
    ///
    /// Web-map zoom 14 is a few streets wide, far below a terminal cell, so
    /// the canvas shows 256 times more than the nominal tile span.
    pub fn half_span(&self) -> f64 {
        180.0 / 2f64.powf(self.zoom - 6.0)
    }

    /// `(x_bounds, y_bounds)` for the canvas; longitude span is doubled to
    /// roughly correct for terminal cells being twice as tall as wide.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let h = self.half_span();
        (
            [self.center.lng - 2.0 * h, self.center.lng + 2.0 * h],
            [self.center.lat - h, self.center.lat + h],
        )
    }
}

impl MapSurface for TerminalMap {
    fn fly_to(&mut self, command: ViewportCommand) {
        self.fly_to_at(command, Instant::now());
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Surface that remembers every command it was given.
    #[derive(Default)]
    pub(crate) struct RecordingSurface {
        pub commands: Vec<ViewportCommand>,
        pub zoom: f64,
    }

    impl MapSurface for RecordingSurface {
        fn fly_to(&mut self, command: ViewportCommand) {
            self.zoom = command.zoom;
            self.commands.push(command);
        }

        fn center(&self) -> LatLng {
            self.commands
                .last()
                .map(|c| c.target)
                .unwrap_or(LatLng::new(0.0, 0.0))
        }

        fn zoom(&self) -> f64 {
            self.zoom
        }
    }

    fn controller() -> MapViewportController<RecordingSurface> {
        let surface = RecordingSurface {
            zoom: 12.0,
            ..Default::default()
        };
        MapViewportController::new(surface, SelectionStore::new(), &MapConfig::default())
    }

    #[test]
    fn first_fix_recenters_once_at_current_zoom() {
        let mut map = controller();

        map.on_location_found(LatLng::new(1.30, 103.80));
        map.on_location_found(LatLng::new(1.31, 103.81));

        let commands = &map.surface().commands;
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].target, LatLng::new(1.30, 103.80));
        assert_eq!(commands[0].zoom, 12.0);
        assert_eq!(map.live_position(), Some(LatLng::new(1.31, 103.81)));
    }

    #[test]
    fn first_fix_becomes_the_selection() {
        let store = SelectionStore::new();
        let mut map = MapViewportController::new(
            RecordingSurface::default(),
            store.clone(),
            &MapConfig::default(),
        );

        map.on_location_found(LatLng::new(1.30, 103.80));
        assert_eq!(store.get(), Some(Location::new(103.80, 1.30, "You are here")));

        // A later pick wins; a later fix does not take the selection back.
        store.update(Location::new(103.852, 1.293, "City Hall"));
        map.on_location_found(LatLng::new(1.31, 103.81));
        assert_eq!(store.get().map(|l| l.label), Some("City Hall".to_string()));

        let selected = map
            .markers()
            .into_iter()
            .find(|m| m.kind == MarkerKind::Selected)
            .unwrap();
        assert_eq!(selected.position, LatLng::new(1.293, 103.852));
    }

    #[test]
    fn geolocation_error_leaves_live_marker_absent() {
        let mut map = controller();
        map.on_location_error("User denied geolocation");

        assert!(map.surface().commands.is_empty());
        assert!(matches!(map.geolocation(), GeolocationStatus::Unavailable(_)));
        assert!(map
            .markers()
            .iter()
            .all(|m| m.kind != MarkerKind::LivePosition));
    }

    #[test]
    fn selected_marker_falls_back_to_default() {
        let map = controller();
        let markers = map.markers();
        let defaults = MapConfig::default();

        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].kind, MarkerKind::Selected);
        assert_eq!(markers[0].position, defaults.default_center());
        assert_eq!(markers[0].label, defaults.default_label);
    }

    #[test]
    fn markers_follow_store_and_preview() {
        let store = SelectionStore::new();
        let mut map = MapViewportController::new(
            RecordingSurface::default(),
            store.clone(),
            &MapConfig::default(),
        );
        map.on_location_found(LatLng::new(1.30, 103.80));
        store.update(Location::new(103.852, 1.293, "City Hall"));
        map.set_preview(Some(Location::new(103.851, 1.285, "Maybank")));

        let markers = map.markers();
        let kinds: Vec<MarkerKind> = markers.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![MarkerKind::LivePosition, MarkerKind::Selected, MarkerKind::Preview]
        );
        assert_eq!(markers[1].label, "City Hall");
        assert_eq!(markers[1].position, LatLng::new(1.293, 103.852));

        // A preview without coordinates is simply not drawn.
        map.set_preview(Some(Location::from(serde_json::json!({ "display_name": "?" }))));
        assert_eq!(map.markers().len(), 2);
    }

    #[test]
    fn terminal_map_animates_and_settles() {
        let config = MapConfig::default();
        let mut map = TerminalMap::new(&config);
        let start = Instant::now();
        let target = LatLng::new(1.35, 103.90);

        map.fly_to_at(
            ViewportCommand {
                target,
                zoom: 10.0,
                duration: Duration::from_millis(2000),
            },
            start,
        );
        assert!(map.is_animating());

        map.advance(start + Duration::from_millis(1000));
        let mid = map.center();
        assert!(mid.lat > config.default_lat && mid.lat < target.lat);
        assert!(map.zoom() < 14.0 && map.zoom() > 10.0);

        map.advance(start + Duration::from_millis(2500));
        assert!(!map.is_animating());
        assert_eq!(map.center(), target);
        assert_eq!(map.zoom(), 10.0);
    }

    #[test]
    fn terminal_map_clamps_zoom() {
        let mut map = TerminalMap::new(&MapConfig::default());
        map.fly_to_at(
            ViewportCommand {
                target: LatLng::new(0.0, 0.0),
                zoom: 18.0,
                duration: Duration::ZERO,
            },
            Instant::now(),
        );
        assert_eq!(map.zoom(), 14.0);

        map.zoom_by(-20.0);
        assert_eq!(map.zoom(), 3.0);
    }
}
