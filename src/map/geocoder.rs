//! Place search box attached to the map as a control.

use crate::error::Result;
use crate::map::mercator::{LngLat, MapView};
use crate::map::widget::MapControl;
use serde::Deserialize;
use std::sync::mpsc;
use tracing::{debug, warn};

const FORWARD_ENDPOINT: &str = "https://api.mapbox.com/search/geocode/v6/forward";
const RESULT_LIMIT: &str = "5";
const RESULT_ZOOM: f64 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub center: LngLat,
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Geometry,
    properties: Properties,
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: [f64; 2],
}

#[derive(Deserialize)]
struct Properties {
    name: Option<String>,
    full_address: Option<String>,
}

/// Parses a forward geocoding response into places.
pub fn parse_places(body: &str) -> Result<Vec<Place>> {
    let collection: FeatureCollection = serde_json::from_str(body)?;
    Ok(collection
        .features
        .into_iter()
        .map(|feature| {
            let [lng, lat] = feature.geometry.coordinates;
            let name = feature
                .properties
                .full_address
                .or(feature.properties.name)
                .unwrap_or_else(|| format!("{lat:.6}, {lng:.6}"));
            Place {
                name,
                center: LngLat { lng, lat },
            }
        })
        .collect())
}

fn search(query: &str, access_token: &str) -> Result<Vec<Place>> {
    let body = ureq::get(FORWARD_ENDPOINT)
        .query("q", query)
        .query("limit", RESULT_LIMIT)
        .query("access_token", access_token)
        .call()?
        .into_string()?;
    parse_places(&body)
}

pub struct Geocoder {
    access_token: String,
    query: String,
    results: Vec<Place>,
    in_flight: Option<mpsc::Receiver<Result<Vec<Place>>>>,
}

impl Geocoder {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            query: String::new(),
            results: Vec::new(),
            in_flight: None,
        }
    }

    fn start_search(&mut self, ctx: &egui::Context) {
        let query = self.query.trim().to_string();
        if query.is_empty() {
            return;
        }
        debug!(%query, "geocoding");

        let (tx, rx) = mpsc::channel();
        let token = self.access_token.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(search(&query, &token));
            ctx.request_repaint();
        });
        self.in_flight = Some(rx);
    }

    fn poll_search(&mut self) {
        let Some(rx) = &self.in_flight else { return };
        match rx.try_recv() {
            Ok(Ok(places)) => {
                self.results = places;
                self.in_flight = None;
            }
            Ok(Err(e)) => {
                warn!("geocoding failed: {e}");
                self.results.clear();
                self.in_flight = None;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => self.in_flight = None,
        }
    }
}

impl MapControl for Geocoder {
    fn show(&mut self, ui: &mut egui::Ui, view: &mut MapView) {
        self.poll_search();

        egui::Frame::popup(ui.style()).show(ui, |ui| {
            ui.set_max_width(280.0);
            ui.horizontal(|ui| {
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut self.query)
                        .hint_text("Search")
                        .desired_width(220.0),
                );
                let submitted =
                    edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("🔍").clicked() || submitted {
                    self.start_search(ui.ctx());
                }
                if self.in_flight.is_some() {
                    ui.spinner();
                }
            });

            let mut picked = None;
            for place in &self.results {
                if ui.selectable_label(false, &place.name).clicked() {
                    picked = Some(place.clone());
                }
            }
            if let Some(place) = picked {
                view.center = place.center;
                view.zoom = RESULT_ZOOM;
                self.query = place.name;
                self.results.clear();
            }
        });
    }
}
