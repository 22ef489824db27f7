//! Raster tile fetching on background workers.

use crate::error::Result;
use crate::map::mercator::TileId;
use image::RgbaImage;
use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct TileRequest {
    pub id: TileId,
    /// Tile endpoint without the credential.
    pub url: String,
    pub generation: u64,
}

pub struct TileResponse {
    pub id: TileId,
    pub generation: u64,
    pub result: Result<RgbaImage>,
}

/// Where the map widget gets its tile pixels from.
pub trait TileSource {
    fn request(&self, request: TileRequest);

    /// Next finished request, if any. Never blocks.
    fn poll(&self) -> Option<TileResponse>;

    /// Marks requests of older generations as stale.
    fn set_generation(&self, generation: u64);
}

/// Worker pool downloading tiles over HTTP.
pub struct TileFetcher {
    request_tx: mpsc::Sender<TileRequest>,
    response_rx: mpsc::Receiver<TileResponse>,
    generation: Arc<AtomicU64>,
}

impl TileFetcher {
    pub fn spawn(workers: usize, access_token: String, repaint: egui::Context) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<TileRequest>();
        let (response_tx, response_rx) = mpsc::channel::<TileResponse>();
        let request_rx = Arc::new(Mutex::new(request_rx));
        let generation = Arc::new(AtomicU64::new(0));

        for _ in 0..workers.max(1) {
            let rx = request_rx.clone();
            let tx = response_tx.clone();
            let current = generation.clone();
            let token = access_token.clone();
            let repaint = repaint.clone();

            std::thread::spawn(move || {
                loop {
                    let msg = match rx.lock() {
                        Ok(lock) => lock.recv(),
                        Err(_) => break,
                    };
                    let Ok(request) = msg else { break };

                    // Стиль сменился, пока запрос ждал в очереди
                    if current.load(Ordering::Relaxed) != request.generation {
                        continue;
                    }

                    let result = fetch_tile(&request.url, &token);
                    if let Err(e) = &result {
                        warn!(tile = ?request.id, "tile fetch failed: {e}");
                    }
                    let response = TileResponse {
                        id: request.id,
                        generation: request.generation,
                        result,
                    };
                    if tx.send(response).is_err() {
                        break;
                    }
                    repaint.request_repaint();
                }
            });
        }

        Self {
            request_tx,
            response_rx,
            generation,
        }
    }
}

impl TileSource for TileFetcher {
    fn request(&self, request: TileRequest) {
        debug!(tile = ?request.id, "requesting tile");
        // Workers only exit once this sender is gone.
        let _ = self.request_tx.send(request);
    }

    fn poll(&self) -> Option<TileResponse> {
        self.response_rx.try_recv().ok()
    }

    fn set_generation(&self, generation: u64) {
        self.generation.store(generation, Ordering::Relaxed);
    }
}

fn fetch_tile(url: &str, access_token: &str) -> Result<RgbaImage> {
    let response = ureq::get(url).query("access_token", access_token).call()?;

    let mut bytes = Vec::new();
    response.into_reader().read_to_end(&mut bytes)?;

    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::AppError;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Answers requests from memory when `deliver` is called.
    #[derive(Default)]
    pub struct FakeTileSource {
        pub requests: RefCell<Vec<TileRequest>>,
        queued: RefCell<VecDeque<TileRequest>>,
        ready: RefCell<VecDeque<TileResponse>>,
        pub generation: Cell<u64>,
        /// Tiles in this row come back as errors.
        pub failing_row: Cell<Option<u32>>,
    }

    impl FakeTileSource {
        /// Completes every queued request with a solid tile colored by its column.
        pub fn deliver(&self) {
            while let Some(request) = self.queued.borrow_mut().pop_front() {
                let result = if self.failing_row.get() == Some(request.id.y) {
                    Err(AppError::Http {
                        url: request.url.clone(),
                        reason: "status code 404".to_string(),
                    })
                } else {
                    let shade = (request.id.x % 256) as u8;
                    Ok(RgbaImage::from_pixel(256, 256, image::Rgba([shade, 0, 0, 255])))
                };
                self.ready.borrow_mut().push_back(TileResponse {
                    id: request.id,
                    generation: request.generation,
                    result,
                });
            }
        }
    }

    impl TileSource for FakeTileSource {
        fn request(&self, request: TileRequest) {
            self.requests.borrow_mut().push(request.clone());
            self.queued.borrow_mut().push_back(request);
        }

        fn poll(&self) -> Option<TileResponse> {
            self.ready.borrow_mut().pop_front()
        }

        fn set_generation(&self, generation: u64) {
            self.generation.set(generation);
        }
    }
}
