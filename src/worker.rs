// ============================================================================
// COMPOSITOR WORKER — pixel pipeline behind a message-passing boundary
// ============================================================================
//
// The pipeline itself is synchronous pure functions; this module runs them on
// a dedicated thread so hosts can keep their own event loop responsive.
// Requests and responses are typed enums, and pixel buffers move through the
// channels by ownership transfer — nothing is cloned across the boundary, and
// the sender must not touch a buffer after sending it.
//
// A request runs to completion; there is no mid-operation cancellation. Any
// stage failure is translated into a single `WorkerResponse::Error` — no
// retry, no partial result.
// ============================================================================

use std::sync::mpsc::{self, Receiver, RecvError, SendError, Sender};
use std::thread::{self, JoinHandle};

use crate::log_err;
use crate::ops::adjustments::{Adjustments, apply_adjustments};
use crate::ops::compositor::{CompositeOptions, composite_images, invert_mask, mask_from_image};
use crate::ops::patterns::generate_pattern_mask;
use crate::raster::Raster;

/// Where a mask comes from.
#[derive(Clone, Debug)]
pub enum MaskSource {
    /// Procedural pattern by id, with a density scale (100 = reference).
    Pattern { id: String, scale: f64 },
    /// Uploaded image, binarized at the threshold.
    Upload { image: Raster, threshold: u8 },
}

/// Request to produce a mask raster.
#[derive(Clone, Debug)]
pub struct MaskRequest {
    pub width: u32,
    pub height: u32,
    pub source: MaskSource,
    pub invert: bool,
}

/// Request to run the full composite chain: per-source adjustments, then
/// mask-driven blending.
#[derive(Clone, Debug)]
pub struct CompositeRequest {
    pub source1: Raster,
    pub source2: Raster,
    pub mask: Raster,
    pub adjustments1: Adjustments,
    pub adjustments2: Adjustments,
    pub options: CompositeOptions,
}

#[derive(Clone, Debug)]
pub enum WorkerRequest {
    GenerateMask(MaskRequest),
    Composite(CompositeRequest),
}

#[derive(Clone, Debug)]
pub enum WorkerResponse {
    MaskGenerated { mask: Raster },
    CompositeComplete { result: Raster },
    Error(String),
}

// ============================================================================
// Pure handlers — callable directly for synchronous use and tests
// ============================================================================

/// Build a mask from a pattern or an uploaded image, then apply the optional
/// invert step.
pub fn generate_mask(request: MaskRequest) -> Result<Raster, String> {
    let mask = match request.source {
        MaskSource::Pattern { ref id, scale } => {
            generate_pattern_mask(id, request.width, request.height, scale)
                .ok_or_else(|| format!("failed to generate pattern mask '{}'", id))?
        }
        MaskSource::Upload { image, threshold } => {
            if image.dimensions() != (request.width, request.height) {
                return Err(format!(
                    "mask image is {}x{} but {}x{} was requested",
                    image.width(), image.height(), request.width, request.height
                ));
            }
            mask_from_image(&image, threshold)
        }
    };

    Ok(if request.invert { invert_mask(&mask) } else { mask })
}

/// Adjust both sources, then composite them through the mask.
pub fn run_composite(request: CompositeRequest) -> Result<Raster, String> {
    let adjusted1 = apply_adjustments(&request.source1, &request.adjustments1);
    let adjusted2 = apply_adjustments(&request.source2, &request.adjustments2);

    composite_images(&adjusted1, &adjusted2, &request.mask, &request.options)
        .map_err(|e| e.to_string())
}

fn handle(request: WorkerRequest) -> WorkerResponse {
    let result = match request {
        WorkerRequest::GenerateMask(req) => {
            generate_mask(req).map(|mask| WorkerResponse::MaskGenerated { mask })
        }
        WorkerRequest::Composite(req) => {
            run_composite(req).map(|result| WorkerResponse::CompositeComplete { result })
        }
    };

    result.unwrap_or_else(|e| {
        log_err!("[worker] {}", e);
        WorkerResponse::Error(e)
    })
}

// ============================================================================
// Worker thread
// ============================================================================

/// Handle to a running compositor worker thread.
///
/// Dropping the handle closes the request channel; the thread drains and
/// exits. Requests are answered strictly in order, one response per request.
pub struct CompositorWorker {
    tx: Sender<WorkerRequest>,
    rx: Receiver<WorkerResponse>,
    handle: Option<JoinHandle<()>>,
}

impl CompositorWorker {
    /// Spawn the worker thread.
    pub fn spawn() -> Self {
        let (req_tx, req_rx) = mpsc::channel::<WorkerRequest>();
        let (resp_tx, resp_rx) = mpsc::channel::<WorkerResponse>();

        let handle = thread::spawn(move || {
            while let Ok(request) = req_rx.recv() {
                if resp_tx.send(handle(request)).is_err() {
                    // Receiver dropped — host is shutting down
                    break;
                }
            }
        });

        Self { tx: req_tx, rx: resp_rx, handle: Some(handle) }
    }

    /// Queue a request without waiting for the response.
    pub fn send(&self, request: WorkerRequest) -> Result<(), SendError<WorkerRequest>> {
        self.tx.send(request)
    }

    /// Block until the next response arrives.
    pub fn recv(&self) -> Result<WorkerResponse, RecvError> {
        self.rx.recv()
    }

    /// Send a request and block for its response.
    pub fn request(&self, request: WorkerRequest) -> Result<WorkerResponse, String> {
        self.send(request).map_err(|e| e.to_string())?;
        self.recv().map_err(|e| e.to_string())
    }
}

impl Drop for CompositorWorker {
    fn drop(&mut self) {
        // Closing the request channel lets the thread's recv() fail and exit
        let (dead_tx, _) = mpsc::channel();
        drop(std::mem::replace(&mut self.tx, dead_tx));
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
