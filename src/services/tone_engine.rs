//! Shared quantization state behind a single lock.
//!
//! Every read or write of palette, tone map and sequence goes through one
//! `std::sync::Mutex`. All methods block; async callers run them inside
//! `spawn_blocking`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use color_tones::{ColorQuantizer, QuantizeMethod, RebuildReport, ToneSource};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::EngineError;
use crate::rendering::{decode_png, encode_rgba};

/// Palette size and strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParams {
    pub k: usize,
    pub method: QuantizeMethod,
}

/// Point-in-time view of the active palette
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaletteSnapshot {
    /// Palette colors as `#rrggbb`, in tone order
    pub palette: Vec<String>,
    /// Unique colors in the last loaded image's sample grid
    pub unique_colors: usize,
    /// Number of sampled pixels in the walk sequence
    pub sequence_len: usize,
    /// Next sequence position to be played
    pub cursor: usize,
    pub k: usize,
    pub method: String,
}

/// Thread-safe wrapper around [`ColorQuantizer`]
pub struct ToneEngine {
    quantizer: Mutex<ColorQuantizer>,
    loading: AtomicBool,
}

/// Clears the load flag when dropped
struct LoadGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl ToneEngine {
    pub fn new(k: i64, method: QuantizeMethod) -> Self {
        Self {
            quantizer: Mutex::new(ColorQuantizer::new(k, method)),
            loading: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ColorQuantizer> {
        self.quantizer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the load slot, or fail if another load holds it.
    fn begin_load(&self) -> Result<LoadGuard<'_>, EngineError> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                tracing::warn!("Image load rejected, another load is in progress");
                EngineError::LoadInProgress
            })?;
        Ok(LoadGuard {
            flag: &self.loading,
        })
    }

    /// True while a load is running
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Load a raw RGBA8 buffer.
    ///
    /// Rejected with [`EngineError::LoadInProgress`] while another load runs.
    /// On any failure the previous palette and sequence stay active.
    pub fn load_pixels(
        &self,
        rgba: &[u8],
        width: usize,
        height: usize,
    ) -> Result<RebuildReport, EngineError> {
        let _guard = self.begin_load()?;
        self.load_locked(rgba, width, height)
    }

    /// Decode a PNG and load it.
    pub fn load_png(&self, bytes: &[u8]) -> Result<RebuildReport, EngineError> {
        let _guard = self.begin_load()?;
        let image = decode_png(bytes).inspect_err(|e| {
            tracing::warn!(%e, "Rejected image");
        })?;
        self.load_locked(&image.rgba, image.width, image.height)
    }

    fn load_locked(
        &self,
        rgba: &[u8],
        width: usize,
        height: usize,
    ) -> Result<RebuildReport, EngineError> {
        let result = self.lock().load_pixels(rgba, width, height);
        match &result {
            Ok(report) => {
                tracing::info!(width, height, "Image loaded");
                log_report(report);
            }
            Err(e) => tracing::warn!(%e, width, height, "Image load failed"),
        }
        result.map_err(EngineError::from)
    }

    /// Set K, rebuilding if an image is loaded
    pub fn set_k(&self, k: i64) -> Result<Option<RebuildReport>, EngineError> {
        let report = self.lock().set_k(k)?;
        report.iter().for_each(log_report);
        Ok(report)
    }

    /// Set the strategy, rebuilding if an image is loaded
    pub fn set_method(
        &self,
        method: QuantizeMethod,
    ) -> Result<Option<RebuildReport>, EngineError> {
        let report = self.lock().set_method(method)?;
        report.iter().for_each(log_report);
        Ok(report)
    }

    /// Set K and strategy with a single rebuild
    pub fn configure(
        &self,
        k: i64,
        method: QuantizeMethod,
    ) -> Result<Option<RebuildReport>, EngineError> {
        let report = self.lock().configure(k, method)?;
        report.iter().for_each(log_report);
        Ok(report)
    }

    pub fn params(&self) -> EngineParams {
        let q = self.lock();
        EngineParams {
            k: q.k(),
            method: q.method(),
        }
    }

    /// Next tone index from the walk sequence
    pub fn next_tone(&self) -> Result<usize, EngineError> {
        Ok(self.lock().next_tone()?)
    }

    pub fn reset_sequence(&self) {
        self.lock().reset_sequence();
    }

    pub fn unique_color_count(&self) -> usize {
        self.lock().unique_color_count()
    }

    pub fn snapshot(&self) -> PaletteSnapshot {
        let q = self.lock();
        let (palette, sequence_len) = match q.state() {
            Some(state) => (state.palette().to_hex(), state.sequence().len()),
            None => (Vec::new(), 0),
        };
        PaletteSnapshot {
            palette,
            unique_colors: q.unique_color_count(),
            sequence_len,
            cursor: q.cursor(),
            k: q.k(),
            method: q.method().to_string(),
        }
    }

    /// Preview raster as PNG, `None` before the first load
    pub fn preview_png(&self) -> Result<Option<Vec<u8>>, EngineError> {
        let Some(preview) = self.lock().preview() else {
            return Ok(None);
        };
        let side = preview.side as u32;
        encode_rgba(side, side, &preview.rgba).map(Some)
    }
}

impl ToneSource for &ToneEngine {
    type Error = EngineError;

    fn next_tone(&mut self) -> Result<usize, EngineError> {
        ToneEngine::next_tone(self)
    }
}

fn log_report(report: &RebuildReport) {
    if let Some(adj) = &report.adjustment {
        tracing::warn!(
            requested_k = adj.requested_k,
            actual_k = adj.actual_k,
            "{}",
            adj.message
        );
    }
    tracing::info!(
        palette = report.palette_size,
        unique = report.unique_colors,
        sequence = report.sequence_len,
        "Palette rebuilt"
    );
}
