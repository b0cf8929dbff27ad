use log::{debug, trace};

use crate::camera::Frame;

/// Finds 2D barcodes in a frame and returns their raw text.
pub trait BarcodeDetector: Send + Sync {
    fn detect(&self, frame: &Frame) -> Vec<String>;
}

/// QR code detector backed by `rqrr`.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrDetector;

impl BarcodeDetector for QrDetector {
    fn detect(&self, frame: &Frame) -> Vec<String> {
        if frame.width == 0 || frame.height == 0 {
            return Vec::new();
        }

        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(frame.width, frame.height, |x, y| {
                frame.luma_at(x, y)
            });
        let grids = prepared.detect_grids();
        trace!("Found {} candidate grids", grids.len());

        grids
            .iter()
            .filter_map(|grid| match grid.decode() {
                Ok((_meta, content)) => Some(content),
                Err(e) => {
                    debug!("Discarding undecodable grid: {:?}", e);
                    None
                }
            })
            .collect()
    }
}
