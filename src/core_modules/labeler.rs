// THEORY:
// The `labeler` is the engine of the extraction layer. It does not implement
// connected-component analysis itself; the union-find flood over 8-connected
// pixels is delegated to `imageproc`'s labeling primitive. What this module
// owns is the orchestration around that primitive, which is where all the
// correctness lives:
//
// 1.  **Border Suppression**: before labeling, every pixel on the outermost
//     row and column of the input is forced to zero, in place. Components
//     that touch the image edge can otherwise be fused with an unrelated
//     background region by 8-connected flood fill on bordered images. The
//     input raster is consumed/altered by this step; callers that need the
//     original must clone before calling.
// 2.  **Binarization**: the primitive connects equal-valued pixels, so the
//     source is first thresholded into a strict binary mask (value passes iff
//     strictly greater than the threshold).
// 3.  **Aggregation**: a single scan over the label map accumulates each
//     component's area, bounding box, centroid, and source-intensity sum.
//     Discovery order is ascending label, which the primitive assigns in
//     raster-scan order.
// 4.  **Foreground Filtering**: provisional components whose mean source
//     intensity is not strictly greater than 1 are discarded; they are
//     threshold artifacts, not true foreground.
//
// Finding zero blobs is a valid outcome. The only error is a zero-sized
// input raster.

use std::sync::Arc;

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::core_modules::blob::{BlobRecord, BlobSet, LabelMap, Point};
use crate::core_modules::error::Error;
use crate::core_modules::raster::RasterBuffer;

pub mod labeler {
    use super::*; // Make structs from parent module available.

    /// Mean source intensity a provisional component must strictly exceed to
    /// count as true foreground.
    const MIN_MEAN_INTENSITY: f64 = 1.0;

    /// Runs the full extraction pass: border suppression, 8-connected
    /// labeling at `threshold`, and mean-intensity filtering.
    ///
    /// Mutates `raster` in place (border suppression) regardless of outcome,
    /// except for the zero-size check which fails before any mutation.
    pub fn find(raster: &mut RasterBuffer, threshold: u8) -> Result<BlobSet, Error> {
        if raster.is_empty() {
            return Err(Error::EmptyInput);
        }

        suppress_border(raster);

        let source = raster.to_gray();
        let binary = binarize(&source, threshold);
        let label_image = connected_components(&binary, Connectivity::Eight, Luma([0u8]));

        let width = raster.width();
        let height = raster.height();
        let labels = label_image.into_raw();
        let blobs = aggregate(&labels, &source, width, height);
        let map = Arc::new(LabelMap::new(width, height, labels)?);

        let mut set = BlobSet::new();
        for accum in blobs {
            // Threshold artifacts have a near-zero mean in the source raster.
            if accum.mean_intensity() > MIN_MEAN_INTENSITY {
                set.push(accum.into_record(Arc::clone(&map)));
            }
        }

        tracing::debug!(blobs = set.len(), threshold, "extraction pass complete");
        Ok(set)
    }

    /// Forces the outermost row and column of the raster to zero, in place.
    pub fn suppress_border(raster: &mut RasterBuffer) {
        let width = raster.width();
        let height = raster.height();
        if width == 0 || height == 0 {
            return;
        }

        for x in 0..width {
            let _ = raster.set_value(x, 0, 0);
            let _ = raster.set_value(x, height - 1, 0);
        }
        for y in 0..height {
            let _ = raster.set_value(0, y, 0);
            let _ = raster.set_value(width - 1, y, 0);
        }
    }

    /// Per-component accumulator for the single aggregation scan.
    struct ComponentAccum {
        label: u32,
        area: u32,
        min: Point,
        max: Point,
        sum_x: u64,
        sum_y: u64,
        intensity_sum: u64,
    }

    impl ComponentAccum {
        fn new(label: u32, x: u32, y: u32) -> Self {
            Self {
                label,
                area: 0,
                min: Point { x, y },
                max: Point { x, y },
                sum_x: 0,
                sum_y: 0,
                intensity_sum: 0,
            }
        }

        fn include(&mut self, x: u32, y: u32, intensity: u8) {
            self.area += 1;
            self.min.x = self.min.x.min(x);
            self.min.y = self.min.y.min(y);
            self.max.x = self.max.x.max(x);
            self.max.y = self.max.y.max(y);
            self.sum_x += x as u64;
            self.sum_y += y as u64;
            self.intensity_sum += intensity as u64;
        }

        fn mean_intensity(&self) -> f64 {
            if self.area == 0 {
                return 0.0;
            }
            self.intensity_sum as f64 / self.area as f64
        }

        fn into_record(self, map: Arc<LabelMap>) -> BlobRecord {
            let centroid = (
                self.sum_x as f64 / self.area as f64,
                self.sum_y as f64 / self.area as f64,
            );
            BlobRecord::new(self.label, self.area, (self.min, self.max), centroid, map)
        }
    }

    fn binarize(source: &GrayImage, threshold: u8) -> GrayImage {
        let mut binary = GrayImage::new(source.width(), source.height());
        for (out, src) in binary.pixels_mut().zip(source.pixels()) {
            out[0] = if src[0] > threshold { 255 } else { 0 };
        }
        binary
    }

    /// One scan over the label map, collecting per-component statistics in
    /// ascending label order.
    fn aggregate(labels: &[u32], source: &GrayImage, width: u32, height: u32) -> Vec<ComponentAccum> {
        let max_label = labels.iter().copied().max().unwrap_or(0) as usize;
        let mut slots: Vec<Option<ComponentAccum>> = Vec::new();
        slots.resize_with(max_label + 1, || None);

        for y in 0..height {
            for x in 0..width {
                let label = labels[y as usize * width as usize + x as usize];
                if label == 0 {
                    continue;
                }
                let intensity = source.get_pixel(x, y)[0];
                slots[label as usize]
                    .get_or_insert_with(|| ComponentAccum::new(label, x, y))
                    .include(x, y, intensity);
            }
        }

        slots.into_iter().flatten().collect()
    }
}
