// THEORY:
// The `pipeline` module is the top-level API for the extraction engine. It
// encapsulates the full stack into a single, easy-to-use interface: register
// a background frame, feed it frames, and receive filtered blob sets plus
// rendered output rasters. Callers that need finer control can reach for the
// individual stages in `core_modules` directly; this type only sequences
// them and never adds semantics of its own.

use crate::core_modules::background::StaticFrameDifference;
use crate::core_modules::filter;
use crate::core_modules::labeler::labeler;
use crate::core_modules::renderer::BlobRenderer;

// Re-export key data structures for the public API.
pub use crate::core_modules::blob::{BlobRecord, BlobSet, LabelMap, Point};
pub use crate::core_modules::config::PipelineConfig;
pub use crate::core_modules::error::Error;
pub use crate::core_modules::raster::RasterBuffer;

/// The main, top-level struct for the extraction engine.
pub struct BlobPipeline {
    config: PipelineConfig,
    background: StaticFrameDifference,
    renderer: BlobRenderer,
}

impl BlobPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let background = StaticFrameDifference::new(config.clone());
        Self {
            config,
            background,
            renderer: BlobRenderer::new(),
        }
    }

    /// Registers the empty-scene reference frame for segmentation.
    pub fn set_background(&mut self, frame: &RasterBuffer) {
        self.background.set_background(frame);
    }

    /// Runs segmentation and extraction for one frame: frame differencing,
    /// labeling, and area filtering.
    pub fn process_frame(&mut self, frame: &RasterBuffer) -> Result<BlobSet, Error> {
        // Stage 1: Foreground Segmentation
        let mut foreground = self.background.process(frame)?;

        // Stages 2-3: Extraction + Area Filtering
        self.extract(&mut foreground)
    }

    /// Runs extraction on an already-segmented foreground raster: labeling
    /// followed by area filtering. The raster's border is consumed/altered
    /// by the labeler's suppression pre-pass.
    pub fn extract(&self, foreground: &mut RasterBuffer) -> Result<BlobSet, Error> {
        // Stage 2: Connected-Component Extraction
        let raw_blobs = labeler::find(foreground, self.config.threshold)?;

        // Stage 3: Area Filtering
        let filtered = filter::filter_by_min_area(&raw_blobs, self.config.min_area);

        tracing::debug!(
            raw = raw_blobs.len(),
            filtered = filtered.len(),
            min_area = self.config.min_area,
            "frame extraction complete"
        );
        Ok(filtered)
    }

    /// Splits a blob set into (kept, rejected) by the configured saliency
    /// cutoff. Neither the input set nor the pipeline's state is replaced;
    /// callers decide what becomes their working set.
    pub fn partition(
        &self,
        blobs: &BlobSet,
        high_threshold_mask: &RasterBuffer,
    ) -> Result<(BlobSet, BlobSet), Error> {
        filter::filter_by_saliency(blobs, high_threshold_mask, self.config.min_saliency)
    }

    /// Paints each blob in a reproducible pseudo-random color.
    pub fn paint_colored(
        &self,
        blobs: &BlobSet,
        output: &mut RasterBuffer,
    ) -> Result<(), Error> {
        self.renderer.paint_colored(blobs, output)
    }

    /// Paints each blob with its 1-based ordinal, producing an index image.
    pub fn paint_labeled(
        &self,
        blobs: &BlobSet,
        output: &mut RasterBuffer,
    ) -> Result<(), Error> {
        self.renderer.paint_labeled(blobs, output)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::{BlobPipeline, PipelineConfig, RasterBuffer};

    // A static scene with one large moving object and one speck of noise.
    fn scene() -> (RasterBuffer, RasterBuffer) {
        let background = RasterBuffer::from_vec(16, 16, 1, vec![30; 256]).expect("valid raster");
        let mut frame = background.clone();
        // A 4x4 object, area 16.
        for y in 5..9 {
            for x in 5..9 {
                frame.set_value(x, y, 220).expect("in bounds");
            }
        }
        // A single noisy pixel, area 1.
        frame.set_value(12, 12, 220).expect("in bounds");
        (background, frame)
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            threshold: 50,
            min_area: 4,
            min_saliency: 0.5,
            enable_threshold: true,
        }
    }

    #[test]
    fn frame_processing_keeps_the_object_and_drops_the_noise() {
        let (background, frame) = scene();
        let mut pipeline = BlobPipeline::new(config());
        pipeline.set_background(&background);

        let blobs = pipeline.process_frame(&frame).expect("valid scene");
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs.get(0).expect("present").area, 16);
    }

    #[test]
    fn partition_respects_the_configured_cutoff() {
        let (background, frame) = scene();
        let mut pipeline = BlobPipeline::new(config());
        pipeline.set_background(&background);
        let blobs = pipeline.process_frame(&frame).expect("valid scene");

        // A mask covering the object entirely: saliency 1.0, kept.
        let mut mask = RasterBuffer::new(16, 16, 1);
        for y in 5..9 {
            for x in 5..9 {
                mask.set_value(x, y, 255).expect("in bounds");
            }
        }
        let (kept, rejected) = pipeline.partition(&blobs, &mask).expect("valid inputs");
        assert_eq!(kept.len(), 1);
        assert!(rejected.is_empty());

        // An empty mask: saliency 0.0, rejected.
        let empty_mask = RasterBuffer::new(16, 16, 1);
        let (kept, rejected) = pipeline
            .partition(&blobs, &empty_mask)
            .expect("valid inputs");
        assert!(kept.is_empty());
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn labeled_rendering_indexes_the_extracted_blobs() {
        let (background, frame) = scene();
        let mut pipeline = BlobPipeline::new(config());
        pipeline.set_background(&background);
        let blobs = pipeline.process_frame(&frame).expect("valid scene");

        let mut index = RasterBuffer::new(16, 16, 1);
        pipeline
            .paint_labeled(&blobs, &mut index)
            .expect("matching extent");
        assert_eq!(index.get_value(6, 6).expect("in bounds"), 1);
        assert_eq!(index.get_value(0, 0).expect("in bounds"), 0);
    }
}
