// THEORY:
// The `background` module is the producer side of the pipeline boundary: it
// turns an incoming frame into the foreground raster the extraction layer
// consumes. The method is deliberately the simplest one that works for a
// static camera:
//
// 1.  **Static Reference**: the caller registers one background frame (an
//     empty scene). There is no adaptive background model; the reference
//     only changes when the caller replaces it.
// 2.  **Absolute Difference**: each incoming frame is compared to the
//     reference per pixel, per channel.
// 3.  **Optional Global Threshold**: when enabled, the difference is
//     binarized (strictly above the threshold becomes 255, everything else
//     0), which is the form the labeler's binarization expects anyway.
//
// The differencer also honors the configuration store contract: parameters
// are re-read from the attached store before each frame, and on the first
// frame of a fresh deployment the defaults are written back so the file
// exists for operators to edit.

use std::path::PathBuf;

use crate::core_modules::config::PipelineConfig;
use crate::core_modules::error::Error;
use crate::core_modules::raster::RasterBuffer;

/// Frame differencing against a static background reference.
pub struct StaticFrameDifference {
    /// The registered empty-scene reference frame.
    background: Option<RasterBuffer>,
    /// Current parameters; refreshed from the store when one is attached.
    config: PipelineConfig,
    /// Optional path of the persisted configuration store.
    config_store: Option<PathBuf>,
    /// True until the first frame has been processed.
    first_time: bool,
}

impl StaticFrameDifference {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            background: None,
            config,
            config_store: None,
            first_time: true,
        }
    }

    /// Attaches a persisted configuration store. Parameters are re-read from
    /// it before every frame, and defaults are written back on first run.
    pub fn with_config_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_store = Some(path.into());
        self
    }

    /// Registers the empty-scene reference frame.
    pub fn set_background(&mut self, frame: &RasterBuffer) {
        self.background = Some(frame.clone());
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Computes the foreground raster for `input`: per-channel absolute
    /// difference against the reference, binarized at the configured
    /// threshold when `enable_threshold` is set.
    pub fn process(&mut self, input: &RasterBuffer) -> Result<RasterBuffer, Error> {
        if input.is_empty() {
            return Err(Error::EmptyInput);
        }
        let Some(background) = &self.background else {
            return Err(Error::EmptyInput);
        };
        if !input.same_extent(background) || input.channels() != background.channels() {
            return Err(Error::OutOfBounds {
                x: input.width(),
                y: input.height(),
                width: background.width(),
                height: background.height(),
            });
        }

        self.sync_config_store()?;

        let background = self.background.as_ref().expect("background checked above");
        let mut diff = Vec::with_capacity(input.data().len());
        for (&current, &reference) in input.data().iter().zip(background.data()) {
            let delta = current.abs_diff(reference);
            diff.push(if self.config.enable_threshold {
                if delta > self.config.threshold { 255 } else { 0 }
            } else {
                delta
            });
        }

        self.first_time = false;
        RasterBuffer::from_vec(input.width(), input.height(), input.channels(), diff)
    }

    /// Load-once-per-frame, write-back-on-first-run store contract.
    fn sync_config_store(&mut self) -> Result<(), Error> {
        let Some(path) = &self.config_store else {
            return Ok(());
        };
        if path.exists() {
            self.config = PipelineConfig::load(path)?;
        } else if self.first_time {
            self.config.save(path)?;
        }
        Ok(())
    }
}
