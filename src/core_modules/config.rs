// THEORY:
// The `config` module is the persisted parameter store for the pipeline. All
// tunable behavior lives in one flat struct that serializes to JSON on disk:
// the segmentation threshold, the minimum blob area, the saliency cutoff,
// and the flag for the binarization step.
//
// The store follows a load-once-per-cycle, write-back-on-first-run contract:
// a processing cycle reads the file once before touching frames, and the
// very first run of a fresh deployment writes the defaults out so operators
// have a file to edit. Nothing in the core reads the file mid-frame.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core_modules::error::Error;

/// Tunable parameters for the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// The global binarization threshold for foreground segmentation.
    pub threshold: u8,
    /// The minimum pixel area a blob must reach to survive area filtering.
    pub min_area: u32,
    /// The minimum fraction of a blob's pixels that must fall inside the
    /// high-threshold mask to count as salient.
    pub min_saliency: f32,
    /// Whether frame differencing binarizes its output at `threshold`.
    pub enable_threshold: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 15,
            min_area: 64,
            min_saliency: 0.25,
            enable_threshold: true,
        }
    }
}

impl PipelineConfig {
    /// Reads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Writes this configuration to a JSON file, pretty-printed so operators
    /// can edit it by hand.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
