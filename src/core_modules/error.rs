// THEORY:
// The `error` module defines the single error type shared by every stage of
// the extraction pipeline. All failures are reported to the immediate caller;
// nothing in this crate retries, logs-and-continues, or panics on bad
// coordinates. The variants map one-to-one onto the failure modes of the
// pipeline's contracts:
//
// 1.  **OutOfBounds**: a pixel coordinate outside a raster's extent, or two
//     collaborating rasters (foreground, mask, output) whose extents disagree.
// 2.  **ChannelMismatch**: a pixel value slice whose length does not match the
//     raster's channel count.
// 3.  **EmptyInput**: a zero-sized raster, or a missing background reference,
//     where the operation has no clean no-op interpretation.
// 4.  **InvalidBlob**: a blob record violating the `area >= 1` invariant, or a
//     blob set too large to express as u8 ordinals.
// 5.  **Io / Config**: failures surfaced unchanged from the image codec and
//     configuration-store collaborators.

use thiserror::Error;

/// The error type for all fallible operations in the extraction pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A coordinate fell outside the raster extent, or two rasters that must
    /// share an extent do not.
    #[error("coordinate ({x}, {y}) out of bounds for {width}x{height} raster")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// A pixel value had the wrong number of channels for the target raster.
    #[error("expected {expected} channels, got {actual}")]
    ChannelMismatch { expected: u8, actual: usize },

    /// A zero-sized raster or missing input where a no-op is not defined.
    #[error("empty input: zero-sized raster or missing reference frame")]
    EmptyInput,

    /// A blob record that violates the `area >= 1` invariant, or a blob that
    /// cannot be assigned a u8 ordinal.
    #[error("invalid blob {id}: area must be at least 1 pixel")]
    InvalidBlob { id: u32 },

    /// An image decode/encode failure from the raster I/O collaborator.
    #[error("raster i/o failed")]
    Io(#[from] image::ImageError),

    /// A filesystem failure from the raster I/O or configuration collaborator.
    #[error("file access failed")]
    File(#[from] std::io::Error),

    /// A configuration (de)serialization failure.
    #[error("configuration parse failed")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn out_of_bounds_reports_coordinates() {
        let err = Error::OutOfBounds {
            x: 12,
            y: 3,
            width: 10,
            height: 10,
        };
        assert_eq!(
            err.to_string(),
            "coordinate (12, 3) out of bounds for 10x10 raster"
        );
    }
}
