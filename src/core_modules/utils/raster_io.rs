// THEORY:
// The `raster_io` helper is the file-format boundary of the crate. Decoding
// and encoding are delegated entirely to the `image` codec crate; this
// module only translates between its buffer types and `RasterBuffer`, and
// surfaces codec failures unchanged as the crate's `Io`/`File` error kinds.

use std::fs::File;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageReader};

use crate::core_modules::error::Error;
use crate::core_modules::raster::RasterBuffer;

/// The channel layout to decode a file into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// One luma channel, the layout masks and foreground rasters use.
    Gray,
    /// Three interleaved RGB channels, the layout colored output uses.
    Rgb,
}

/// Decodes an image file into a raster with the requested channel layout.
pub fn load(path: impl AsRef<Path>, layout: ChannelLayout) -> Result<RasterBuffer, Error> {
    let decoded = ImageReader::open(path)?.decode()?;
    let raster = match layout {
        ChannelLayout::Gray => RasterBuffer::from_gray(decoded.to_luma8()),
        ChannelLayout::Rgb => {
            let rgb = decoded.to_rgb8();
            let (width, height) = (rgb.width(), rgb.height());
            RasterBuffer::from_vec(width, height, 3, rgb.into_raw())?
        }
    };
    Ok(raster)
}

/// Encodes a 1- or 3-channel raster to a PNG file.
pub fn save(path: impl AsRef<Path>, raster: &RasterBuffer) -> Result<(), Error> {
    let color_type = match raster.channels() {
        1 => ExtendedColorType::L8,
        3 => ExtendedColorType::Rgb8,
        other => {
            return Err(Error::ChannelMismatch {
                expected: 3,
                actual: other as usize,
            });
        }
    };

    let output = File::create(path)?;
    let encoder = PngEncoder::new(output);
    encoder.write_image(raster.data(), raster.width(), raster.height(), color_type)?;
    Ok(())
}
