// THEORY:
// The `RasterBuffer` is the single pixel container every pipeline stage
// operates on. It is deliberately a "dumb" data container, in the same spirit
// as a chunk of raw frame bytes: it owns a row-major, channel-interleaved u8
// grid and knows how to hand out and accept individual pixels. It contains no
// algorithms.
//
// Key architectural principles:
// 1.  **Bounds-Checked Access**: Every coordinate access is validated against
//     the raster extent. An out-of-range access is a reported `OutOfBounds`
//     error, never a panic and never silent wraparound. The extraction
//     pipeline touches pixels from several differently-sized rasters
//     (foreground, mask, output) and a hard boundary here catches every
//     mismatch at its source.
// 2.  **Exclusive Ownership**: A buffer is owned by one call chain at a time.
//     Stages that mutate (border suppression, rendering) take `&mut`, stages
//     that only read take `&`. There is no interior mutability and no
//     sharing.
// 3.  **Codec Boundary**: Conversions to and from `image::GrayImage` live
//     here so the labeling primitive and the file codecs see a standard type
//     while the rest of the crate sees only `RasterBuffer`.

use image::GrayImage;

use crate::core_modules::error::Error;

/// A row-major, channel-interleaved 2D pixel grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    /// The width of the raster in pixels.
    width: u32,
    /// The height of the raster in pixels.
    height: u32,
    /// The number of interleaved channels per pixel (1 for masks, 3 for RGB).
    channels: u8,
    /// The pixel storage, `width * height * channels` bytes.
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Creates a zero-filled raster of the given extent.
    pub fn new(width: u32, height: u32, channels: u8) -> Self {
        let len = width as usize * height as usize * channels as usize;
        Self {
            width,
            height,
            channels,
            data: vec![0; len],
        }
    }

    /// Wraps an existing pixel buffer, validating its length against the
    /// declared extent.
    pub fn from_vec(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, Error> {
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(Error::ChannelMismatch {
                expected: channels,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// True when the raster has zero extent in either dimension.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The raw interleaved pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns all channels of the pixel at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Result<&[u8], Error> {
        let start = self.offset(x, y)?;
        Ok(&self.data[start..start + self.channels as usize])
    }

    /// Returns channel 0 of the pixel at `(x, y)`. The intensity channel for
    /// single-channel rasters.
    pub fn get_value(&self, x: u32, y: u32) -> Result<u8, Error> {
        let start = self.offset(x, y)?;
        Ok(self.data[start])
    }

    /// Writes all channels of the pixel at `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, value: &[u8]) -> Result<(), Error> {
        if value.len() != self.channels as usize {
            return Err(Error::ChannelMismatch {
                expected: self.channels,
                actual: value.len(),
            });
        }
        let start = self.offset(x, y)?;
        self.data[start..start + value.len()].copy_from_slice(value);
        Ok(())
    }

    /// Writes `value` into every channel of the pixel at `(x, y)`.
    pub fn set_value(&mut self, x: u32, y: u32, value: u8) -> Result<(), Error> {
        let start = self.offset(x, y)?;
        for channel in &mut self.data[start..start + self.channels as usize] {
            *channel = value;
        }
        Ok(())
    }

    /// Resets every pixel to the zero value.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// True when `other` covers the same pixel grid (channel counts may
    /// differ).
    pub fn same_extent(&self, other: &RasterBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Copies channel 0 into a `GrayImage` for the labeling primitive and the
    /// codecs.
    pub fn to_gray(&self) -> GrayImage {
        let mut gray = Vec::with_capacity(self.width as usize * self.height as usize);
        for pixel in self.data.chunks_exact(self.channels as usize) {
            gray.push(pixel[0]);
        }
        GrayImage::from_raw(self.width, self.height, gray)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }

    /// Wraps a `GrayImage` produced by a codec as a single-channel raster.
    pub fn from_gray(gray: GrayImage) -> Self {
        let width = gray.width();
        let height = gray.height();
        Self {
            width,
            height,
            channels: 1,
            data: gray.into_raw(),
        }
    }

    fn offset(&self, x: u32, y: u32) -> Result<usize, Error> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((y as usize * self.width as usize + x as usize) * self.channels as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::RasterBuffer;
    use crate::core_modules::error::Error;

    #[test]
    fn get_and_set_round_trip() {
        let mut raster = RasterBuffer::new(4, 3, 3);
        raster.set(2, 1, &[10, 20, 30]).expect("in bounds");
        assert_eq!(raster.get(2, 1).expect("in bounds"), &[10, 20, 30]);
        assert_eq!(raster.get_value(2, 1).expect("in bounds"), 10);
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut raster = RasterBuffer::new(4, 3, 1);
        assert!(matches!(
            raster.get(4, 0),
            Err(Error::OutOfBounds { x: 4, y: 0, .. })
        ));
        assert!(matches!(
            raster.set_value(0, 3, 9),
            Err(Error::OutOfBounds { x: 0, y: 3, .. })
        ));
    }

    #[test]
    fn wrong_channel_count_is_an_error() {
        let mut raster = RasterBuffer::new(2, 2, 3);
        assert!(matches!(
            raster.set(0, 0, &[1, 2]),
            Err(Error::ChannelMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn from_vec_validates_length() {
        assert!(RasterBuffer::from_vec(2, 2, 1, vec![0; 4]).is_ok());
        assert!(RasterBuffer::from_vec(2, 2, 1, vec![0; 5]).is_err());
    }

    #[test]
    fn clear_zeroes_every_pixel() {
        let mut raster = RasterBuffer::from_vec(2, 2, 1, vec![7; 4]).expect("valid");
        raster.clear();
        assert!(raster.data().iter().all(|&value| value == 0));
    }

    #[test]
    fn gray_conversion_takes_channel_zero() {
        let mut raster = RasterBuffer::new(2, 1, 3);
        raster.set(0, 0, &[5, 100, 200]).expect("in bounds");
        raster.set(1, 0, &[9, 100, 200]).expect("in bounds");
        let gray = raster.to_gray();
        assert_eq!(gray.as_raw(), &[5, 9]);
    }
}
