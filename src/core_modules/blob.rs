// THEORY:
// The `blob` module holds the data model of the extraction pipeline: the
// `BlobRecord` (one connected component) and the `BlobSet` (the ordered
// collection a labeling pass produces). Both are "dumb" data containers in
// the sense that they summarize a detection without owning any algorithm.
//
// Key architectural principles:
// 1.  **Membership as a Capability**: a blob does not carry its pixel list.
//     Instead every record holds a shared handle to the `LabelMap` the
//     labeler produced, which answers "is (x, y) part of this blob" and can
//     fill all member pixels into an output raster. The map is created once
//     per labeling pass and shared through `Arc`, never copied per blob.
// 2.  **Immutable After Creation**: a record's area, bounding box, and
//     centroid are fixed when the labeler builds it. The only permitted
//     "mutation" is `fill`, which writes into an external output raster and
//     leaves the record untouched.
// 3.  **Explicit Set Semantics**: filters over a `BlobSet` produce new sets
//     and never touch their input. A caller that wants the old in-place
//     behavior opts in with `replace_with`, so no caller ever observes a set
//     it still holds changing underneath it.

use std::sync::Arc;

use crate::core_modules::error::Error;
use crate::core_modules::raster::RasterBuffer;

/// A 2D pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// The per-pixel component labels a labeling pass produced. Label 0 is
/// background; every other value names one connected component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    width: u32,
    height: u32,
    labels: Vec<u32>,
}

impl LabelMap {
    /// Wraps a row-major label buffer, validating its length against the
    /// declared extent.
    pub fn new(width: u32, height: u32, labels: Vec<u32>) -> Result<Self, Error> {
        if labels.len() != width as usize * height as usize {
            return Err(Error::OutOfBounds {
                x: width,
                y: height,
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            labels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw row-major label values.
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// The component label at `(x, y)`, or `None` outside the extent.
    pub fn label_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.labels[y as usize * self.width as usize + x as usize])
    }
}

/// A single connected component detected by one labeling pass.
/// Area and geometry are immutable once the labeler has built the record.
#[derive(Debug, Clone)]
pub struct BlobRecord {
    /// The component's label value, stable within its `BlobSet`.
    pub id: u32,
    /// The number of member pixels, at least 1 for labeler-produced records.
    pub area: u32,
    /// The rectangle enclosing all member pixels, as top-left and
    /// bottom-right corners (both inclusive).
    pub bounding_box: (Point, Point),
    /// The unweighted mean of the member pixel coordinates.
    pub centroid: (f64, f64),
    /// The shared membership capability for this blob's labeling pass.
    labels: Arc<LabelMap>,
}

impl BlobRecord {
    pub fn new(
        id: u32,
        area: u32,
        bounding_box: (Point, Point),
        centroid: (f64, f64),
        labels: Arc<LabelMap>,
    ) -> Self {
        Self {
            id,
            area,
            bounding_box,
            centroid,
            labels,
        }
    }

    /// The label map this blob's membership is defined against.
    pub fn label_map(&self) -> &Arc<LabelMap> {
        &self.labels
    }

    /// True when the pixel at `(x, y)` belongs to this blob.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.labels.label_at(x, y) == Some(self.id)
    }

    /// Writes `value` into every member pixel of `output`. The output raster
    /// must cover the same extent as the blob's label map. Only the bounding
    /// box region is scanned.
    pub fn fill(&self, output: &mut RasterBuffer, value: &[u8]) -> Result<(), Error> {
        if output.width() != self.labels.width() || output.height() != self.labels.height() {
            return Err(Error::OutOfBounds {
                x: output.width(),
                y: output.height(),
                width: self.labels.width(),
                height: self.labels.height(),
            });
        }
        let (top_left, bottom_right) = self.bounding_box;
        for y in top_left.y..=bottom_right.y {
            for x in top_left.x..=bottom_right.x {
                if self.contains(x, y) {
                    output.set(x, y, value)?;
                }
            }
        }
        Ok(())
    }
}

/// An ordered collection of blob records from one labeling pass.
/// Order is discovery order; ids are unique within one set.
#[derive(Debug, Clone, Default)]
pub struct BlobSet {
    blobs: Vec<BlobRecord>,
}

impl BlobSet {
    pub fn new() -> Self {
        Self { blobs: Vec::new() }
    }

    pub fn from_records(blobs: Vec<BlobRecord>) -> Self {
        Self { blobs }
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BlobRecord> {
        self.blobs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlobRecord> {
        self.blobs.iter()
    }

    /// Appends a single record, preserving insertion order.
    pub fn push(&mut self, blob: BlobRecord) {
        self.blobs.push(blob);
    }

    /// Merges another set onto the end of this one. Id uniqueness across
    /// sets from different labeling passes is the caller's concern.
    pub fn append(&mut self, mut other: BlobSet) {
        self.blobs.append(&mut other.blobs);
    }

    /// The explicit in-place variant: overwrites this set with `other`.
    /// Filters never do this implicitly; a caller that wants the filtered
    /// result to become its working set opts in here.
    pub fn replace_with(&mut self, other: BlobSet) {
        self.blobs = other.blobs;
    }
}

impl<'a> IntoIterator for &'a BlobSet {
    type Item = &'a BlobRecord;
    type IntoIter = std::slice::Iter<'a, BlobRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.blobs.iter()
    }
}
