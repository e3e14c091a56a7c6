// THEORY:
// The `filter` module is the production-hardening layer between raw
// extraction and any consumer of blob data. A labeling pass over a real
// foreground mask produces noise: single-pixel speckle, compression
// artifacts, and weakly-supported regions. Two passes clean it up:
//
// 1.  **Area Filtering**: drops every blob below a minimum pixel count.
//     Cheap, and removes the bulk of the speckle.
// 2.  **Saliency Partitioning**: splits a set into (kept, rejected) by the
//     fraction of each blob's pixels that fall inside a separately computed
//     high-threshold mask. A blob that moved strongly lights up the strict
//     mask; a blob that exists only because of a permissive threshold does
//     not.
//
// Both operations are total functions over a `BlobSet`: the input set is
// never mutated, discovery order is preserved, and for the partition every
// input blob lands in exactly one output set. Callers that want the old
// overwrite-the-working-set behavior opt in with `BlobSet::replace_with`.

use std::collections::HashMap;

use crate::core_modules::blob::{BlobSet, LabelMap};
use crate::core_modules::error::Error;
use crate::core_modules::raster::RasterBuffer;

/// Retains every blob with `area >= min_area`, in discovery order.
/// Pure: the input set is left intact.
pub fn filter_by_min_area(blobs: &BlobSet, min_area: u32) -> BlobSet {
    let mut kept = BlobSet::new();
    for blob in blobs {
        if blob.area >= min_area {
            kept.push(blob.clone());
        }
    }
    kept
}

/// Partitions `blobs` into (kept, rejected) by saliency ratio: the fraction
/// of each blob's member pixels where `high_threshold_mask` is non-zero.
/// A blob is kept iff its ratio is at least `min_saliency`.
///
/// Both outputs preserve discovery order, are disjoint by id, and together
/// cover the input exactly. An empty input yields two empty sets. A blob
/// with zero area is an `InvalidBlob` error, checked before any division.
pub fn filter_by_saliency(
    blobs: &BlobSet,
    high_threshold_mask: &RasterBuffer,
    min_saliency: f32,
) -> Result<(BlobSet, BlobSet), Error> {
    let mut kept = BlobSet::new();
    let mut rejected = BlobSet::new();
    let Some(first) = blobs.get(0) else {
        return Ok((kept, rejected));
    };

    for blob in blobs {
        if blob.area == 0 {
            return Err(Error::InvalidBlob { id: blob.id });
        }
    }

    // All records in one set share a labeling pass, so the first record's
    // map covers every blob.
    let map = std::sync::Arc::clone(first.label_map());
    let salient_counts = count_salient_pixels(blobs, &map, high_threshold_mask)?;

    for blob in blobs {
        let salient = salient_counts.get(&blob.id).copied().unwrap_or(0);
        let saliency = salient as f32 / blob.area as f32;
        if saliency >= min_saliency {
            kept.push(blob.clone());
        } else {
            rejected.push(blob.clone());
        }
    }

    tracing::debug!(
        kept = kept.len(),
        rejected = rejected.len(),
        min_saliency,
        "saliency partition complete"
    );
    Ok((kept, rejected))
}

/// One scan over the label map, counting per-blob pixels where the mask is
/// non-zero. O(pixels), independent of blob count.
fn count_salient_pixels(
    blobs: &BlobSet,
    map: &LabelMap,
    mask: &RasterBuffer,
) -> Result<HashMap<u32, u32>, Error> {
    if mask.width() != map.width() || mask.height() != map.height() {
        return Err(Error::OutOfBounds {
            x: mask.width(),
            y: mask.height(),
            width: map.width(),
            height: map.height(),
        });
    }

    let mut members: HashMap<u32, u32> = HashMap::with_capacity(blobs.len());
    for blob in blobs {
        members.insert(blob.id, 0);
    }

    let labels = map.labels();
    for y in 0..map.height() {
        for x in 0..map.width() {
            let label = labels[y as usize * map.width() as usize + x as usize];
            if label == 0 {
                continue;
            }
            if mask.get_value(x, y)? == 0 {
                continue;
            }
            // Labels not in `members` belong to blobs filtered out upstream.
            if let Some(count) = members.get_mut(&label) {
                *count += 1;
            }
        }
    }

    Ok(members)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::{filter_by_min_area, filter_by_saliency};
    use crate::core_modules::blob::{BlobRecord, BlobSet, LabelMap, Point};
    use crate::core_modules::error::Error;
    use crate::core_modules::raster::RasterBuffer;

    // A 10x4 map with three row-aligned blobs of areas 5, 10, and 15
    // (label 3 spills onto a second partial row).
    fn three_blob_fixture() -> (Arc<LabelMap>, BlobSet) {
        let mut labels = vec![0u32; 10 * 4];
        for x in 0..5 {
            labels[x] = 1; // row 0: area 5
        }
        for x in 0..10 {
            labels[10 + x] = 2; // row 1: area 10
        }
        for x in 0..10 {
            labels[20 + x] = 3; // rows 2-3: area 15
        }
        for x in 0..5 {
            labels[30 + x] = 3;
        }
        let map = Arc::new(LabelMap::new(10, 4, labels).expect("valid map"));

        let spans = [(1u32, 5u32, 0u32, 0u32), (2, 10, 1, 1), (3, 15, 2, 3)];
        let mut set = BlobSet::new();
        for (id, area, y0, y1) in spans {
            set.push(BlobRecord::new(
                id,
                area,
                (Point { x: 0, y: y0 }, Point { x: 9, y: y1 }),
                (0.0, y0 as f64),
                Arc::clone(&map),
            ));
        }
        (map, set)
    }

    #[test]
    fn min_area_keeps_large_blobs_in_order() {
        let (_, set) = three_blob_fixture();
        let kept = filter_by_min_area(&set, 10);

        let areas: Vec<u32> = kept.iter().map(|blob| blob.area).collect();
        assert_eq!(areas, vec![10, 15]);
        assert_eq!(kept.len(), 2);
        // The source set is untouched.
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn min_area_is_idempotent() {
        let (_, set) = three_blob_fixture();
        let once = filter_by_min_area(&set, 10);
        let twice = filter_by_min_area(&once, 10);

        let ids_once: Vec<u32> = once.iter().map(|blob| blob.id).collect();
        let ids_twice: Vec<u32> = twice.iter().map(|blob| blob.id).collect();
        assert_eq!(ids_once, ids_twice);
    }

    #[test]
    fn saliency_partition_is_disjoint_and_exhaustive() {
        let (map, set) = three_blob_fixture();
        // Mask lights up all of blob 1, half of blob 2, none of blob 3.
        let mut mask = RasterBuffer::new(map.width(), map.height(), 1);
        for x in 0..5 {
            mask.set_value(x, 0, 255).expect("in bounds");
            mask.set_value(x, 1, 255).expect("in bounds");
        }

        let (kept, rejected) = filter_by_saliency(&set, &mask, 0.5).expect("valid inputs");
        assert_eq!(kept.len() + rejected.len(), set.len());

        let kept_ids: HashSet<u32> = kept.iter().map(|blob| blob.id).collect();
        let rejected_ids: HashSet<u32> = rejected.iter().map(|blob| blob.id).collect();
        assert!(kept_ids.is_disjoint(&rejected_ids));
        assert_eq!(kept_ids, HashSet::from([1, 2]));
        assert_eq!(rejected_ids, HashSet::from([3]));
    }

    #[test]
    fn saliency_ratio_decides_the_split() {
        // Two blobs: ratios 0.9 and 0.2 against a 0.5 threshold.
        let mut labels = vec![0u32; 10 * 2];
        for x in 0..10 {
            labels[x] = 1;
            labels[10 + x] = 2;
        }
        let map = Arc::new(LabelMap::new(10, 2, labels).expect("valid map"));
        let mut set = BlobSet::new();
        for (id, y) in [(1u32, 0u32), (2, 1)] {
            set.push(BlobRecord::new(
                id,
                10,
                (Point { x: 0, y }, Point { x: 9, y }),
                (4.5, y as f64),
                Arc::clone(&map),
            ));
        }

        let mut mask = RasterBuffer::new(10, 2, 1);
        for x in 0..9 {
            mask.set_value(x, 0, 255).expect("in bounds"); // 9/10 of blob 1
        }
        for x in 0..2 {
            mask.set_value(x, 1, 255).expect("in bounds"); // 2/10 of blob 2
        }

        let (kept, rejected) = filter_by_saliency(&set, &mask, 0.5).expect("valid inputs");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.get(0).expect("present").id, 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected.get(0).expect("present").id, 2);
    }

    #[test]
    fn zero_area_blob_is_invalid_not_a_division() {
        let (map, _) = three_blob_fixture();
        let mut set = BlobSet::new();
        set.push(BlobRecord::new(
            7,
            0,
            (Point { x: 0, y: 0 }, Point { x: 0, y: 0 }),
            (0.0, 0.0),
            map,
        ));

        let mask = RasterBuffer::new(10, 4, 1);
        assert!(matches!(
            filter_by_saliency(&set, &mask, 0.5),
            Err(Error::InvalidBlob { id: 7 })
        ));
    }

    #[test]
    fn empty_set_partitions_into_two_empty_sets() {
        let set = BlobSet::new();
        let mask = RasterBuffer::new(4, 4, 1);
        let (kept, rejected) = filter_by_saliency(&set, &mask, 0.5).expect("no-op is valid");
        assert!(kept.is_empty());
        assert!(rejected.is_empty());
    }

    #[test]
    fn mask_extent_must_match_the_label_map() {
        let (_, set) = three_blob_fixture();
        let mask = RasterBuffer::new(3, 3, 1);
        assert!(matches!(
            filter_by_saliency(&set, &mask, 0.5),
            Err(Error::OutOfBounds { .. })
        ));
    }
}
