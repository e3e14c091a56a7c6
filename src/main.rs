// This file is a small example of how to use the `blob_vision` library.
// The main library entry point is `src/lib.rs`.

use blob_vision::pipeline::{BlobPipeline, PipelineConfig, RasterBuffer};

fn main() {
    println!("Blob Vision Engine - Example Runner");

    // A synthetic scene: a flat background and one frame containing a
    // single bright 6x6 object. In a real application the frames would come
    // from a video feed and the config from `PipelineConfig::load`.
    let config = PipelineConfig {
        threshold: 50,
        min_area: 4,
        ..PipelineConfig::default()
    };
    let background =
        RasterBuffer::from_vec(64, 64, 1, vec![20; 64 * 64]).expect("valid raster");
    let mut frame = background.clone();
    for y in 20..26 {
        for x in 30..36 {
            frame.set_value(x, y, 230).expect("in bounds");
        }
    }

    let mut pipeline = BlobPipeline::new(config);
    pipeline.set_background(&background);

    match pipeline.process_frame(&frame) {
        Ok(blobs) => {
            println!("Extracted {} blob(s):", blobs.len());
            for blob in &blobs {
                println!(
                    "  id {:>3}  area {:>5}  centroid ({:.1}, {:.1})",
                    blob.id, blob.area, blob.centroid.0, blob.centroid.1
                );
            }
        }
        Err(err) => eprintln!("extraction failed: {err}"),
    }
}
