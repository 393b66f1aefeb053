//! Contrast-limited adaptive histogram equalization.
//!
//! The image is divided into a grid of tiles; each tile gets its own
//! clipped-histogram equalization lookup table, and every output pixel
//! bilinearly interpolates between the four surrounding tile tables.
//! Clipping caps how far any single gray level can stretch, which keeps
//! flat regions from being blown out the way plain equalization would.

use image::{GrayImage, Luma};

/// Apply CLAHE with the given clip limit and tile grid.
///
/// `clip_limit` is a multiple of the average histogram bin height (the
/// conventional parameterization); `tiles_x`/`tiles_y` give the grid size.
/// Images smaller than the grid are processed with one tile per pixel
/// column/row still available, so output dimensions always match input.
pub fn clahe(image: &GrayImage, clip_limit: f32, tiles_x: u32, tiles_y: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tiles_x = tiles_x.clamp(1, width);
    let tiles_y = tiles_y.clamp(1, height);

    // One equalization LUT per tile. Proportional bounds partition the
    // image exactly: tile t spans [t*len/tiles, (t+1)*len/tiles), which
    // is never empty and never crosses the image edge.
    let mut luts = vec![[0u8; 256]; (tiles_x * tiles_y) as usize];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * width / tiles_x;
            let x1 = (tx + 1) * width / tiles_x;
            let y0 = ty * height / tiles_y;
            let y1 = (ty + 1) * height / tiles_y;
            luts[(ty * tiles_x + tx) as usize] =
                tile_lut(image, x0, y0, x1, y1, clip_limit);
        }
    }

    let tile_w = width as f32 / tiles_x as f32;
    let tile_h = height as f32 / tiles_y as f32;

    let mut out = GrayImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        let v = pixel.0[0];

        // Position in tile-center units: a pixel at the center of tile t
        // maps to exactly t, for bilinear LUT blending.
        let fx = (x as f32 + 0.5) / tile_w - 0.5;
        let fy = (y as f32 + 0.5) / tile_h - 0.5;
        let tx0 = (fx.floor().max(0.0) as u32).min(tiles_x - 1);
        let ty0 = (fy.floor().max(0.0) as u32).min(tiles_y - 1);
        let tx1 = (tx0 + 1).min(tiles_x - 1);
        let ty1 = (ty0 + 1).min(tiles_y - 1);
        let wx = (fx - fx.floor()).clamp(0.0, 1.0);
        let wy = (fy - fy.floor()).clamp(0.0, 1.0);

        let v00 = f32::from(luts[(ty0 * tiles_x + tx0) as usize][v as usize]);
        let v10 = f32::from(luts[(ty0 * tiles_x + tx1) as usize][v as usize]);
        let v01 = f32::from(luts[(ty1 * tiles_x + tx0) as usize][v as usize]);
        let v11 = f32::from(luts[(ty1 * tiles_x + tx1) as usize][v as usize]);

        let top = v00 * (1.0 - wx) + v10 * wx;
        let bottom = v01 * (1.0 - wx) + v11 * wx;
        let blended = top * (1.0 - wy) + bottom * wy;
        out.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
    }

    out
}

/// Build the clipped-equalization LUT for one tile.
fn tile_lut(image: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [u8; 256] {
    let mut histogram = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            histogram[image.get_pixel(x, y).0[0] as usize] += 1;
        }
    }

    let pixel_count = ((x1 - x0) * (y1 - y0)).max(1);
    let clip_at = ((clip_limit * pixel_count as f32 / 256.0).max(1.0)) as u32;

    // Clip and redistribute the excess uniformly.
    let mut excess = 0u32;
    for bin in histogram.iter_mut() {
        if *bin > clip_at {
            excess += *bin - clip_at;
            *bin = clip_at;
        }
    }
    let bonus = excess / 256;
    let mut remainder = excess % 256;
    for bin in histogram.iter_mut() {
        *bin += bonus;
        if remainder > 0 {
            *bin += 1;
            remainder -= 1;
        }
    }

    let mut lut = [0u8; 256];
    let mut cdf = 0u32;
    for (level, &count) in histogram.iter().enumerate() {
        cdf += count;
        lut[level] = ((u64::from(cdf) * 255) / u64::from(pixel_count)) as u8;
    }
    lut
}
