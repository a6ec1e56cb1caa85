use lk_flow::ImageF32;

/// Generates a `width × height` frame with a filled square on a flat
/// background. `origin` is the square's top-left pixel.
pub fn square_u8(
    width: usize,
    height: usize,
    origin: (usize, usize),
    side: usize,
    fg: u8,
    bg: u8,
) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = vec![bg; width * height];
    for y in origin.1..(origin.1 + side).min(height) {
        for x in origin.0..(origin.0 + side).min(width) {
            img[y * width + x] = fg;
        }
    }
    img
}

/// Smooth texture made of Gaussian blobs, translated by `(tx, ty)` with
/// analytic sub-pixel accuracy. Values stay within 0..255.
pub fn blob_texture(width: usize, height: usize, tx: f32, ty: f32) -> ImageF32 {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    // (centre x, centre y, sigma, amplitude) in fractions of the frame size.
    const BLOBS: [(f32, f32, f32, f32); 6] = [
        (0.25, 0.30, 0.060, 150.0),
        (0.55, 0.25, 0.050, -90.0),
        (0.75, 0.45, 0.070, 120.0),
        (0.35, 0.65, 0.055, 110.0),
        (0.60, 0.70, 0.065, -80.0),
        (0.50, 0.48, 0.045, 100.0),
    ];
    let scale = width.min(height) as f32;
    let mut img = ImageF32::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut v = 100.0;
            for &(fx, fy, fs, amp) in &BLOBS {
                let cx = fx * width as f32 + tx;
                let cy = fy * height as f32 + ty;
                let s = fs * scale;
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                v += amp * (-(dx * dx + dy * dy) / (2.0 * s * s)).exp();
            }
            img.set(x, y, v.clamp(0.0, 255.0));
        }
    }
    img
}

/// Blob centres of [`blob_texture`] (untranslated), the best-textured points.
pub fn blob_centres(width: usize, height: usize) -> Vec<[f32; 2]> {
    [
        (0.25, 0.30),
        (0.55, 0.25),
        (0.75, 0.45),
        (0.35, 0.65),
        (0.60, 0.70),
    ]
    .iter()
    .map(|&(fx, fy)| [fx * width as f32, fy * height as f32])
    .collect()
}

/// Constant-intensity frame.
pub fn flat(width: usize, height: usize, value: f32) -> ImageF32 {
    let mut img = ImageF32::new(width, height);
    img.data.iter_mut().for_each(|v| *v = value);
    img
}
