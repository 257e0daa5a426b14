//! Plain-text PPM (`P3`) output.

use std::io::Write;

use crate::{error::RenderResult, renderer::ImageBuffer};

/// Encoding gamma applied before quantization.
pub const GAMMA_EXPONENT: f64 = 0.45;

/// Gamma-encode a linear channel and quantize it to a byte.
///
/// The encoded value is clamped to `[0, 0.999]` before scaling by
/// `255.999`, so any input lands in `[0, 255]`. Negative values and NaN
/// map to 0. Encoding runs in double precision; single precision rounds
/// differently next to byte boundaries.
pub fn quantize(linear: f32) -> u8 {
    let linear = f64::from(linear);
    let encoded = if linear > 0.0 {
        linear.powf(GAMMA_EXPONENT)
    } else {
        0.0
    };
    (encoded.clamp(0.0, 0.999) * 255.999) as u8
}

/// Write `image` as an ASCII PPM: `P3`, dimensions, `255`, then one
/// `R G B` line per pixel, top row first.
pub fn write_ppm<W: Write>(out: &mut W, image: &ImageBuffer) -> RenderResult<()> {
    write!(out, "P3\n{} {}\n255\n", image.width, image.height)?;
    for color in &image.pixels {
        writeln!(
            out,
            "{} {} {}",
            quantize(color.x),
            quantize(color.y),
            quantize(color.z)
        )?;
    }
    out.flush()?;
    Ok(())
}
