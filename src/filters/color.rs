//! Per-pixel colour transforms.
//!
//! Each function works on an RGB copy of its input and parallelises over
//! pixels with rayon; every pixel is independent so the result matches a
//! sequential pass exactly.

use crate::imaging::PixelBuffer;
use crate::imaging::buffer::luma;
use rayon::prelude::*;

/// Sepia matrix rows in RGB order.
pub const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

const BRIGHT_GAIN: f32 = 1.5;
const BRIGHT_BIAS: f32 = 50.0;

/// Round and saturate a wide intermediate back to a sample.
#[inline]
pub(crate) fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn map_pixels(input: &PixelBuffer, f: impl Fn(&mut [u8]) + Sync + Send) -> PixelBuffer {
    let mut out = input.to_rgb();
    out.samples_mut().par_chunks_exact_mut(3).for_each(f);
    out
}

pub fn bw(input: &PixelBuffer) -> PixelBuffer {
    map_pixels(input, |px| {
        let y = luma(px[0], px[1], px[2]);
        px.fill(y);
    })
}

/// Apply [`SEPIA_MATRIX`] to one RGB pixel.
#[inline]
pub(crate) fn sepia_pixel(px: &[u8]) -> [f32; 3] {
    let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
    SEPIA_MATRIX.map(|row| row[0] * r + row[1] * g + row[2] * b)
}

pub fn sepia(input: &PixelBuffer) -> PixelBuffer {
    map_pixels(input, |px| {
        let [r, g, b] = sepia_pixel(px);
        px[0] = clamp_u8(r);
        px[1] = clamp_u8(g);
        px[2] = clamp_u8(b);
    })
}

pub fn negative(input: &PixelBuffer) -> PixelBuffer {
    map_pixels(input, |px| {
        for v in px.iter_mut() {
            *v = 255 - *v;
        }
    })
}

pub fn bright(input: &PixelBuffer) -> PixelBuffer {
    map_pixels(input, |px| {
        for v in px.iter_mut() {
            *v = clamp_u8(*v as f32 * BRIGHT_GAIN + BRIGHT_BIAS);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Channels;
    use proptest::prelude::*;

    fn rgb_buffer() -> impl Strategy<Value = PixelBuffer> {
        (1u32..8, 1u32..8).prop_flat_map(|(w, h)| {
            proptest::collection::vec(any::<u8>(), (w * h * 3) as usize)
                .prop_map(move |s| PixelBuffer::new(w, h, Channels::Rgb, s).unwrap())
        })
    }

    proptest! {
        #[test]
        fn negative_is_an_involution(buf in rgb_buffer()) {
            prop_assert_eq!(negative(&negative(&buf)), buf);
        }

        #[test]
        fn bw_channels_are_equal(buf in rgb_buffer()) {
            let out = bw(&buf);
            for px in out.samples().chunks_exact(3) {
                prop_assert!(px[0] == px[1] && px[1] == px[2]);
            }
        }

        #[test]
        fn sepia_is_monotone(
            px in any::<[u8; 3]>(),
            bump in any::<[u8; 3]>(),
        ) {
            let brighter = [
                px[0].saturating_add(bump[0]),
                px[1].saturating_add(bump[1]),
                px[2].saturating_add(bump[2]),
            ];
            let lo = sepia(&PixelBuffer::filled_rgb(1, 1, px));
            let hi = sepia(&PixelBuffer::filled_rgb(1, 1, brighter));
            for (a, b) in lo.samples().iter().zip(hi.samples()) {
                prop_assert!(b >= a);
            }
        }

        #[test]
        fn sepia_is_warm(buf in rgb_buffer()) {
            // Matrix rows shrink from red to blue, so channels never invert.
            let out = sepia(&buf);
            for px in out.samples().chunks_exact(3) {
                prop_assert!(px[0] >= px[1] && px[1] >= px[2]);
            }
        }

        #[test]
        fn bright_never_darkens(buf in rgb_buffer()) {
            let out = bright(&buf);
            for (a, b) in buf.samples().iter().zip(out.samples()) {
                prop_assert!(b >= a);
            }
        }
    }

    #[test]
    fn input_is_not_mutated() {
        let input = PixelBuffer::filled_rgb(3, 3, [10, 20, 30]);
        let copy = input.clone();
        let _ = sepia(&input);
        let _ = negative(&input);
        assert_eq!(input, copy);
    }

    #[test]
    fn sepia_clamps_white_and_keeps_black() {
        let white = sepia(&PixelBuffer::filled_rgb(2, 2, [255, 255, 255]));
        assert_eq!(white.pixel(0, 0), &[255, 255, 239]);
        let black = sepia(&PixelBuffer::filled_rgb(2, 2, [0, 0, 0]));
        assert!(black.samples().iter().all(|&v| v == 0));
    }

    #[test]
    fn sepia_known_pixel() {
        // r = .393*100 + .769*50 + .189*20 = 81.53
        // g = .349*100 + .686*50 + .168*20 = 72.56
        // b = .272*100 + .534*50 + .131*20 = 56.52
        let out = sepia(&PixelBuffer::filled_rgb(1, 1, [100, 50, 20]));
        assert_eq!(out.pixel(0, 0), &[82, 73, 57]);
    }

    #[test]
    fn bright_extremes() {
        let black = bright(&PixelBuffer::filled_rgb(2, 2, [0, 0, 0]));
        assert!(black.samples().iter().all(|&v| v == 50));
        let white = bright(&PixelBuffer::filled_rgb(2, 2, [255, 255, 255]));
        assert!(white.samples().iter().all(|&v| v == 255));
    }

    #[test]
    fn bright_mid_value() {
        let out = bright(&PixelBuffer::filled_rgb(1, 1, [100, 0, 137]));
        assert_eq!(out.pixel(0, 0), &[200, 50, 255]);
    }

    #[test]
    fn negative_of_red_is_cyan() {
        let out = negative(&PixelBuffer::filled_rgb(2, 1, [255, 0, 0]));
        assert_eq!(out.pixel(1, 0), &[0, 255, 255]);
    }

    #[test]
    fn bw_expands_gray_input() {
        let gray = PixelBuffer::new(2, 1, Channels::Gray, vec![30, 60]).unwrap();
        let out = bw(&gray);
        assert_eq!(out.channels(), Channels::Rgb);
        assert_eq!(out.samples(), &[30, 30, 30, 60, 60, 60]);
    }

    #[test]
    fn clamp_rounds_half_up() {
        assert_eq!(clamp_u8(81.5), 82);
        assert_eq!(clamp_u8(-3.0), 0);
        assert_eq!(clamp_u8(300.0), 255);
    }
}
