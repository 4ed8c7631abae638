use crate::{error::Result, geometry::CornerBox};
use common::span_debug;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use image::{Rgb, RgbImage};

pub const DEFAULT_TARGET_SIZE: (u32, u32) = (640, 640);
pub const LETTERBOX_COLOR: Rgb<u8> = Rgb([114, 114, 114]);

const CHANNELS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxOptions {
    pub target_size: (u32, u32),
    pub pad_color: Rgb<u8>,
    pub allow_upscale: bool,
}

impl LetterboxOptions {
    pub fn square(size: u32) -> Self {
        Self {
            target_size: (size, size),
            ..Self::default()
        }
    }
}

impl Default for LetterboxOptions {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            pad_color: LETTERBOX_COLOR,
            allow_upscale: true,
        }
    }
}

/// Mapping from original image space into model input space:
/// `input = original * scale + pad`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxTransform {
    pub scale: f32,
    /// Left padding in pixels (where the resized image starts).
    pub pad_x: f32,
    /// Top padding in pixels.
    pub pad_y: f32,
    pub output_size: (u32, u32),
}

impl LetterboxTransform {
    pub fn identity(size: (u32, u32)) -> Self {
        Self {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            output_size: size,
        }
    }

    /// Map a box from model input space back to original image coordinates.
    pub fn to_original(&self, b: &CornerBox) -> CornerBox {
        CornerBox {
            x1: (b.x1 - self.pad_x) / self.scale,
            y1: (b.y1 - self.pad_y) / self.scale,
            x2: (b.x2 - self.pad_x) / self.scale,
            y2: (b.y2 - self.pad_y) / self.scale,
            ..*b
        }
    }
}

#[derive(Debug, Clone)]
pub struct Letterboxed {
    pub image: RgbImage,
    pub transform: LetterboxTransform,
}

/// Fit `image` into `options.target_size` without distorting its aspect ratio.
///
/// The leftover space is split between both edges; the near (left/top) edge gets
/// the floor of the half and the far edge the ceiling. Zero-sized inputs produce
/// a canvas filled with the pad color and never fail.
pub fn letterbox(image: &RgbImage, options: &LetterboxOptions) -> Result<Letterboxed> {
    let _s = span_debug!("letterbox");

    let (src_width, src_height) = image.dimensions();
    let (target_width, target_height) = options.target_size;

    let mut canvas = RgbImage::from_pixel(target_width, target_height, options.pad_color);

    if src_width == 0 || src_height == 0 {
        let transform = LetterboxTransform {
            scale: 1.0,
            pad_x: (target_width / 2) as f32,
            pad_y: (target_height / 2) as f32,
            output_size: options.target_size,
        };
        return Ok(Letterboxed {
            image: canvas,
            transform,
        });
    }

    let scale_x = target_width as f32 / src_width as f32;
    let scale_y = target_height as f32 / src_height as f32;
    let mut scale = scale_x.min(scale_y);
    if !options.allow_upscale {
        scale = scale.min(1.0);
    }

    let new_width = scaled_extent(src_width, scale).min(target_width);
    let new_height = scaled_extent(src_height, scale).min(target_height);

    let (offset_x, _) = split_padding(target_width - new_width);
    let (offset_y, _) = split_padding(target_height - new_height);

    tracing::trace!(
        src_width,
        src_height,
        new_width,
        new_height,
        offset_x,
        offset_y,
        scale,
        "Letterbox geometry"
    );

    if (new_width, new_height) == (src_width, src_height) {
        paste_rows(
            &mut canvas,
            image.as_raw(),
            new_width,
            new_height,
            offset_x,
            offset_y,
        );
    } else if new_width > 0 && new_height > 0 {
        let src = ImageRef::new(src_width, src_height, image.as_raw(), PixelType::U8x3)?;
        let mut resized = Image::new(new_width, new_height, PixelType::U8x3);

        Resizer::new().resize(
            &src,
            &mut resized,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )?;

        paste_rows(
            &mut canvas,
            resized.buffer(),
            new_width,
            new_height,
            offset_x,
            offset_y,
        );
    }

    Ok(Letterboxed {
        image: canvas,
        transform: LetterboxTransform {
            scale,
            pad_x: offset_x as f32,
            pad_y: offset_y as f32,
            output_size: options.target_size,
        },
    })
}

/// Half-pixel extents round to even, so 2.5 becomes 2 and 3.5 becomes 4.
#[inline]
fn scaled_extent(extent: u32, scale: f32) -> u32 {
    (extent as f32 * scale).round_ties_even() as u32
}

/// Split `total` padding into (near, far) edges that differ by at most one pixel.
#[inline]
fn split_padding(total: u32) -> (u32, u32) {
    let near = total / 2;
    (near, total - near)
}

fn paste_rows(
    canvas: &mut RgbImage,
    pixels: &[u8],
    width: u32,
    height: u32,
    offset_x: u32,
    offset_y: u32,
) {
    let stride = canvas.width() as usize * CHANNELS;
    let row_len = width as usize * CHANNELS;
    let dst: &mut [u8] = canvas;

    for y in 0..height as usize {
        let src_row = y * row_len;
        let dst_row = (y + offset_y as usize) * stride + offset_x as usize * CHANNELS;

        dst[dst_row..dst_row + row_len].copy_from_slice(&pixels[src_row..src_row + row_len]);
    }
}
