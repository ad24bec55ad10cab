//! Drawing surfaces
//!
//! The renderer only ever talks to a `DrawSurface` it is handed per call, so
//! any backend (an editor canvas, a texture upload buffer, a plain image) can
//! sit behind it.

use farm_map_autotile::SheetRect;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Destination rectangle on a surface, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Target of layer drawing
pub trait DrawSurface {
    /// Surface size in pixels
    fn size(&self) -> (u32, u32);

    /// Clear the whole surface to transparent
    fn clear(&mut self);

    /// Clear one rectangle to transparent
    fn clear_rect(&mut self, rect: PixelRect);

    /// Draw `src` from `sheet` into `dst`, scaling if the sizes differ
    fn blit(&mut self, sheet: &RgbaImage, src: SheetRect, dst: PixelRect);
}

/// `DrawSurface` backed by an in-memory RGBA image
#[derive(Debug, Clone)]
pub struct ImageSurface {
    image: RgbaImage,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl DrawSurface for ImageSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn clear_rect(&mut self, rect: PixelRect) {
        let (width, height) = self.image.dimensions();
        let x_end = rect.x.saturating_add(rect.width).min(width);
        let y_end = rect.y.saturating_add(rect.height).min(height);
        for y in rect.y..y_end {
            for x in rect.x..x_end {
                self.image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
    }

    fn blit(&mut self, sheet: &RgbaImage, src: SheetRect, dst: PixelRect) {
        let (sheet_w, sheet_h) = sheet.dimensions();
        if src.x >= sheet_w || src.y >= sheet_h || dst.width == 0 || dst.height == 0 {
            return;
        }
        let w = src.width.min(sheet_w - src.x);
        let h = src.height.min(sheet_h - src.y);
        if w == 0 || h == 0 {
            return;
        }

        let mut tile = imageops::crop_imm(sheet, src.x, src.y, w, h).to_image();
        if (w, h) != (dst.width, dst.height) {
            tile = imageops::resize(&tile, dst.width, dst.height, FilterType::Nearest);
        }
        imageops::overlay(&mut self.image, &tile, dst.x as i64, dst.y as i64);
    }
}
