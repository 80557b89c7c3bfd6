//! LSB steganography for raster images.
//!
//! Pixels are scanned row-major; the R, G and B channels each carry one bit
//! in their least significant bit. Alpha is never touched.
//! Only lossless 8-bit inputs are accepted, and output is always PNG.

use std::io::Cursor;

use image::{ColorType, DynamicImage, ImageFormat, RgbImage, RgbaImage};
use tracing::debug;

use super::{CarrierAdapter, CarrierKind};
use crate::error::StegoError;

/// Colour channels that carry data per pixel.
const DATA_CHANNELS: usize = 3;

/// Image carrier holding an interleaved 8-bit RGB or RGBA buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCarrier {
    width: u32,
    height: u32,
    /// 3 for RGB, 4 for RGBA.
    channels: usize,
    data: Vec<u8>,
}

impl ImageCarrier {
    /// Decodes an image container, rejecting lossy formats.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StegoError> {
        let format = image::guess_format(bytes)
            .map_err(|e| StegoError::CarrierLoad(e.to_string()))?;

        if matches!(format, ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Avif) {
            return Err(StegoError::UnsupportedCarrierFormat(format!(
                "{:?} is lossy; use a lossless image such as PNG or BMP",
                format
            )));
        }

        let image = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| StegoError::CarrierLoad(e.to_string()))?;
        Self::from_image(image)
    }

    /// Wraps a decoded image. Grey images are widened to RGB(A); 16-bit and
    /// float images are rejected because narrowing them would be lossy.
    pub fn from_image(image: DynamicImage) -> Result<Self, StegoError> {
        let (width, height) = (image.width(), image.height());
        match image.color() {
            ColorType::Rgb8 | ColorType::L8 => Ok(Self {
                width,
                height,
                channels: 3,
                data: image.to_rgb8().into_raw(),
            }),
            ColorType::Rgba8 | ColorType::La8 => Ok(Self {
                width,
                height,
                channels: 4,
                data: image.to_rgba8().into_raw(),
            }),
            other => Err(StegoError::UnsupportedCarrierFormat(format!(
                "colour type {:?} is not supported; use 8-bit RGB(A) or greyscale",
                other
            ))),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Raw interleaved channel bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Rebuilds a [`DynamicImage`] from the channel buffer.
    pub fn to_image(&self) -> Result<DynamicImage, StegoError> {
        let raw = self.data.clone();
        let image = if self.has_alpha() {
            RgbaImage::from_raw(self.width, self.height, raw).map(DynamicImage::ImageRgba8)
        } else {
            RgbImage::from_raw(self.width, self.height, raw).map(DynamicImage::ImageRgb8)
        };
        image.ok_or_else(|| StegoError::CarrierSave("pixel buffer does not match dimensions".to_string()))
    }

    /// Index into `data` of the `unit`-th data channel.
    fn channel_offset(&self, unit: usize) -> usize {
        (unit / DATA_CHANNELS) * self.channels + unit % DATA_CHANNELS
    }
}

impl CarrierAdapter for ImageCarrier {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Image
    }

    fn usable_units(&self) -> usize {
        (self.width as usize) * (self.height as usize) * DATA_CHANNELS
    }

    fn embed(&self, bits: &[u8]) -> Result<Self, StegoError> {
        let available = self.usable_bits();
        if bits.len() > available {
            return Err(StegoError::too_many_bits(bits.len(), available));
        }

        let mut output = self.clone();
        for (unit, &bit) in bits.iter().enumerate() {
            let offset = self.channel_offset(unit);
            // Clear LSB and set new bit
            output.data[offset] = (output.data[offset] & 0xFE) | (bit & 1);
        }

        debug!(bits = bits.len(), available, "embedded bits into image");
        Ok(output)
    }

    fn extract(&self) -> Vec<u8> {
        (0..self.usable_units())
            .map(|unit| self.data[self.channel_offset(unit)] & 1)
            .collect()
    }

    fn to_bytes(&self) -> Result<Vec<u8>, StegoError> {
        let mut bytes = Vec::new();
        self.to_image()?
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| StegoError::CarrierSave(e.to_string()))?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 17) % 256) as u8,
                ((y * 23) % 256) as u8,
                (((x + y) * 31) % 256) as u8,
            ])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn create_test_rgba(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([
                ((x * 13) % 256) as u8,
                ((y * 7) % 256) as u8,
                ((x ^ y) % 256) as u8,
                ((x + y * 3) % 256) as u8,
            ])
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_capacity() {
        let carrier = ImageCarrier::from_image(create_test_image(100, 100)).unwrap();

        // 100x100 = 10000 pixels, 3 channels, 1 bit each = 30000 bits = 3750 bytes
        // Minus 20 bytes of frame header = 3730 bytes
        assert_eq!(carrier.usable_units(), 30000);
        assert_eq!(carrier.capacity(), 3730);
    }

    #[test]
    fn test_embed_extract_bits() {
        let carrier = ImageCarrier::from_image(create_test_image(10, 10)).unwrap();
        let bits: Vec<u8> = (0..200).map(|i| ((i * 7) % 3 == 0) as u8).collect();

        let stego = carrier.embed(&bits).unwrap();
        assert_eq!(&stego.extract()[..bits.len()], bits.as_slice());
    }

    #[test]
    fn test_scan_order_rgb_then_next_pixel() {
        let img = ImageBuffer::from_pixel(2, 1, Rgba([0u8, 0, 0, 200]));
        let carrier = ImageCarrier::from_image(DynamicImage::ImageRgba8(img)).unwrap();

        let stego = carrier.embed(&[1, 0, 1, 1]).unwrap();
        assert_eq!(stego.pixels(), &[1, 0, 1, 200, 1, 0, 0, 200]);
    }

    #[test]
    fn test_alpha_untouched() {
        let carrier = ImageCarrier::from_image(create_test_rgba(16, 16)).unwrap();
        let bits = vec![1u8; carrier.usable_bits()];

        let stego = carrier.embed(&bits).unwrap();
        for (before, after) in carrier.pixels().chunks(4).zip(stego.pixels().chunks(4)) {
            assert_eq!(before[3], after[3]);
        }
    }

    #[test]
    fn test_embed_does_not_mutate_input() {
        let carrier = ImageCarrier::from_image(create_test_image(8, 8)).unwrap();
        let original = carrier.clone();

        let _ = carrier.embed(&[1; 64]).unwrap();
        assert_eq!(carrier, original);
    }

    #[test]
    fn test_too_many_bits() {
        let carrier = ImageCarrier::from_image(create_test_image(2, 2)).unwrap();
        let result = carrier.embed(&[0; 13]);
        assert!(matches!(result, Err(StegoError::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_png_roundtrip() {
        let carrier = ImageCarrier::from_image(create_test_rgba(20, 20)).unwrap();
        let bits: Vec<u8> = (0..500).map(|i| (i % 2) as u8).collect();
        let stego = carrier.embed(&bits).unwrap();

        let png = stego.to_bytes().unwrap();
        let reloaded = ImageCarrier::from_bytes(&png).unwrap();

        assert!(reloaded.has_alpha());
        assert_eq!(reloaded, stego);
    }

    #[test]
    fn test_greyscale_widened() {
        let img = ImageBuffer::from_pixel(4, 4, image::Luma([90u8]));
        let carrier = ImageCarrier::from_image(DynamicImage::ImageLuma8(img)).unwrap();
        assert!(!carrier.has_alpha());
        assert_eq!(carrier.pixels().len(), 4 * 4 * 3);
    }

    #[test]
    fn test_sixteen_bit_rejected() {
        let img = ImageBuffer::from_pixel(4, 4, Rgb([1000u16, 2000, 3000]));
        let result = ImageCarrier::from_image(DynamicImage::ImageRgb16(img));
        assert!(matches!(result, Err(StegoError::UnsupportedCarrierFormat(_))));
    }

    #[test]
    fn test_jpeg_rejected() {
        // JPEG SOI + APP0 JFIF header is enough for format detection.
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01];
        let result = ImageCarrier::from_bytes(&jpeg);
        assert!(matches!(result, Err(StegoError::UnsupportedCarrierFormat(_))));
    }
}
