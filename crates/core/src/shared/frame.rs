use crate::shared::bounding_box::PixelRect;

/// A decoded image: contiguous pixel bytes in row-major order.
///
/// Loaders produce 3-channel RGB; single-channel frames are accepted
/// by feature extraction as already-grey input.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Copies the pixels under `rect` into a new frame.
    ///
    /// `rect` must lie inside the frame, which [`BoundingBox::to_pixel_rect`]
    /// guarantees.
    ///
    /// [`BoundingBox::to_pixel_rect`]: crate::shared::bounding_box::BoundingBox::to_pixel_rect
    pub fn crop(&self, rect: &PixelRect) -> Frame {
        let channels = self.channels as usize;
        let row_len = rect.width as usize * channels;
        let stride = self.width as usize * channels;
        let mut data = Vec::with_capacity(row_len * rect.height as usize);

        for row in rect.y..rect.y + rect.height {
            let start = row as usize * stride + rect.x as usize * channels;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }

        Frame::new(data, rect.width, rect.height, self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(w: u32, h: u32) -> Frame {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                data.extend_from_slice(&[x as u8, y as u8, 0]);
            }
        }
        Frame::new(data, w, h, 3)
    }

    fn pixel(frame: &Frame, x: u32, y: u32) -> &[u8] {
        let c = frame.channels() as usize;
        let start = (y * frame.width()) as usize * c + x as usize * c;
        &frame.data()[start..start + c]
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 3);
    }

    #[test]
    fn test_crop_copies_region() {
        let frame = gradient_frame(10, 8);
        let crop = frame.crop(&PixelRect {
            x: 3,
            y: 2,
            width: 4,
            height: 5,
        });
        assert_eq!(crop.width(), 4);
        assert_eq!(crop.height(), 5);
        assert_eq!(crop.channels(), 3);

        // top-left of the crop is (x=3, y=2) in the source
        assert_eq!(pixel(&crop, 0, 0), &[3, 2, 0]);
        // bottom-right is (x=6, y=6)
        assert_eq!(pixel(&crop, 3, 4), &[6, 6, 0]);
    }

    #[test]
    fn test_crop_full_frame_is_identity() {
        let frame = gradient_frame(5, 5);
        let crop = frame.crop(&PixelRect {
            x: 0,
            y: 0,
            width: 5,
            height: 5,
        });
        assert_eq!(crop.data(), frame.data());
    }

    #[test]
    fn test_crop_single_channel() {
        let frame = Frame::new((0..16).collect(), 4, 4, 1);
        let crop = frame.crop(&PixelRect {
            x: 1,
            y: 1,
            width: 2,
            height: 2,
        });
        assert_eq!(crop.data(), &[5, 6, 9, 10]);
    }
}
