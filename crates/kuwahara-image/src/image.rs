use crate::error::ImageError;

/// Width and height of a raster, in pixels.
///
/// ```
/// use kuwahara_image::ImageSize;
///
/// let size: ImageSize = [640, 480].into();
/// assert_eq!(size.num_pixels(), 640 * 480);
/// assert_eq!(size.to_string(), "640x480");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by this size.
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Whether the size covers no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// `[width, height]`
impl From<[usize; 2]> for ImageSize {
    fn from([width, height]: [usize; 2]) -> Self {
        ImageSize { width, height }
    }
}

/// A dense raster with `CHANNELS` interleaved values per pixel.
///
/// Rows are stored top to bottom, so channel `ch` of the pixel at column `x` and
/// row `y` lives at `(y * width + x) * CHANNELS + ch`. Every stage of the filter
/// reads and writes this type: RGB inputs, three channel tensor fields and single
/// channel scalar fields alike.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Wrap an interleaved buffer of `width * height * CHANNELS` values.
    ///
    /// Fails with [`ImageError::InvalidChannelShape`] when the buffer length does
    /// not match `size`.
    ///
    /// ```
    /// use kuwahara_image::Image;
    ///
    /// // a 2x1 RGB raster: one red and one blue pixel
    /// let rgb = Image::<f32, 3>::new([2, 1].into(), vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0])?;
    /// assert_eq!(rgb.get_pixel(1, 0, 2)?, 1.0);
    ///
    /// assert!(Image::<f32, 3>::new([2, 1].into(), vec![0.0; 5]).is_err());
    /// # Ok::<(), kuwahara_image::ImageError>(())
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        let expected = size.num_pixels() * CHANNELS;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }
        Ok(Self { size, data })
    }

    /// A raster of the given size with every value set to `val`.
    ///
    /// Mostly used to allocate the output of a stage before it runs.
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        Image::new(size, vec![val; size.num_pixels() * CHANNELS])
    }

    /// Width and height in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Alias of [`Image::width`], for row/column loops.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Alias of [`Image::height`], for row/column loops.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// `CHANNELS`, as a value.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// The interleaved values, row by row.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable view of the interleaved values.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn offset(&self, x: usize, y: usize, ch: usize) -> Result<usize, ImageError> {
        let ImageSize { width, height } = self.size;
        if x >= width || y >= height {
            return Err(ImageError::PixelIndexOutOfBounds(x, y, width, height));
        }
        if ch >= CHANNELS {
            return Err(ImageError::ChannelIndexOutOfBounds(ch, CHANNELS));
        }
        Ok((y * width + x) * CHANNELS + ch)
    }

    /// Channel `ch` of the pixel at column `x` and row `y`.
    pub fn get_pixel(&self, x: usize, y: usize, ch: usize) -> Result<T, ImageError>
    where
        T: Copy,
    {
        self.offset(x, y, ch).map(|idx| self.data[idx])
    }

    /// Overwrite channel `ch` of the pixel at column `x` and row `y`.
    pub fn set_pixel(&mut self, x: usize, y: usize, ch: usize, val: T) -> Result<(), ImageError> {
        let idx = self.offset(x, y, ch)?;
        self.data[idx] = val;
        Ok(())
    }

    /// Copy one channel out into a single channel raster, e.g. `J11` out of a
    /// tensor field.
    pub fn channel(&self, ch: usize) -> Result<Image<T, 1>, ImageError>
    where
        T: Clone,
    {
        if ch >= CHANNELS {
            return Err(ImageError::ChannelIndexOutOfBounds(ch, CHANNELS));
        }
        let plane = self.data[ch..].iter().step_by(CHANNELS).cloned().collect();
        Image::new(self.size, plane)
    }

    /// Convert every value to `U` and multiply it by `scale`.
    ///
    /// Used to bring decoded 8 bit pixels into the `[0, 1]` range the filter
    /// works in. Fails with [`ImageError::CastError`] when a value is not
    /// representable in `U`.
    ///
    /// ```
    /// use kuwahara_image::Image;
    ///
    /// let bytes = Image::<u8, 1>::new([3, 1].into(), vec![0, 64, 255])?;
    /// let scaled = bytes.cast_and_scale::<f32>(0.25)?;
    /// assert_eq!(scaled.as_slice(), &[0.0, 16.0, 63.75]);
    /// # Ok::<(), kuwahara_image::ImageError>(())
    /// ```
    pub fn cast_and_scale<U>(&self, scale: U) -> Result<Image<U, CHANNELS>, ImageError>
    where
        U: num_traits::NumCast + std::ops::Mul<Output = U> + Copy,
        T: num_traits::NumCast + Copy,
    {
        let data = self
            .data
            .iter()
            .map(|&v| {
                U::from(v)
                    .map(|u| u * scale)
                    .ok_or_else(|| ImageError::CastError(std::any::type_name::<U>().to_string()))
            })
            .collect::<Result<Vec<U>, ImageError>>()?;
        Image::new(self.size, data)
    }
}

#[cfg(test)]
mod tests {
    use crate::image::{Image, ImageError, ImageSize};

    #[test]
    fn image_size() {
        let size = ImageSize::from([10, 20]);
        assert_eq!(size.num_pixels(), 200);
        assert!(!size.is_empty());
        assert!(ImageSize::from([0, 3]).is_empty());
        assert_eq!(format!("{size}"), "10x20");
    }

    #[test]
    fn image_new_wrong_length() {
        let res = Image::<f32, 3>::new([2, 2].into(), vec![0.0; 11]);
        assert_eq!(res, Err(ImageError::InvalidChannelShape(11, 12)));
    }

    #[test]
    fn image_pixel_access() -> Result<(), ImageError> {
        let mut image = Image::<f32, 3>::from_size_val([3, 2].into(), 0.0)?;
        image.set_pixel(2, 1, 1, 0.25)?;

        assert_eq!(image.get_pixel(2, 1, 1)?, 0.25);
        assert_eq!(image.as_slice()[(3 + 2) * 3 + 1], 0.25);
        assert_eq!(
            image.get_pixel(3, 0, 0),
            Err(ImageError::PixelIndexOutOfBounds(3, 0, 3, 2))
        );
        assert_eq!(
            image.get_pixel(0, 0, 3),
            Err(ImageError::ChannelIndexOutOfBounds(3, 3))
        );
        Ok(())
    }

    #[test]
    fn image_channel() -> Result<(), ImageError> {
        let image = Image::<f32, 2>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![0.0, 1.0, 2.0, 3.0],
        )?;

        assert_eq!(image.channel(0)?.as_slice(), &[0.0, 2.0]);
        assert_eq!(image.channel(1)?.as_slice(), &[1.0, 3.0]);
        assert!(image.channel(2).is_err());
        Ok(())
    }

    #[test]
    fn image_cast_and_scale() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new([3, 1].into(), vec![0, 2, 255])?;
        let image_f32 = image.cast_and_scale::<f32>(0.5)?;
        assert_eq!(image_f32.as_slice(), &[0.0, 1.0, 127.5]);

        let negative = Image::<f32, 1>::new([1, 1].into(), vec![-1.0])?;
        assert!(negative.cast_and_scale::<u8>(1).is_err());
        Ok(())
    }
}
