//! Display-space <-> image-space coordinate mathematics.
//!
//! The canvas shows the active image resized into the display area, either
//! stretched to fill it or letterboxed with a uniform scale. Boxes are always
//! stored in canonical image pixels, so every pointer event and every render
//! goes through [`CoordinateTransform`].

/// Scale and padding produced by fitting an image into a display area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Fit {
    /// Identity fit (scale 1, no padding).
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0,
            offset_y: 0,
        }
    }
}

impl Default for Fit {
    fn default() -> Self {
        Self::identity()
    }
}

/// Fit an image of `image_width` x `image_height` into a display area.
///
/// With `stretch`, each axis is scaled independently to fill the display and
/// there is no padding. Otherwise one uniform ratio (the smaller of the two
/// axis ratios) is used and the result is centered with floored offsets.
///
/// Degenerate sizes (any zero dimension) yield the identity fit so that the
/// scales stay strictly positive.
pub fn fit(
    display_width: u32,
    display_height: u32,
    image_width: u32,
    image_height: u32,
    stretch: bool,
) -> Fit {
    if display_width == 0 || display_height == 0 || image_width == 0 || image_height == 0 {
        return Fit::identity();
    }

    let width_ratio = f64::from(display_width) / f64::from(image_width);
    let height_ratio = f64::from(display_height) / f64::from(image_height);

    if stretch {
        return Fit {
            scale_x: width_ratio,
            scale_y: height_ratio,
            offset_x: 0,
            offset_y: 0,
        };
    }

    let ratio = width_ratio.min(height_ratio);
    let scaled_width = (f64::from(image_width) * ratio).floor() as i64;
    let scaled_height = (f64::from(image_height) * ratio).floor() as i64;

    Fit {
        scale_x: ratio,
        scale_y: ratio,
        offset_x: (i64::from(display_width) - scaled_width).div_euclid(2) as i32,
        offset_y: (i64::from(display_height) - scaled_height).div_euclid(2) as i32,
    }
}

/// Coordinate transform state for the active image.
///
/// Scale and offsets are recomputed whenever the image or the display size
/// changes, never per event, so `to_image` and `to_screen` agree within a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    image_size: Option<(u32, u32)>,
    display_size: (u32, u32),
    stretch: bool,
    fit: Fit,
}

impl CoordinateTransform {
    /// Create a transform with no image loaded.
    pub fn new(stretch: bool) -> Self {
        Self {
            image_size: None,
            display_size: (0, 0),
            stretch,
            fit: Fit::identity(),
        }
    }

    /// Set the active image dimensions. Zero-sized images unload the transform.
    pub fn set_image(&mut self, width: u32, height: u32) {
        self.image_size = (width > 0 && height > 0).then_some((width, height));
        if self.image_size.is_none() {
            log::warn!("Ignoring degenerate image size {}x{}", width, height);
        }
        self.recompute();
    }

    /// Forget the active image; scales return to 1 and offsets to 0.
    pub fn clear_image(&mut self) {
        self.image_size = None;
        self.recompute();
    }

    /// Set the display (canvas) size in display pixels.
    pub fn set_display_size(&mut self, width: u32, height: u32) {
        self.display_size = (width, height);
        self.recompute();
    }

    /// Switch between stretched and aspect-preserving fitting.
    pub fn set_stretch(&mut self, stretch: bool) {
        self.stretch = stretch;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.fit = match self.image_size {
            Some((w, h)) => fit(self.display_size.0, self.display_size.1, w, h, self.stretch),
            None => Fit::identity(),
        };
        log::trace!("Transform recomputed: {:?}", self.fit);
    }

    pub fn is_loaded(&self) -> bool {
        self.image_size.is_some()
    }

    /// Dimensions of the source image, if one is loaded.
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    pub fn display_size(&self) -> (u32, u32) {
        self.display_size
    }

    pub fn stretch(&self) -> bool {
        self.stretch
    }

    pub fn current_fit(&self) -> Fit {
        self.fit
    }

    /// Convert a display point to image pixels.
    ///
    /// Returns `None` when no image is loaded or the point lies in the left/top
    /// padding. Points past the right/bottom edge are clamped to the last pixel.
    pub fn to_image(&self, screen_x: i32, screen_y: i32) -> Option<(i32, i32)> {
        let (width, height) = self.image_size?;
        let rel_x = screen_x - self.fit.offset_x;
        let rel_y = screen_y - self.fit.offset_y;
        if rel_x < 0 || rel_y < 0 {
            return None;
        }
        Some(self.scale_down(rel_x, rel_y, width, height))
    }

    /// Like [`to_image`](Self::to_image), but points in the padding are clamped
    /// onto the image edge instead of rejected. Used for drag previews.
    pub fn to_image_clamped(&self, screen_x: i32, screen_y: i32) -> Option<(i32, i32)> {
        let (width, height) = self.image_size?;
        let rel_x = (screen_x - self.fit.offset_x).max(0);
        let rel_y = (screen_y - self.fit.offset_y).max(0);
        Some(self.scale_down(rel_x, rel_y, width, height))
    }

    fn scale_down(&self, rel_x: i32, rel_y: i32, width: u32, height: u32) -> (i32, i32) {
        let x = (f64::from(rel_x) / self.fit.scale_x).floor() as i64;
        let y = (f64::from(rel_y) / self.fit.scale_y).floor() as i64;
        (
            x.clamp(0, i64::from(width) - 1) as i32,
            y.clamp(0, i64::from(height) - 1) as i32,
        )
    }

    /// Convert image pixels to a display point. No bounds check.
    pub fn to_screen(&self, image_x: i32, image_y: i32) -> (i32, i32) {
        let x = (f64::from(image_x) * self.fit.scale_x).floor() as i32;
        let y = (f64::from(image_y) * self.fit.scale_y).floor() as i32;
        (x + self.fit.offset_x, y + self.fit.offset_y)
    }

    /// Whether a display point falls on the drawn image (edges inclusive).
    pub fn contains_screen_point(&self, x: i32, y: i32) -> bool {
        let Some((width, height)) = self.image_size else {
            return false;
        };
        let left = f64::from(self.fit.offset_x);
        let top = f64::from(self.fit.offset_y);
        let right = left + f64::from(width) * self.fit.scale_x;
        let bottom = top + f64::from(height) * self.fit.scale_y;
        let (x, y) = (f64::from(x), f64::from(y));
        x >= left && x <= right && y >= top && y <= bottom
    }
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::new(true)
    }
}
