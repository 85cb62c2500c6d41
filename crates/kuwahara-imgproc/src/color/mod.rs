mod hsv;
pub(crate) use hsv::hsv_to_rgb;
pub use hsv::rgb_from_hsv;
