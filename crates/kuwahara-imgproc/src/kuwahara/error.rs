use kuwahara_image::ImageError;

/// Errors reported by the kuwahara pipeline.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum KuwaharaError {
    /// A parameter is non finite or outside of its domain.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f32,
        /// The domain the value must belong to.
        reason: &'static str,
    },

    /// A stage received fields of different sizes, or an image error occurred.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The host cancelled the run between two stages.
    #[error("kuwahara filter cancelled before stage `{0}`")]
    Cancelled(&'static str),
}
