use std::fmt;

/// Pipeline stage a shader diagnostic belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    /// Pipeline creation from two compiled stages.
    Link,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Link => "link",
        };
        f.write_str(name)
    }
}

/// Every way a filter invocation can fail.
///
/// All of these are deterministic input or environment errors. The engine
/// never retries; the first failure aborts the pipeline and is returned as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("color matrix must have 20 coefficients, got {len}")]
    InvalidMatrixShape { len: usize },

    #[error("image dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("no GPU rendering context available: {reason}")]
    ContextUnavailable { reason: String },

    #[error("{stage} shader build failed: {diagnostic}")]
    ShaderBuildFailure {
        stage: ShaderStage,
        diagnostic: String,
    },

    #[error("texture upload failed: {reason}")]
    TextureUploadFailure { reason: String },
}

impl FilterError {
    pub(crate) fn context_unavailable(reason: impl Into<String>) -> Self {
        Self::ContextUnavailable { reason: reason.into() }
    }

    pub(crate) fn shader(stage: ShaderStage, diagnostic: impl Into<String>) -> Self {
        Self::ShaderBuildFailure {
            stage,
            diagnostic: diagnostic.into(),
        }
    }

    pub(crate) fn texture_upload(reason: impl Into<String>) -> Self {
        Self::TextureUploadFailure { reason: reason.into() }
    }

    /// True when the caller should fall back to showing the unfiltered image.
    pub fn is_context_unavailable(&self) -> bool {
        matches!(self, Self::ContextUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;

/// Rejects zero-sized images before any GPU work is issued.
pub(crate) fn ensure_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(FilterError::InvalidDimensions { width, height });
    }
    Ok(())
}
