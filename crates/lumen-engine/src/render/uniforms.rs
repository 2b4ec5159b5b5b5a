//! Uniform blocks shared by the two shader stages.

use bytemuck::{Pod, Zeroable};

use crate::matrix::{LinearMatrix4, OffsetVector4};

/// Vertex-stage block: image size in pixels for the pixel → NDC mapping.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ResolutionUniform {
    pub size: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

/// Fragment-stage block: linear part as `mat4x4<f32>` plus offsets.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ColorTransformUniform {
    pub matrix: [[f32; 4]; 4], // column i = weights of output channel i
    pub offset: [f32; 4],
}

/// Everything a draw needs bound besides the texture.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FilterUniforms {
    pub resolution: [f32; 2],
    pub matrix: LinearMatrix4,
    pub offset: OffsetVector4,
}

impl FilterUniforms {
    pub fn new(width: u32, height: u32, matrix: LinearMatrix4, offset: OffsetVector4) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            matrix,
            offset,
        }
    }

    pub fn resolution_block(&self) -> ResolutionUniform {
        ResolutionUniform {
            size: self.resolution,
            _pad: [0.0; 2],
        }
    }

    pub fn transform_block(&self) -> ColorTransformUniform {
        ColorTransformUniform {
            matrix: self.matrix.columns(),
            offset: self.offset.0,
        }
    }
}

/// Minimum binding size of a uniform block, for bind group layouts.
pub(crate) fn min_binding_size<T>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}
