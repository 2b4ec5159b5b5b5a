/// Initialization parameters for the headless GPU context.
///
/// Keep this minimal. Add flags only when a concrete backend requirement
/// exists.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Adapter preference.
    ///
    /// Filters are short one-shot draws; high performance is the default.
    pub power_preference: wgpu::PowerPreference,

    /// Backends wgpu may pick from.
    pub backends: wgpu::Backends,

    /// Force a software adapter (e.g. WARP, llvmpipe).
    pub force_fallback_adapter: bool,

    /// Limits requested from the device.
    ///
    /// `None` requests downlevel defaults with the adapter's full 2D texture
    /// size, so large photos are accepted wherever the hardware allows.
    pub required_limits: Option<wgpu::Limits>,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            backends: wgpu::Backends::all(),
            force_fallback_adapter: false,
            required_limits: None,
        }
    }
}

impl DeviceInit {
    /// Same as default but prefers the integrated/low-power adapter.
    pub fn low_power() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::LowPower,
            ..Self::default()
        }
    }

    /// Same as default but requires a software adapter.
    pub fn software() -> Self {
        Self {
            force_fallback_adapter: true,
            ..Self::default()
        }
    }

    pub(crate) fn limits_for(&self, adapter: &wgpu::Limits) -> wgpu::Limits {
        self.required_limits.clone().unwrap_or_else(|| wgpu::Limits {
            max_texture_dimension_2d: adapter.max_texture_dimension_2d,
            ..wgpu::Limits::downlevel_defaults()
        })
    }
}
