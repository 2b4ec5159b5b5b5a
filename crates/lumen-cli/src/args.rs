use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;
use lumen_engine::{presets, ColorMatrix, DeviceInit};

/// Apply an SVG-style color matrix to images on the GPU.
#[derive(Parser, Debug)]
#[command(
    name = "lumen",
    about = "GPU color matrix image filter",
    long_about = "Filter images through a 5x4 color matrix (feColorMatrix semantics).\n\n\
                  Example:\n  \
                  lumen photo.jpg --filter sepia -o photo-sepia.png\n  \
                  lumen a.png b.png --filter grayscale --output-dir gray/\n  \
                  lumen photo.png -m \"0 0 1 0 0  0 1 0 0 0  1 0 0 0 0  0 0 0 1 0\""
)]
pub struct CliArgs {
    /// Input image file(s).
    #[arg(required_unless_present = "list", num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output file. Only valid with a single input.
    #[arg(short, long, value_name = "FILE", conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Directory for outputs; files keep their stem and are written as PNG.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Named filter (see --list).
    #[arg(short, long, value_name = "NAME", conflicts_with = "matrix")]
    pub filter: Option<String>,

    /// Explicit matrix: 20 numbers, row-major, separated by spaces or commas.
    #[arg(short, long, value_name = "COEFFICIENTS", allow_hyphen_values = true)]
    pub matrix: Option<String>,

    /// Print the available filter names and exit.
    #[arg(long)]
    pub list: bool,

    /// Prefer the low-power (integrated) GPU.
    #[arg(long)]
    pub low_power: bool,

    /// Use a software adapter.
    #[arg(long)]
    pub software: bool,

    /// Log filter in env_logger syntax (overrides RUST_LOG).
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

/// What to apply to each input.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChoice {
    Matrix { label: String, matrix: ColorMatrix },
    /// Unknown filter name; images pass through unmodified.
    Passthrough { requested: String },
}

impl FilterChoice {
    pub fn label(&self) -> &str {
        match self {
            FilterChoice::Matrix { label, .. } => label,
            FilterChoice::Passthrough { .. } => "original",
        }
    }
}

impl CliArgs {
    pub fn device_init(&self) -> DeviceInit {
        let mut init = if self.low_power {
            DeviceInit::low_power()
        } else {
            DeviceInit::default()
        };
        init.force_fallback_adapter = self.software;
        init
    }

    pub fn filter_choice(&self) -> Result<FilterChoice> {
        if let Some(text) = &self.matrix {
            let matrix = ColorMatrix::parse(text)?;
            return Ok(FilterChoice::Matrix {
                label: "matrix".to_string(),
                matrix,
            });
        }

        let Some(name) = &self.filter else {
            bail!("no filter given; pass --filter <NAME> or --matrix <COEFFICIENTS>");
        };
        Ok(match presets::lookup(name) {
            Some(matrix) => FilterChoice::Matrix {
                label: name.trim().to_lowercase().replace([' ', '-'], "_"),
                matrix,
            },
            None => FilterChoice::Passthrough {
                requested: name.clone(),
            },
        })
    }

    /// Output path for `input`.
    pub fn output_for(&self, input: &Path, label: &str) -> Result<PathBuf> {
        if let Some(out) = &self.output {
            if self.inputs.len() > 1 {
                bail!(
                    "{} inputs given but --output takes a single file; use --output-dir",
                    self.inputs.len()
                );
            }
            return Ok(out.clone());
        }

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let file = format!("{stem}-{label}.png");
        Ok(match &self.output_dir {
            Some(dir) => dir.join(file),
            None => input.with_file_name(file),
        })
    }

    /// Output paths for every input, in order.
    ///
    /// Fails when two inputs would be written to the same file, e.g.
    /// `a/x.png` and `b/x.jpg` under one `--output-dir`.
    pub fn output_paths(&self, label: &str) -> Result<Vec<PathBuf>> {
        let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
        let mut outputs = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let output = self.output_for(input, label)?;
            if let Some(first) = seen.insert(output.clone(), input) {
                bail!(
                    "{} and {} would both be written to {}",
                    first.display(),
                    input.display(),
                    output.display()
                );
            }
            outputs.push(output);
        }
        Ok(outputs)
    }
}
