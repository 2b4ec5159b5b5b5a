mod args;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::{presets, ColorMatrixRenderer, Gpu, Image};

use args::{CliArgs, FilterChoice};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..Default::default()
    });

    if args.list {
        for name in presets::names() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let choice = args.filter_choice()?;
    if let FilterChoice::Passthrough { requested } = &choice {
        log::warn!("unknown filter {requested:?}; images are written unmodified");
    }

    // One renderer for the whole batch so the context and program are reused.
    let mut renderer = match &choice {
        FilterChoice::Matrix { .. } => match ColorMatrixRenderer::with_init(&args.device_init()) {
            Ok(r) => Some(r),
            Err(e) if e.is_context_unavailable() => {
                log::warn!("{e}; images are written unmodified");
                None
            }
            Err(e) => return Err(e.into()),
        },
        FilterChoice::Passthrough { .. } => None,
    };

    let outputs = args.output_paths(choice.label())?;

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    for (input, output) in args.inputs.iter().zip(&outputs) {
        process(input, output, &choice, renderer.as_mut())
            .with_context(|| format!("failed to filter {}", input.display()))?;
        log::info!("{} -> {}", input.display(), output.display());
    }
    Ok(())
}

fn process(
    input: &Path,
    output: &Path,
    choice: &FilterChoice,
    renderer: Option<&mut ColorMatrixRenderer<Gpu>>,
) -> Result<()> {
    let source = load(input)?;

    let filtered = match (choice, renderer) {
        (FilterChoice::Matrix { matrix, .. }, Some(renderer)) => {
            renderer.render_matrix(&source, matrix)?
        }
        _ => source,
    };

    save(filtered, output)
}

fn load(path: &Path) -> Result<Image> {
    let rgba = image::open(path)
        .with_context(|| format!("failed to decode {}", path.display()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Image::from_rgba8(width, height, rgba.into_raw()))
}

fn save(img: Image, path: &Path) -> Result<()> {
    let buffer = image::RgbaImage::from_raw(img.width, img.height, img.pixels)
        .context("filtered pixel buffer does not match its dimensions")?;
    buffer
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_engine::ColorMatrix;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "lumen_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_sample(path: &Path) -> image::RgbaImage {
        let img = image::RgbaImage::from_fn(5, 3, |x, y| {
            image::Rgba([(x * 50) as u8, (y * 80) as u8, 17, 255 - (x * 10) as u8])
        });
        img.save(path).unwrap();
        img
    }

    #[test]
    fn unknown_filter_writes_input_unmodified() {
        let dir = temp_dir("passthrough");
        let input = dir.join("in.png");
        let output = dir.join("out.png");
        let expected = write_sample(&input);

        let choice = FilterChoice::Passthrough {
            requested: "sparkles".into(),
        };
        process(&input, &output, &choice, None).unwrap();

        assert_eq!(image::open(&output).unwrap().to_rgba8(), expected);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_gpu_writes_input_unmodified() {
        let dir = temp_dir("no_gpu");
        let input = dir.join("in.png");
        let output = dir.join("out.png");
        let expected = write_sample(&input);

        let choice = FilterChoice::Matrix {
            label: "grayscale".into(),
            matrix: ColorMatrix::saturate(0.0),
        };
        process(&input, &output, &choice, None).unwrap();

        assert_eq!(image::open(&output).unwrap().to_rgba8(), expected);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn undecodable_input_is_an_error() {
        let dir = temp_dir("bad_input");
        let input = dir.join("in.png");
        std::fs::write(&input, b"not a png").unwrap();

        let choice = FilterChoice::Passthrough {
            requested: "sparkles".into(),
        };
        assert!(process(&input, &dir.join("out.png"), &choice, None).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
