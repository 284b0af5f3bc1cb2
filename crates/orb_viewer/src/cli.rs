use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use orb_renderer::CameraSettings;
use orb_viewport::{KernelBackend, ViewportOptions};
use std::path::PathBuf;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Cpu,
    Gpu,
}

impl From<Backend> for KernelBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Cpu => KernelBackend::Cpu,
            Backend::Gpu => KernelBackend::Gpu,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Filter {
    Nearest,
    Linear,
}

impl From<Filter> for wgpu::FilterMode {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Nearest => wgpu::FilterMode::Nearest,
            Filter::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "orb_viewer")]
#[command(about = "Ray trace a sphere over a sky gradient, one ray per pixel")]
pub struct Args {
    /// Camera settings JSON file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Image width in pixels (window width, or the --output image)
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Vertical field of view in degrees
    #[arg(long)]
    pub vfov: Option<f32>,

    /// Where the kernel runs
    #[arg(long, value_enum, default_value = "gpu")]
    pub backend: Backend,

    /// Sampler filter used when drawing the image to the window
    #[arg(long, value_enum, default_value = "nearest")]
    pub filter: Filter,

    /// Render one frame on the CPU to this PNG and exit without a window
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Camera settings from the config file (or defaults) with flag overrides.
    pub fn camera_settings(&self) -> Result<CameraSettings> {
        let mut settings = match &self.config {
            Some(path) => CameraSettings::load(path)?,
            None => CameraSettings::default(),
        };

        if let Some(width) = self.width {
            settings.image_width = width;
        }
        if let Some(height) = self.height {
            settings.image_height = height;
        }
        if let Some(vfov) = self.vfov {
            settings.vfov = vfov;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn viewport_options(&self) -> Result<ViewportOptions> {
        Ok(ViewportOptions {
            backend: self.backend.into(),
            filter: self.filter.into(),
            camera: self.camera_settings()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["orb_viewer"]).unwrap();

        assert_eq!(args.backend, Backend::Gpu);
        assert_eq!(args.filter, Filter::Nearest);
        assert_eq!(args.log_level, LogLevel::Info);
        assert!(args.output.is_none());
        assert_eq!(args.camera_settings().unwrap(), CameraSettings::default());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "orb_viewer",
            "--width",
            "320",
            "--height",
            "240",
            "--vfov",
            "60",
            "--backend",
            "cpu",
            "--filter",
            "linear",
            "-o",
            "frame.png",
        ])
        .unwrap();

        let settings = args.camera_settings().unwrap();
        assert_eq!((settings.image_width, settings.image_height), (320, 240));
        assert_eq!(settings.vfov, 60.0);

        let options = args.viewport_options().unwrap();
        assert_eq!(options.backend, KernelBackend::Cpu);
        assert_eq!(options.filter, wgpu::FilterMode::Linear);
        assert_eq!(args.output, Some(PathBuf::from("frame.png")));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = Args::try_parse_from(["orb_viewer", "--width", "0"]).unwrap();
        assert!(args.camera_settings().is_err());
    }

    #[test]
    fn test_config_file() {
        let path = std::env::temp_dir().join(format!("orb_cli_config_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "image_width": 32, "vfov": 45.0 }"#).unwrap();

        let args =
            Args::try_parse_from(["orb_viewer", "--config", path.to_str().unwrap(), "--height", "16"])
                .unwrap();
        let settings = args.camera_settings();
        std::fs::remove_file(&path).ok();

        let settings = settings.unwrap();
        assert_eq!(settings.image_width, 32);
        assert_eq!(settings.image_height, 16);
        assert_eq!(settings.vfov, 45.0);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::Debug);
        assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::Error);
    }
}
