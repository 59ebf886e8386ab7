use image::{AnimationDecoder, codecs::gif::GifDecoder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use spinner::{LayoutSpec, PixelBuffer, SpinnerError, SpinnerSettings, VectorizeOptions};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Still-image extensions picked up when the input is a directory.
pub const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    ImageError(#[from] image::ImageError),
    #[error(transparent)]
    SpinnerError(#[from] SpinnerError),
    #[error("No frames found in {0}")]
    NoFrames(PathBuf),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// One spinner build: where frames come from, where the design goes and how
/// it is made.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SpinnerJob {
    /// GIF, still image or directory of images
    pub input: String,
    /// Design JSON written by `build` and `layout`
    pub output: String,
    #[serde(default)]
    pub vectorize: VectorizeOptions,
    #[serde(default)]
    pub layout: LayoutSpec,
}

impl SpinnerJob {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            vectorize: VectorizeOptions::default(),
            layout: LayoutSpec::default(),
        }
    }

    /// Conversion and layout settings of this job
    pub fn settings(&self) -> SpinnerSettings {
        SpinnerSettings {
            vectorize: self.vectorize.clone(),
            layout: self.layout.clone(),
        }
    }

    /// Load job configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load job configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// Save the job to `path`, choosing the format from its extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let path_ref = path.as_ref();
        let content = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(CliError::UnsupportedFileFormat),
        };
        fs::write(path_ref, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }
}

/// Decode the frames behind `path`.
///
/// A GIF yields every composited animation frame, a directory yields its
/// images sorted by file name, anything else is opened as a single image.
pub fn load_frames<P: AsRef<Path>>(path: P) -> Result<Vec<PixelBuffer>, CliError> {
    let path = path.as_ref();
    let buffers = if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_frame_extension(p))
            .collect();
        files.sort();
        files
            .iter()
            .map(|file| Ok(PixelBuffer::from_image(image::open(file)?.to_rgba8())?))
            .collect::<Result<Vec<_>, CliError>>()?
    } else if is_gif(path) {
        let decoder = GifDecoder::new(BufReader::new(fs::File::open(path)?))?;
        decoder
            .into_frames()
            .collect_frames()?
            .into_iter()
            .map(|frame| Ok(PixelBuffer::from_image(frame.into_buffer())?))
            .collect::<Result<Vec<_>, CliError>>()?
    } else {
        vec![PixelBuffer::from_image(image::open(path)?.to_rgba8())?]
    };

    if buffers.is_empty() {
        return Err(CliError::NoFrames(path.to_path_buf()));
    }
    Ok(buffers)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn is_gif(path: &Path) -> bool {
    extension(path).as_deref() == Some("gif")
}

fn has_frame_extension(path: &Path) -> bool {
    extension(path).is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.as_str()))
}
