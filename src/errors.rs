use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bridge I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable {name} is not set")]
    MissingVar { name: &'static str },

    #[error("Environment variable {name} is empty")]
    EmptyVar { name: &'static str },
}

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("refusing to print {path:?}: path must stay inside the source root")]
    OutsideRoot { path: String },

    #[error("could not open source file {}: {source}", .path.display())]
    OpenSource { path: PathBuf, source: io::Error },

    #[error("could not rewind source file {}: {source}", .path.display())]
    Rewind { path: PathBuf, source: io::Error },

    #[error("could not open destination file {}: {source}", .path.display())]
    OpenDestination { path: PathBuf, source: io::Error },

    #[error("could not copy to {}: {source}", .path.display())]
    Transfer { path: PathBuf, source: io::Error },

    #[error("could not copy to {}: {transfer}\ncould not delete destination file: {cleanup}", .path.display())]
    Cleanup {
        path: PathBuf,
        transfer: io::Error,
        cleanup: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum BarcodeError {
    #[error("could not generate barcode from empty filepath")]
    EmptyPayload,

    #[error("cannot encode {ch:?} at position {position} as Code 128")]
    UnsupportedCharacter { ch: char, position: usize },

    #[error("cannot encode filepath as barcode: {0}")]
    Symbology(String),

    #[error("refusing to write barcode for {path:?}: path must stay inside the source root")]
    OutsideRoot { path: String },

    #[error("cannot create barcode png image {}: {source}", .path.display())]
    CreateFile { path: PathBuf, source: io::Error },

    #[error("cannot encode barcode to png file {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("cannot encode barcode to png file {}: {serialize}\ncould not delete partial image: {cleanup}", .path.display())]
    Cleanup {
        path: PathBuf,
        serialize: image::ImageError,
        cleanup: io::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;
