pub mod config;
pub mod files;

use crate::errors::AppError;
use std::fs;
use std::io;
use std::path::Path;

// fixed-encoding text read with a size cap; runs only on paths that already
// passed resolution, and existence is checked here rather than in the resolver
pub fn read_text(path: &Path, max_kb: usize) -> Result<String, AppError> {
    let meta = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => AppError::NotFound,
        _ => AppError::Internal(e.to_string()),
    })?;
    if !meta.is_file() {
        // A directory is not a readable file resource.
        return Err(AppError::NotFound);
    }
    if meta.len() > max_kb as u64 * 1024 {
        return Err(AppError::FileTooLarge);
    }
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AppError::NotFound,
        _ => AppError::Internal(e.to_string()),
    })
}
