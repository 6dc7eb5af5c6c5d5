use log::debug;
use std::fs;
use std::io::{IsTerminal, Read};
use std::path::Path;

use crate::errors::AppError;

// @module: Input gathering and output writing

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), AppError> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path).map_err(|e| {
                AppError::File(format!("error creating directory {:?}: {}", path, e))
            })?;
        }
        Ok(())
    }

    /// Read a text file used as input
    ///
    /// Files over `limit_kb` and files containing NUL bytes are rejected.
    pub fn read_input_file<P: AsRef<Path>>(path: P, limit_kb: usize) -> Result<String, AppError> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| AppError::File(format!("failed to read file {:?}: {}", path, e)))?;

        if bytes.len() > limit_kb * 1024 {
            return Err(AppError::InputTooLarge {
                origin: format!("file {:?} ({} bytes)", path, bytes.len()),
                limit_kb,
            });
        }

        Self::decode_text(bytes, &format!("{:?}", path))
    }

    /// Read at most `limit_kb` from `reader`
    pub fn read_limited<R: Read>(reader: R, limit_kb: usize, origin: &str) -> Result<String, AppError> {
        let limit = (limit_kb * 1024) as u64;
        let mut bytes = Vec::new();
        reader
            .take(limit + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| AppError::File(format!("failed to read {}: {}", origin, e)))?;

        if bytes.len() as u64 > limit {
            return Err(AppError::InputTooLarge {
                origin: origin.to_string(),
                limit_kb,
            });
        }

        Self::decode_text(bytes, origin)
    }

    /// Read piped stdin; `None` when stdin is a terminal
    pub fn read_stdin(limit_kb: usize) -> Result<Option<String>, AppError> {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Ok(None);
        }
        Self::read_limited(stdin.lock(), limit_kb, "stdin").map(Some)
    }

    /// Combine the input sources of one invocation
    ///
    /// Inline text and file contents are joined with a newline. `stdin` is
    /// only consulted when neither was given. Blank input is `MissingInput`.
    pub fn collect_input<F>(
        inline: Option<&str>,
        file: Option<&Path>,
        limit_kb: usize,
        stdin: F,
    ) -> Result<String, AppError>
    where
        F: FnOnce(usize) -> Result<Option<String>, AppError>,
    {
        let mut parts = Vec::new();

        if let Some(text) = inline.filter(|text| !text.is_empty()) {
            parts.push(text.to_string());
        }

        if let Some(path) = file {
            debug!("Reading input from {:?}", path);
            parts.push(Self::read_input_file(path, limit_kb)?);
        }

        if parts.is_empty() {
            if let Some(piped) = stdin(limit_kb)? {
                debug!("Read {} bytes from stdin", piped.len());
                parts.push(piped);
            }
        }

        let input = parts.join("\n");
        if input.trim().is_empty() {
            return Err(AppError::MissingInput);
        }
        Ok(input)
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<(), AppError> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .map_err(|e| AppError::File(format!("error writing file {:?}: {}", path.as_ref(), e)))
    }

    fn decode_text(bytes: Vec<u8>, origin: &str) -> Result<String, AppError> {
        // NUL bytes mean an executable or other binary was passed by accident
        if bytes.contains(&0) {
            return Err(AppError::BinaryInput(origin.to_string()));
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
