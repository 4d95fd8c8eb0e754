//! Fifth strategy: the DirectXTex `texconv` command line tool.
//!
//! Only available when the executable can be found. texconv writes
//! `<stem>.png` into the directory given with `-o`; that directory is a
//! scratch folder, so nothing reaches the output path unless the whole
//! conversion succeeded.

use super::{normalize, persist_png, DdsDecoder, DecodedImage};
use crate::error::DecodeError;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Shells out to texconv for everything the in-process decoders reject.
#[derive(Debug, Clone)]
pub struct TexconvDecoder {
    program: PathBuf,
}

impl TexconvDecoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Resolve the configured program to an executable file.
    ///
    /// A bare name is searched on `PATH`; anything with a directory component
    /// is checked as-is.
    pub fn locate(&self) -> Option<PathBuf> {
        which::which(&self.program).ok()
    }
}

impl Default for TexconvDecoder {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TEXCONV)
    }
}

impl DdsDecoder for TexconvDecoder {
    fn name(&self) -> &'static str {
        "texconv"
    }

    fn decode(&self, input: &Path, output: &Path) -> Result<DecodedImage, DecodeError> {
        let program = self
            .locate()
            .ok_or_else(|| DecodeError::ToolMissing(self.program.display().to_string()))?;

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let scratch = tempfile::Builder::new()
            .prefix(".dds2png-texconv-")
            .tempdir_in(dir)?;

        debug!("Running {} on {}", program.display(), input.display());
        let result = Command::new(&program)
            .args(["-nologo", "-y", "-ft", "png", "-o"])
            .arg(scratch.path())
            .arg(input)
            .output()?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let stdout = String::from_utf8_lossy(&result.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(DecodeError::ToolFailed {
                tool: "texconv".to_string(),
                status: result.status.to_string(),
                stderr: detail,
            });
        }

        let produced = find_png(scratch.path(), input)?;
        let image = normalize::from_dynamic(image::open(&produced)?)?;
        persist_png(&image, output)?;
        Ok(image)
    }
}

/// Locate the PNG texconv wrote: `<stem>.png`, or failing that, the only
/// PNG in the scratch folder (texconv may change the extension's case).
fn find_png(dir: &Path, input: &Path) -> Result<PathBuf, DecodeError> {
    let mut name = input
        .file_stem()
        .unwrap_or_else(|| OsStr::new(""))
        .to_os_string();
    name.push(".png");
    let expected = dir.join(name);
    if expected.is_file() {
        return Ok(expected);
    }

    fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("png"))
                .unwrap_or(false)
        })
        .ok_or_else(|| {
            DecodeError::UnsupportedFormat("texconv produced no PNG output".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_path() {
        let decoder = TexconvDecoder::new("/nonexistent/tools/texconv");
        assert!(decoder.locate().is_none());

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        let result = decoder.decode(&dir.path().join("in.dds"), &output);

        assert!(matches!(result, Err(DecodeError::ToolMissing(_))));
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_path_found() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("texconv");
        fs::write(&tool, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

        let decoder = TexconvDecoder::new(&tool);
        assert_eq!(decoder.locate(), Some(tool));
    }

    #[test]
    fn test_unknown_bare_name_not_found() {
        let decoder = TexconvDecoder::new("dds2png-no-such-tool");
        assert!(decoder.locate().is_none());
    }

    #[test]
    fn test_find_png_accepts_upper_case_extension() {
        let dir = tempfile::tempdir().unwrap();
        let produced = dir.path().join("Other.PNG");
        fs::write(&produced, b"").unwrap();

        let found = find_png(dir.path(), Path::new("/src/rock.dds")).unwrap();
        assert_eq!(found, produced);
    }

    #[test]
    fn test_find_png_prefers_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"").unwrap();
        fs::write(dir.path().join("rock.png"), b"").unwrap();

        let found = find_png(dir.path(), Path::new("/src/rock.dds")).unwrap();
        assert_eq!(found, dir.path().join("rock.png"));
    }
}
