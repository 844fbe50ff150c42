//! Optional reformatting of written headers by an external tool.

use log::debug;
use std::{
  path::{Path, PathBuf},
  process::Command,
};

use crate::error::{CodegenError, CodegenResult};

/// Something able to reformat generated files in place.
pub trait Formatter {
  /// Reformats `files`. The files already hold valid output, so callers treat a failure as
  /// non-fatal.
  fn format(&self, files: &[PathBuf]) -> CodegenResult<()>;
}

/// Runs `clang-format -i` over a batch of files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClangFormat {
  pub executable: PathBuf,

  /// Value of the `--style` option, `file` to pick up the nearest `.clang-format`.
  pub style: String,
}
impl ClangFormat {
  pub fn new<P: AsRef<Path>>(executable: P, style: &str) -> Self {
    Self {
      executable: executable.as_ref().to_path_buf(),
      style: style.to_owned(),
    }
  }
}
impl Formatter for ClangFormat {
  fn format(&self, files: &[PathBuf]) -> CodegenResult<()> {
    if files.is_empty() {
      return Ok(());
    }

    debug!(
      "running {} on {} files",
      self.executable.display(),
      files.len()
    );

    let status = Command::new(&self.executable)
      .arg(format!("--style={}", self.style))
      .arg("-i")
      .args(files)
      .status()
      .map_err(|e| CodegenError::Io {
        details: format!("could not run {}: {}", self.executable.display(), e),
      })?;

    if status.success() {
      Ok(())
    } else {
      Err(CodegenError::Io {
        details: format!("{} exited with {}", self.executable.display(), status),
      })
    }
  }
}
