//! Writes rendered artifacts below an output directory.

use log::{info, warn};
use std::{
  fs,
  path::{Path, PathBuf},
};

use crate::{
  emit::{Artifact, ArtifactKind},
  error::CodegenResult,
  format::Formatter,
};

/// Files touched by one [`write`] call, as full paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
  pub written: Vec<PathBuf>,

  /// Driver stubs that already existed and were left alone.
  pub preserved: Vec<PathBuf>,

  /// Directories whose formatting failed. Their files are written, just not reformatted.
  pub unformatted: Vec<PathBuf>,
}

/// Options of a single [`write`] call.
#[derive(Default)]
pub struct WriteOptions<'a> {
  /// Replace existing driver stubs instead of preserving hand-written specializations.
  pub overwrite_drivers: bool,

  pub formatter: Option<&'a dyn Formatter>,
}

/// Writes every artifact below `root`, creating directories as needed. Artifacts are handled one
/// directory at a time; once a directory is complete the formatter, if any, runs once over the
/// files just written there.
pub fn write<P: AsRef<Path>>(
  artifacts: &[Artifact],
  root: P,
  options: &WriteOptions,
) -> CodegenResult<WriteReport> {
  let root = root.as_ref();
  let mut report = WriteReport::default();

  for (dir, group) in by_directory(artifacts) {
    let dir = root.join(dir);
    fs::create_dir_all(&dir)?;

    let mut written = Vec::with_capacity(group.len());
    for artifact in group {
      let path = root.join(&artifact.path);

      if artifact.kind == ArtifactKind::Driver && !options.overwrite_drivers && path.exists() {
        warn!("keeping existing driver {}", path.display());
        report.preserved.push(path);
        continue;
      }

      fs::write(&path, artifact.render())?;
      written.push(path);
    }

    if let Some(formatter) = options.formatter {
      if let Err(e) = formatter.format(&written) {
        warn!("could not format {}: {}", dir.display(), e);
        report.unformatted.push(dir);
      }
    }

    report.written.extend(written);
  }

  info!(
    "wrote {} files to {} ({} drivers preserved)",
    report.written.len(),
    root.display(),
    report.preserved.len()
  );

  Ok(report)
}

/// Groups artifacts by their parent directory, in order of first appearance.
fn by_directory(artifacts: &[Artifact]) -> Vec<(PathBuf, Vec<&Artifact>)> {
  let mut groups: Vec<(PathBuf, Vec<&Artifact>)> = Vec::new();

  for artifact in artifacts {
    let dir = artifact
      .path
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_default();

    match groups.iter_mut().find(|(d, _)| *d == dir) {
      Some((_, group)) => group.push(artifact),
      None => groups.push((dir, vec![artifact])),
    }
  }

  groups
}

#[cfg(test)]
mod tests {
  use super::{write, WriteOptions};
  use crate::{
    config::EmitConfig,
    emit::{self, Selection},
    error::{CodegenError, CodegenResult},
    format::Formatter,
    DeviceSpec, PeripheralSpec, Placement,
  };
  use std::{cell::RefCell, fs, path::PathBuf};

  /// Records every batch it is asked to format, optionally failing.
  struct Recorder {
    calls: RefCell<Vec<Vec<PathBuf>>>,
    fail: bool,
  }
  impl Recorder {
    fn new(fail: bool) -> Self {
      Self {
        calls: RefCell::new(Vec::new()),
        fail,
      }
    }
  }
  impl Formatter for Recorder {
    fn format(&self, files: &[PathBuf]) -> CodegenResult<()> {
      self.calls.borrow_mut().push(files.to_vec());
      if self.fail {
        Err(CodegenError::Io {
          details: "formatter crashed".to_owned(),
        })
      } else {
        Ok(())
      }
    }
  }

  fn device() -> DeviceSpec {
    DeviceSpec {
      peripherals: vec![PeripheralSpec {
        name: "RCC".to_owned(),
        description: "Reset and clock control".to_owned(),
        placement: Placement::Singleton {
          base_address: 0x4002_3800,
        },
        registers: Vec::new(),
      }],
    }
  }

  fn artifacts() -> Vec<emit::Artifact> {
    emit::generate(&device(), &EmitConfig::default(), Selection::all())
  }

  #[test]
  fn writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();

    let report = write(&artifacts(), dir.path(), &WriteOptions::default()).unwrap();

    assert_eq!(6, report.written.len());
    for name in &[
      "Base/RCC.h",
      "Fields/RCC.h",
      "Drivers/RCC.h",
      "Registers/RCC.h",
      "registers.h",
      "addresses.h",
    ] {
      assert!(dir.path().join(name).is_file(), "{} missing", name);
    }
    assert_eq!(
      "#pragma once\n\n#include \"Registers/RCC.h\"\n",
      fs::read_to_string(dir.path().join("registers.h")).unwrap()
    );
  }

  #[test]
  fn preserves_existing_driver_stub() {
    let dir = tempfile::tempdir().unwrap();
    let driver = dir.path().join("Drivers/RCC.h");
    fs::create_dir_all(driver.parent().unwrap()).unwrap();
    fs::write(&driver, "// hand written\n").unwrap();

    let report = write(&artifacts(), dir.path(), &WriteOptions::default()).unwrap();

    assert_eq!(vec![driver.clone()], report.preserved);
    assert_eq!("// hand written\n", fs::read_to_string(&driver).unwrap());
  }

  #[test]
  fn overwrites_driver_stub_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let driver = dir.path().join("Drivers/RCC.h");
    fs::create_dir_all(driver.parent().unwrap()).unwrap();
    fs::write(&driver, "// hand written\n").unwrap();

    let options = WriteOptions {
      overwrite_drivers: true,
      ..WriteOptions::default()
    };
    let report = write(&artifacts(), dir.path(), &options).unwrap();

    assert!(report.preserved.is_empty());
    assert!(fs::read_to_string(&driver)
      .unwrap()
      .contains("class Driver"));
  }

  #[test]
  fn formats_once_per_directory() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new(false);

    let options = WriteOptions {
      formatter: Some(&recorder),
      ..WriteOptions::default()
    };
    let report = write(&artifacts(), dir.path(), &options).unwrap();

    let calls = recorder.calls.borrow();
    assert_eq!(5, calls.len());
    assert_eq!(vec![dir.path().join("Base/RCC.h")], calls[0]);
    assert_eq!(
      vec![dir.path().join("registers.h"), dir.path().join("addresses.h")],
      calls[4]
    );
    assert!(report.unformatted.is_empty());
  }

  #[test]
  fn formatter_failure_keeps_written_files() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new(true);

    let options = WriteOptions {
      formatter: Some(&recorder),
      ..WriteOptions::default()
    };
    let report = write(&artifacts(), dir.path(), &options).unwrap();

    assert_eq!(6, report.written.len());
    assert_eq!(5, report.unformatted.len());
    assert!(dir.path().join("addresses.h").is_file());
  }
}
