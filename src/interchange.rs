//! Lossless JSON snapshot of the normalized peripheral model.

use log::info;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::{
  error::{CodegenError, CodegenResult},
  DeviceSpec, PeripheralSpec,
};

/// Version written to and required from every interchange document.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
  format_version: u32,
  peripherals: Vec<PeripheralSpec>,
}

/// Serializes the model. Identical models always produce identical text.
pub fn to_json(device: &DeviceSpec) -> CodegenResult<String> {
  let document = Document {
    format_version: FORMAT_VERSION,
    peripherals: device.peripherals.clone(),
  };
  let mut text = serde_json::to_string_pretty(&document)?;
  text.push('\n');
  Ok(text)
}

pub fn from_json(text: &str) -> CodegenResult<DeviceSpec> {
  let document: Document = serde_json::from_str(text)?;

  if document.format_version != FORMAT_VERSION {
    return Err(CodegenError::interchange(&format!(
      "unsupported format version {} (expected {})",
      document.format_version, FORMAT_VERSION
    )));
  }

  Ok(DeviceSpec {
    peripherals: document.peripherals,
  })
}

pub fn save<P: AsRef<Path>>(device: &DeviceSpec, path: P) -> CodegenResult<()> {
  fs::write(path.as_ref(), to_json(device)?)?;
  info!(
    "wrote {} peripherals to {}",
    device.peripherals.len(),
    path.as_ref().display()
  );
  Ok(())
}

pub fn load<P: AsRef<Path>>(path: P) -> CodegenResult<DeviceSpec> {
  from_json(&fs::read_to_string(path)?)
}
