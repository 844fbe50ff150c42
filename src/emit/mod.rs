//! Renders the normalized model into the generated header families.
//!
//! Every emitter is a pure function from the model to a [`Document`]; nothing here touches the
//! filesystem. Given the same model and configuration, [`generate`] returns identical artifacts.

mod addresses;
mod aggregate;
mod base;
pub mod document;
mod driver;
mod fields;

use std::path::PathBuf;

pub use self::document::{Class, Document, Item, Struct};
use crate::{config::EmitConfig, DeviceSpec, FieldSpec, PeripheralSpec, RegisterSpec};

pub const BASE_DIR: &str = "Base";
pub const FIELDS_DIR: &str = "Fields";
pub const DRIVERS_DIR: &str = "Drivers";
pub const REGISTERS_DIR: &str = "Registers";
pub const MASTER_FILE: &str = "registers.h";
pub const ADDRESSES_FILE: &str = "addresses.h";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
  /// Register layout template of one peripheral.
  Base,
  /// Field and value accessor templates of one peripheral.
  Fields,
  /// Hand-extensible driver stub of one peripheral.
  Driver,
  /// Binds one peripheral's layout to its instance addresses.
  Aggregate,
  /// Includes every aggregation header.
  Master,
  /// Instance addresses and simulated register storage.
  Addresses,
}

/// One generated file, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
  pub kind: ArtifactKind,
  pub path: PathBuf,
  pub document: Document,
}
impl Artifact {
  fn peripheral(
    kind: ArtifactKind,
    dir: &str,
    peripheral: &PeripheralSpec,
    document: Document,
  ) -> Self {
    Self {
      kind,
      path: PathBuf::from(dir).join(header_name(peripheral)),
      document,
    }
  }

  pub fn render(&self) -> String {
    self.document.render()
  }
}

/// Which optional header families to generate. Aggregation headers, the master include and the
/// address table are always generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
  pub base: bool,
  pub fields: bool,
  pub drivers: bool,
}
impl Selection {
  pub fn all() -> Self {
    Self {
      base: true,
      fields: true,
      drivers: true,
    }
  }

  pub fn none() -> Self {
    Self {
      base: false,
      fields: false,
      drivers: false,
    }
  }
}
impl Default for Selection {
  fn default() -> Self {
    Self::all()
  }
}

/// Renders every selected artifact of the device. Artifacts are grouped by family; within a
/// family, peripherals keep schema order.
pub fn generate(device: &DeviceSpec, config: &EmitConfig, selection: Selection) -> Vec<Artifact> {
  let mut artifacts = Vec::new();

  if selection.base {
    artifacts.extend(device.peripherals.iter().map(|p| {
      Artifact::peripheral(ArtifactKind::Base, BASE_DIR, p, base::render(p, config))
    }));
  }

  if selection.fields {
    artifacts.extend(device.peripherals.iter().map(|p| {
      Artifact::peripheral(ArtifactKind::Fields, FIELDS_DIR, p, fields::render(p, config))
    }));
  }

  if selection.drivers {
    artifacts.extend(device.peripherals.iter().map(|p| {
      Artifact::peripheral(ArtifactKind::Driver, DRIVERS_DIR, p, driver::render(p, config))
    }));
  }

  artifacts.extend(device.peripherals.iter().map(|p| {
    Artifact::peripheral(
      ArtifactKind::Aggregate,
      REGISTERS_DIR,
      p,
      aggregate::render(p, config),
    )
  }));

  artifacts.push(Artifact {
    kind: ArtifactKind::Master,
    path: PathBuf::from(MASTER_FILE),
    document: aggregate::render_master(device),
  });

  artifacts.push(Artifact {
    kind: ArtifactKind::Addresses,
    path: PathBuf::from(ADDRESSES_FILE),
    document: addresses::render(device, config),
  });

  artifacts
}

fn header_name(peripheral: &PeripheralSpec) -> String {
  format!("{}.h", peripheral.name)
}

/// `<namespace>::<peripheral namespace>`
fn peripheral_namespace(peripheral: &PeripheralSpec, config: &EmitConfig) -> String {
  format!("{}::{}", config.namespace, peripheral.namespace())
}

/// Identifier of the name string generated for a field or value.
fn name_ident(name: &str) -> String {
  format!("{}_name", name.to_lowercase())
}

/// Accessor template generated for a field, e.g. `MODER_MODER0`.
fn field_type_name(register: &RegisterSpec, field: &FieldSpec) -> String {
  format!("{}_{}", register.name, field.name)
}
