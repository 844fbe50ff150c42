use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{peripheral::PeripheralSpec, FieldSpec, RegisterSpec};
use crate::{
  config::ModelConfig,
  error::{CodegenError, CodegenResult},
  extract::{self, PeripheralRecord},
  Placement,
};

/// The normalized peripheral model of a device. This is the form rendered by the emitter and
/// stored in the interchange document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSpec {
  /// Peripherals in schema order.
  pub peripherals: Vec<PeripheralSpec>,
}
impl DeviceSpec {
  pub fn from_xml(xml: &str, config: &ModelConfig) -> CodegenResult<Self> {
    Self::build(extract::extract_xml(xml)?, config)
  }

  /// Filters the extracted records by group and normalizes each one into a singleton or a family
  /// of address-sorted instances.
  pub fn build(records: Vec<PeripheralRecord>, config: &ModelConfig) -> CodegenResult<Self> {
    let total = records.len();
    let mut peripherals = Vec::with_capacity(total);

    for record in records.into_iter().filter(|r| config.includes(&r.group)) {
      peripherals.push(Self::normalize(record, config)?);
    }

    let device = Self { peripherals };
    device.check_unique_names()?;

    info!(
      "normalized {} of {} peripherals ({} instances)",
      device.peripherals.len(),
      total,
      device.instance_count()
    );

    Ok(device)
  }

  fn normalize(mut record: PeripheralRecord, config: &ModelConfig) -> CodegenResult<PeripheralSpec> {
    let (name, placement) = match record.instances.len() {
      0 => {
        return Err(CodegenError::schema(
          &record.group,
          "peripheral has no instances",
        ))
      }
      1 => {
        let instance = record.instances.remove(0);
        let name = if config.keeps_instance_name(&record.group) {
          instance.name
        } else {
          record.group
        };
        (
          name,
          Placement::Singleton {
            base_address: instance.base_address,
          },
        )
      }
      _ => {
        record.instances.sort_by_key(|i| i.base_address);
        (
          record.group,
          Placement::Family {
            instances: record.instances,
          },
        )
      }
    };

    debug!("normalized peripheral {} as {:?}", name, placement);

    Ok(PeripheralSpec {
      name,
      description: record.description,
      placement,
      registers: record.registers,
    })
  }

  /// Two peripherals generating the same name would overwrite each other's headers.
  fn check_unique_names(&self) -> CodegenResult<()> {
    for (n, peripheral) in self.peripherals.iter().enumerate() {
      if self.peripherals[..n].iter().any(|p| p.name == peripheral.name) {
        return Err(CodegenError::schema(
          &peripheral.name,
          "more than one peripheral generates this name",
        ));
      }
    }
    Ok(())
  }

  pub fn get_peripheral(&self, name: &str) -> Option<&PeripheralSpec> {
    self.peripherals.iter().find(|p| p.name == name)
  }

  pub fn instance_count(&self) -> usize {
    self.peripherals.iter().map(|p| p.instances().len()).sum()
  }

  pub fn iter_registers(&self) -> impl Iterator<Item = &RegisterSpec> {
    self.peripherals.iter().flat_map(|p| p.registers.iter())
  }

  pub fn iter_fields(&self) -> impl Iterator<Item = &FieldSpec> {
    self.iter_registers().flat_map(|r| r.fields.iter())
  }
}
