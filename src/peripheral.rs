use serde::{Deserialize, Serialize};

use super::{register::RegisterSpec, FieldSpec};

/// One concrete placement of a peripheral's register layout in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
  /// Name of the SVD peripheral node that placed this instance.
  pub name: String,

  /// Lowest address reserved or used by the instance.
  pub base_address: u32,
}
impl InstanceSpec {
  pub fn new(name: &str, base_address: u32) -> Self {
    Self {
      name: name.to_owned(),
      base_address,
    }
  }

  /// Name of the generated address macro.
  pub fn address_macro(&self) -> String {
    format!("{}_ADDRESS", self.name)
  }
}

/// Where the instances of a peripheral live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
  /// Exactly one instance, identified by the peripheral's canonical name.
  Singleton { base_address: u32 },

  /// Several instances sharing one register layout, sorted by ascending base address.
  Family { instances: Vec<InstanceSpec> },
}

/// Describes a normalized peripheral: one register layout and every place it is instantiated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheralSpec {
  /// Canonical generation name. Unique for the entire device.
  pub name: String,

  /// Overview of the purpose and functionality of the peripheral.
  pub description: String,

  pub placement: Placement,

  /// Registers shared by every instance, in schema order.
  pub registers: Vec<RegisterSpec>,
}
impl PeripheralSpec {
  /// The concrete instances of this peripheral. A singleton has one instance carrying the
  /// peripheral's own name.
  pub fn instances(&self) -> Vec<InstanceSpec> {
    match self.placement {
      Placement::Singleton { base_address } => vec![InstanceSpec::new(&self.name, base_address)],
      Placement::Family { ref instances } => instances.clone(),
    }
  }

  pub fn is_singleton(&self) -> bool {
    matches!(self.placement, Placement::Singleton { .. })
  }

  /// Lower-case C++ namespace holding the peripheral's declarations.
  pub fn namespace(&self) -> String {
    self.name.to_lowercase()
  }

  /// Iterates all the register fields contained within this peripheral.
  pub fn iter_fields(&self) -> impl Iterator<Item = (&RegisterSpec, &FieldSpec)> {
    self
      .registers
      .iter()
      .flat_map(|r| r.fields.iter().map(move |f| (r, f)))
  }

  /// Distance in bytes from the first register to the register at `index`. Register addresses are
  /// derived from the first register's address, so moving the base address moves every register.
  pub fn register_displacement(&self, index: usize) -> i64 {
    match (self.registers.first(), self.registers.get(index)) {
      (Some(first), Some(register)) => {
        i64::from(register.address_offset) - i64::from(first.address_offset)
      }
      _ => 0,
    }
  }

  /// Absolute address of the first register of an instance placed at `base_address`.
  pub fn first_register_address(&self, base_address: u32) -> u64 {
    let offset = self.registers.first().map_or(0, |r| r.address_offset);
    u64::from(base_address) + u64::from(offset)
  }
}
