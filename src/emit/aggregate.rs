use super::{
  base,
  document::{Document, Item, Struct},
  peripheral_namespace, ADDRESSES_FILE, BASE_DIR, DRIVERS_DIR, REGISTERS_DIR,
};
use crate::{config::EmitConfig, DeviceSpec, InstanceSpec, PeripheralSpec};

/// Alias naming the bound layout of a singleton peripheral.
const SINGLETON_ALIAS: &str = "Registers";

/// Name of the alias binding the layout template to one instance's addresses, within the
/// peripheral namespace.
fn alias(peripheral: &PeripheralSpec, instance: &InstanceSpec) -> String {
  if peripheral.is_singleton() {
    SINGLETON_ALIAS.to_owned()
  } else {
    instance.name.clone()
  }
}

/// Binds the peripheral's layout to each instance's address macro and declares one top-level
/// struct per instance pairing the registers with the driver.
pub(super) fn render(peripheral: &PeripheralSpec, config: &EmitConfig) -> Document {
  let instances = peripheral.instances();
  let namespace = peripheral.namespace();
  let layout = base::class_name(peripheral);

  let mut doc = Document::header();
  doc.push(Item::include(ADDRESSES_FILE));
  doc.push(Item::include("targets.h"));
  doc.push(Item::include(&format!("{}/{}.h", BASE_DIR, peripheral.name)));
  doc.push(Item::include(&format!("{}/{}.h", DRIVERS_DIR, peripheral.name)));
  doc.push(Item::Blank);

  doc.push(Item::namespace(
    &peripheral_namespace(peripheral, config),
    instances
      .iter()
      .map(|i| {
        Item::using(
          &alias(peripheral, i),
          format!("{}<Target, {}>", layout, i.address_macro()),
          None,
        )
      })
      .collect(),
  ));
  doc.push(Item::Blank);

  doc.push(Item::namespace(
    &config.namespace,
    instances
      .iter()
      .map(|i| {
        let registers = format!("{}::{}", namespace, alias(peripheral, i));
        Item::Struct(Struct {
          name: i.name.clone(),
          items: vec![Item::using(
            "Driver",
            format!("{}::Driver<{}>", namespace, registers),
            None,
          )],
          base: Some(registers),
          compact: true,
        })
      })
      .collect(),
  ));
  doc
}

/// Includes the aggregation header of every peripheral, in schema order.
pub(super) fn render_master(device: &DeviceSpec) -> Document {
  let mut doc = Document::header();
  doc.extend(
    device
      .peripherals
      .iter()
      .map(|p| Item::include(&format!("{}/{}.h", REGISTERS_DIR, p.name))),
  );
  doc
}
