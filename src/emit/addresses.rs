use super::document::{Document, Item, Struct};
use crate::{config::EmitConfig, DeviceSpec, InstanceSpec, PeripheralSpec};

/// Renders the global address table. Under the simulation symbol every instance gets backing
/// storage for its registers and its address macro lists that storage; otherwise the macro expands
/// to the literal address of the instance's first register.
pub(super) fn render(device: &DeviceSpec, config: &EmitConfig) -> Document {
  let instances: Vec<(&PeripheralSpec, InstanceSpec)> = device
    .peripherals
    .iter()
    .flat_map(|p| p.instances().into_iter().map(move |i| (p, i)))
    .collect();

  let mut storage = Vec::new();
  for (peripheral, instance) in instances.iter() {
    if peripheral.registers.is_empty() {
      continue;
    }
    if !storage.is_empty() {
      storage.push(Item::Blank);
    }
    storage.push(Item::Struct(storage_struct(peripheral, instance)));
  }

  let mut simulated = Vec::new();
  if !storage.is_empty() {
    simulated.push(Item::namespace(&config.storage_namespace, storage));
    simulated.push(Item::Blank);
  }
  simulated.extend(instances.iter().map(|(p, i)| {
    Item::define(&i.address_macro(), storage_addresses(p, i, config))
  }));

  let literal = instances
    .iter()
    .map(|(p, i)| {
      Item::define(
        &i.address_macro(),
        format!("0x{:08X}", p.first_register_address(i.base_address)),
      )
    })
    .collect();

  let mut doc = Document::header();
  doc.push(Item::SystemInclude("cstdint".to_owned()));
  doc.push(Item::Blank);
  doc.push(Item::IfDef {
    symbol: config.simulation_symbol.clone(),
    then: simulated,
    otherwise: literal,
  });
  doc
}

fn storage_struct(peripheral: &PeripheralSpec, instance: &InstanceSpec) -> Struct {
  Struct {
    name: instance.name.clone(),
    base: None,
    items: peripheral
      .registers
      .iter()
      .map(|r| Item::Static {
        ty: r.storage_type().to_owned(),
        declarator: if r.is_array() {
          format!("{}[{}]", r.name, r.array)
        } else {
          r.name.clone()
        },
        init: Some(if r.is_array() { "{0}" } else { "0" }.to_owned()),
        note: None,
      })
      .collect(),
    compact: false,
  }
}

/// Comma separated storage addresses in register order. Arrays decay to pointers on their own.
fn storage_addresses(
  peripheral: &PeripheralSpec,
  instance: &InstanceSpec,
  config: &EmitConfig,
) -> String {
  if peripheral.registers.is_empty() {
    return "nullptr".to_owned();
  }

  peripheral
    .registers
    .iter()
    .map(|r| {
      let path = format!("::{}::{}::{}", config.storage_namespace, instance.name, r.name);
      if r.is_array() {
        path
      } else {
        format!("&{}", path)
      }
    })
    .collect::<Vec<_>>()
    .join(", ")
}
