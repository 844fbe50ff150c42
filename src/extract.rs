//! Walks an SVD document and produces unvalidated peripheral records.

use anyhow::Context;
use log::{debug, warn};
use std::collections::HashSet;
use svd_parser::{parse::Parse, Peripheral, RegisterCluster};
use xmltree::Element;

use crate::{
  error::{CodegenError, CodegenResult},
  normalize_description,
  register::RegisterDefaults,
  AccessSpec, InstanceSpec, RegisterSpec,
};

/// A peripheral definition before normalization: one register layout plus every instance that
/// places it, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct PeripheralRecord {
  /// Upper-case `groupName` of the defining node, or its name when the node has no group.
  pub group: String,

  pub description: String,

  /// The defining node first, followed by each node derived from it.
  pub instances: Vec<InstanceSpec>,

  pub registers: Vec<RegisterSpec>,
}
impl PeripheralRecord {
  fn new(p: &Peripheral, raw: &Element, instance: InstanceSpec) -> CodegenResult<Self> {
    let path = instance.name.clone();

    let group = match p.group_name {
      Some(ref g) => g.to_uppercase(),
      None => {
        debug!("peripheral {} has no group name, using its own name", path);
        path.clone()
      }
    };

    let description = match p.description {
      Some(ref d) => normalize_description(d)?,
      None => return Err(CodegenError::missing(&format!("{}.description", path))),
    };

    let defaults = RegisterDefaults {
      size: p.default_register_properties.size,
      access: AccessSpec::from_opt(p.default_register_properties.access.as_ref()),
    };

    let registers = match p.registers {
      Some(ref register_clusters) => {
        let mut raw_registers = child(raw, "registers")
          .map(|el| children(el, "register"))
          .unwrap_or_default()
          .into_iter();

        let mut registers = Vec::new();
        for rc in register_clusters.iter() {
          match rc {
            RegisterCluster::Register(ref r) => {
              registers.push(RegisterSpec::new(r, raw_registers.next(), &path, defaults)?)
            }
            RegisterCluster::Cluster(ref c) => {
              warn!("skipping register cluster {}.{}", path, c.name)
            }
          }
        }
        registers
      }
      None => Vec::new(),
    };

    check_unique(&path, registers.iter().map(|r| r.name.as_str()))?;
    for register in registers.iter() {
      check_unique(
        &format!("{}.{}", path, register.name),
        register.fields.iter().map(|f| f.name.as_str()),
      )?;
    }

    Ok(Self {
      group,
      description,
      instances: vec![instance],
      registers,
    })
  }

  /// Whether any instance of this record carries `name`, ignoring case.
  pub fn has_instance(&self, name: &str) -> bool {
    self
      .instances
      .iter()
      .any(|i| i.name.eq_ignore_ascii_case(name))
  }
}

/// Parses an SVD document and extracts the peripherals of its `<peripherals>` element.
pub fn extract_xml(xml: &str) -> CodegenResult<Vec<PeripheralRecord>> {
  let root = Element::parse(xml.as_bytes())?;

  if root.name == "peripherals" {
    return extract(&root);
  }

  match child(&root, "peripherals") {
    Some(peripherals) => extract(peripherals),
    None => Err(CodegenError::missing(&format!("{}.peripherals", root.name))),
  }
}

/// Extracts one record per defining `<peripheral>` node. A node with a `derivedFrom` attribute
/// adds an instance to the record that already holds the referenced peripheral; references to
/// peripherals defined later in the document are rejected.
pub fn extract(peripherals: &Element) -> CodegenResult<Vec<PeripheralRecord>> {
  let mut records: Vec<PeripheralRecord> = Vec::new();

  for el in children(peripherals, "peripheral") {
    let mut el = el.clone();
    normalize_access(&mut el);

    let p = Peripheral::parse(&el).with_context(|| element_name(&el))?;

    let instance = InstanceSpec::new(&p.name.to_uppercase(), p.base_address);

    match p.derived_from {
      Some(ref reference) => {
        let record = records
          .iter_mut()
          .find(|r| r.has_instance(reference))
          .ok_or_else(|| CodegenError::UnresolvedReference {
            peripheral: instance.name.clone(),
            reference: reference.to_uppercase(),
          })?;

        debug!(
          "peripheral {} derives from {}, adding instance to {}",
          instance.name, reference, record.group
        );
        record.instances.push(instance);
      }
      None => {
        let record = PeripheralRecord::new(&p, &el, instance)?;
        debug!(
          "extracted peripheral {} (group {}, {} registers)",
          record.instances[0].name,
          record.group,
          record.registers.len()
        );
        records.push(record);
      }
    }
  }

  Ok(records)
}

/// `<access>` values svd-parser accepts.
const KNOWN_ACCESS: [&str; 5] = [
  "read-only",
  "write-only",
  "read-write",
  "writeOnce",
  "read-writeOnce",
];

/// Rewrites every `<access>` value svd-parser would reject to `read-write`.
fn normalize_access(el: &mut Element) {
  for c in el.children.iter_mut() {
    if c.name != "access" {
      normalize_access(c);
      continue;
    }

    let text = c.text.as_deref().map(str::trim).unwrap_or("");
    let access = if KNOWN_ACCESS.contains(&text) {
      text.to_owned()
    } else {
      debug!("reading access '{}' as read-write", text);
      "read-write".to_owned()
    };
    c.text = Some(access);
  }
}

fn child<'a>(el: &'a Element, name: &str) -> Option<&'a Element> {
  el.children.iter().find(|c| c.name == name)
}

fn children<'a>(el: &'a Element, name: &str) -> Vec<&'a Element> {
  el.children.iter().filter(|c| c.name == name).collect()
}

fn element_name(el: &Element) -> String {
  child(el, "name")
    .and_then(|n| n.text.clone())
    .map(|n| n.trim().to_uppercase())
    .unwrap_or_else(|| format!("<{}>", el.name))
}

fn check_unique<'a>(path: &str, names: impl Iterator<Item = &'a str>) -> CodegenResult<()> {
  let mut seen = HashSet::new();
  for name in names {
    if !seen.insert(name) {
      return Err(CodegenError::schema(
        &format!("{}.{}", path, name),
        "name is not unique",
      ));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::{extract, extract_xml};
  use crate::{AccessSpec, CodegenError, InstanceSpec};
  use xmltree::Element;

  const DEVICE: &str = r##"
    <device>
      <name>STM32F4</name>
      <peripherals>
        <peripheral>
          <name>GPIOA</name>
          <description>General-purpose
            I/Os</description>
          <groupName>GPIO</groupName>
          <baseAddress>0x40020000</baseAddress>
          <registers>
            <register>
              <name>MODER</name>
              <description>GPIO port mode register</description>
              <addressOffset>0x0</addressOffset>
              <size>0x20</size>
              <fields>
                <field>
                  <name>MODER0</name>
                  <description>Port x configuration bits</description>
                  <bitOffset>0</bitOffset>
                  <bitWidth>2</bitWidth>
                </field>
              </fields>
            </register>
            <register array="4">
              <name>LCKR</name>
              <description>Lock</description>
              <addressOffset>0x1C</addressOffset>
              <size>0x20</size>
              <access>write-only</access>
            </register>
          </registers>
        </peripheral>
        <peripheral derivedFrom="gpioa">
          <name>GPIOB</name>
          <baseAddress>0x40020400</baseAddress>
        </peripheral>
        <peripheral derivedFrom="GPIOB">
          <name>GPIOC</name>
          <baseAddress>0x40020800</baseAddress>
        </peripheral>
        <peripheral>
          <name>rcc</name>
          <description>Reset and clock control</description>
          <baseAddress>0x40023800</baseAddress>
        </peripheral>
      </peripherals>
    </device>
  "##;

  #[test]
  fn extracts_records_in_schema_order() {
    let records = extract_xml(DEVICE).unwrap();

    assert_eq!(2, records.len());

    let gpio = &records[0];
    assert_eq!("GPIO", gpio.group);
    assert_eq!("General-purpose i/os", gpio.description);
    assert_eq!(2, gpio.registers.len());
    assert_eq!("MODER", gpio.registers[0].name);
    assert_eq!(4, gpio.registers[0].fields[0].values.len());
    assert_eq!(4, gpio.registers[1].array);
    assert_eq!(AccessSpec::WriteOnly, gpio.registers[1].access);
    assert_eq!(0x1C, gpio.registers[1].address_offset);

    let rcc = &records[1];
    assert_eq!("RCC", rcc.group);
    assert!(rcc.registers.is_empty());
    assert_eq!(vec![InstanceSpec::new("RCC", 0x4002_3800)], rcc.instances);
  }

  #[test]
  fn resolves_derived_peripherals_case_insensitively() {
    let records = extract_xml(DEVICE).unwrap();

    assert_eq!(
      vec![
        InstanceSpec::new("GPIOA", 0x4002_0000),
        InstanceSpec::new("GPIOB", 0x4002_0400),
        InstanceSpec::new("GPIOC", 0x4002_0800),
      ],
      records[0].instances
    );
  }

  #[test]
  fn rejects_forward_references() {
    let err = extract_xml(
      r##"
      <device>
        <peripherals>
          <peripheral derivedFrom="TIM2">
            <name>TIM3</name>
            <baseAddress>0x40000400</baseAddress>
          </peripheral>
          <peripheral>
            <name>TIM2</name>
            <description>Timer</description>
            <groupName>TIM</groupName>
            <baseAddress>0x40000000</baseAddress>
          </peripheral>
        </peripherals>
      </device>
      "##,
    )
    .unwrap_err();

    assert_eq!(
      CodegenError::UnresolvedReference {
        peripheral: "TIM3".to_owned(),
        reference: "TIM2".to_owned(),
      },
      err
    );
  }

  #[test]
  fn missing_description_is_a_schema_error() {
    let err = extract_xml(
      r##"
      <device>
        <peripherals>
          <peripheral>
            <name>CRC</name>
            <groupName>CRC</groupName>
            <baseAddress>0x40023000</baseAddress>
          </peripheral>
        </peripherals>
      </device>
      "##,
    )
    .unwrap_err();

    assert_eq!(CodegenError::missing("CRC.description"), err);
  }

  #[test]
  fn missing_base_address_is_a_schema_error() {
    let err = extract_xml(
      r##"
      <device>
        <peripherals>
          <peripheral>
            <name>CRC</name>
            <description>Crc</description>
          </peripheral>
        </peripherals>
      </device>
      "##,
    )
    .unwrap_err();

    match err {
      CodegenError::Schema { path, .. } => assert_eq!("CRC", path),
      other => panic!("unexpected error {:?}", other),
    }
  }

  /// A device holding a single CRC peripheral with the given registers.
  fn crc(registers: &str) -> String {
    format!(
      r##"
      <device>
        <peripherals>
          <peripheral>
            <name>CRC</name>
            <description>Crc</description>
            <baseAddress>0x40023000</baseAddress>
            <registers>{}</registers>
          </peripheral>
        </peripherals>
      </device>
      "##,
      registers
    )
  }

  fn schema_path(err: CodegenError) -> String {
    match err {
      CodegenError::Schema { path, .. } => path,
      other => panic!("unexpected error {:?}", other),
    }
  }

  #[test]
  fn unknown_access_values_read_as_read_write() {
    let records = extract_xml(&crc(
      r##"
      <register>
        <name>DR</name>
        <description>Data</description>
        <addressOffset>0</addressOffset>
        <size>32</size>
        <access>rw</access>
        <fields>
          <field>
            <name>LO</name>
            <description>Low half</description>
            <bitOffset>0</bitOffset>
            <bitWidth>16</bitWidth>
            <access>rw</access>
          </field>
          <field>
            <name>HI</name>
            <description>High half</description>
            <bitOffset>16</bitOffset>
            <bitWidth>16</bitWidth>
            <access> read-only </access>
          </field>
        </fields>
      </register>
      "##,
    ))
    .unwrap();

    let dr = &records[0].registers[0];
    assert_eq!(AccessSpec::ReadWrite, dr.access);
    assert_eq!(AccessSpec::ReadWrite, dr.fields[0].access);
    assert_eq!(AccessSpec::ReadOnly, dr.fields[1].access);
  }

  #[test]
  fn missing_address_offset_is_a_schema_error() {
    let err = extract_xml(&crc(
      r##"
      <register>
        <name>DR</name>
        <description>Data</description>
        <size>32</size>
      </register>
      "##,
    ))
    .unwrap_err();

    assert!(err.to_string().contains("addressOffset"));
    assert_eq!("CRC", schema_path(err));
  }

  #[test]
  fn missing_peripheral_name_is_a_schema_error() {
    let err = extract_xml(
      r##"
      <device>
        <peripherals>
          <peripheral>
            <description>Crc</description>
            <baseAddress>0x40023000</baseAddress>
          </peripheral>
        </peripherals>
      </device>
      "##,
    )
    .unwrap_err();

    assert_eq!("<peripheral>", schema_path(err));
  }

  #[test]
  fn missing_register_name_is_a_schema_error() {
    let err = extract_xml(&crc(
      r##"
      <register>
        <description>Data</description>
        <addressOffset>0</addressOffset>
        <size>32</size>
      </register>
      "##,
    ))
    .unwrap_err();

    assert_eq!("CRC", schema_path(err));
  }

  #[test]
  fn missing_field_name_is_a_schema_error() {
    let err = extract_xml(&crc(
      r##"
      <register>
        <name>DR</name>
        <description>Data</description>
        <addressOffset>0</addressOffset>
        <size>32</size>
        <fields>
          <field>
            <description>Low half</description>
            <bitOffset>0</bitOffset>
            <bitWidth>16</bitWidth>
          </field>
        </fields>
      </register>
      "##,
    ))
    .unwrap_err();

    assert_eq!("CRC", schema_path(err));
  }

  #[test]
  fn field_without_bit_range_is_a_schema_error() {
    let err = extract_xml(&crc(
      r##"
      <register>
        <name>DR</name>
        <description>Data</description>
        <addressOffset>0</addressOffset>
        <size>32</size>
        <fields>
          <field>
            <name>LO</name>
            <description>Low half</description>
          </field>
        </fields>
      </register>
      "##,
    ))
    .unwrap_err();

    assert_eq!("CRC", schema_path(err));
  }

  #[test]
  fn duplicate_register_names_are_a_schema_error() {
    let err = extract_xml(
      r##"
      <device>
        <peripherals>
          <peripheral>
            <name>CRC</name>
            <description>Crc</description>
            <baseAddress>0x40023000</baseAddress>
            <registers>
              <register>
                <name>DR</name>
                <description>Data</description>
                <addressOffset>0</addressOffset>
                <size>32</size>
              </register>
              <register>
                <name>dr</name>
                <description>Data again</description>
                <addressOffset>4</addressOffset>
                <size>32</size>
              </register>
            </registers>
          </peripheral>
        </peripherals>
      </device>
      "##,
    )
    .unwrap_err();

    assert_eq!(
      CodegenError::schema("CRC.DR", "name is not unique"),
      err
    );
  }

  #[test]
  fn accepts_bare_peripherals_element() {
    let el = Element::parse(
      r##"
      <peripherals>
        <peripheral>
          <name>CRC</name>
          <description>Crc</description>
          <baseAddress>0x40023000</baseAddress>
        </peripheral>
      </peripherals>
      "##
        .as_bytes(),
    )
    .unwrap();

    let records = extract(&el).unwrap();

    assert_eq!(1, records.len());
    assert_eq!("CRC", records[0].group);
  }

  #[test]
  fn missing_peripherals_container_is_a_schema_error() {
    let err = extract_xml("<device><name>X</name></device>").unwrap_err();

    assert_eq!(CodegenError::missing("device.peripherals"), err);
  }
}
