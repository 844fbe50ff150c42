use super::{
  document::{Class, Document, Item},
  field_type_name, name_ident, peripheral_namespace, FIELDS_DIR,
};
use crate::{config::EmitConfig, PeripheralSpec, RegisterSpec};

const INCLUDES: [&str; 5] = [
  "Common/RegisterBase.h",
  "Common/RegisterPack.h",
  "Common/RegisterArray.h",
  "Common/FieldBase.h",
  "Common/ValueBase.h",
];

/// Template parameter used by peripherals without registers.
const BASE_ADDRESS_PARAMETER: &str = "base_address";

/// Name of the layout template shared by every instance of a peripheral.
pub(super) fn class_name(peripheral: &PeripheralSpec) -> String {
  format!("{}Base", peripheral.name)
}

/// Renders the register layout of a peripheral as a class template over the register addresses.
pub(super) fn render(peripheral: &PeripheralSpec, config: &EmitConfig) -> Document {
  let mut doc = Document::header();
  doc.extend(INCLUDES.iter().map(|i| Item::include(i)));
  doc.push(Item::include(&format!(
    "{}/{}.h",
    FIELDS_DIR, peripheral.name
  )));
  doc.push(Item::include("targets.h"));
  doc.push(Item::Blank);
  doc.push(Item::namespace(
    &peripheral_namespace(peripheral, config),
    vec![Item::Class(layout(peripheral, config))],
  ));
  doc
}

fn layout(peripheral: &PeripheralSpec, config: &EmitConfig) -> Class {
  let mut template = vec!["class Target".to_owned()];
  template.extend(address_parameters(peripheral));

  let (arrays, scalars): (Vec<&RegisterSpec>, Vec<&RegisterSpec>) =
    peripheral.registers.iter().partition(|r| r.is_array());

  let mut private: Vec<Item> = peripheral
    .registers
    .iter()
    .map(|r| Item::name_string(&r.name_ident(), &format!("{}::{}", peripheral.name, r.name)))
    .collect();

  if !arrays.is_empty() {
    private.push(Item::Blank);
    private.extend(arrays.iter().map(|r| {
      Item::using(
        &array_type_name(r),
        register_type("RegisterArray", r, config),
        Some(r.description.clone()),
      )
    }));
  }

  let mut public: Vec<Item> = scalars.iter().map(|r| register(r, config)).collect();

  if !arrays.is_empty() {
    public.push(Item::Blank);
    public.extend(arrays.iter().map(|r| Item::Static {
      ty: array_type_name(r),
      declarator: r.name.clone(),
      init: None,
      note: Some(r.description.clone()),
    }));
  }

  if !scalars.is_empty() {
    public.push(Item::Blank);
    public.push(Item::comment("clang-format off"));
    public.extend(scalars.iter().map(|r| Item::Using {
      template: Some("template<typename... T>".to_owned()),
      name: format!("{}Pack", r.name),
      target: format!("RegisterPack<{}, T...>", r.name),
      note: Some(format!("{} pack", r.description)),
    }));
    public.push(Item::comment("clang-format on"));
  }

  Class {
    comment: Some(peripheral.description.clone()),
    template,
    name: class_name(peripheral),
    base: None,
    private,
    public,
  }
}

/// One template parameter per register. Only the first register's address is required; every
/// other register defaults to it plus the register's displacement.
fn address_parameters(peripheral: &PeripheralSpec) -> Vec<String> {
  let first = match peripheral.registers.first() {
    Some(r) => r.address_ident(),
    None => return vec![format!("auto {}", BASE_ADDRESS_PARAMETER)],
  };

  peripheral
    .registers
    .iter()
    .enumerate()
    .map(|(n, r)| match n {
      0 => format!("auto {}", first),
      _ => {
        let displacement = peripheral.register_displacement(n);
        format!(
          "auto {} = {} {} 0x{:04X}",
          r.address_ident(),
          first,
          if displacement < 0 { '-' } else { '+' },
          displacement.unsigned_abs()
        )
      }
    })
    .collect()
}

fn array_type_name(register: &RegisterSpec) -> String {
  format!("{}_t", register.name)
}

/// `Template<address, width, array, access, Target, Family, name>`
fn register_type(template: &str, register: &RegisterSpec, config: &EmitConfig) -> String {
  format!(
    "{}<{}, {}, {}, {}, Target, {}, {}>",
    template,
    register.address_ident(),
    register.width,
    register.array,
    register.access.mnemonic(),
    config.family,
    register.name_ident()
  )
}

/// A collapsed register is a plain alias; any other register gets a class with one accessor per
/// field.
fn register(register: &RegisterSpec, config: &EmitConfig) -> Item {
  let base = register_type("RegisterBase", register, config);

  if register.is_collapsed() {
    return Item::using(&register.name, base, Some(register.description.clone()));
  }

  Item::Class(Class {
    comment: Some(register.description.clone()),
    template: Vec::new(),
    name: register.name.clone(),
    base: Some(base),
    private: register
      .fields
      .iter()
      .map(|f| Item::name_string(&name_ident(&f.name), &f.name))
      .collect(),
    public: register
      .fields
      .iter()
      .map(|f| {
        Item::using(
          &f.name,
          format!(
            "{}<{}, {}, {}, {}, Target, {}, {}>",
            field_type_name(register, f),
            register.name,
            f.offset,
            f.width,
            f.access.mnemonic(),
            config.family,
            name_ident(&f.name)
          ),
          Some(f.description.clone()),
        )
      })
      .collect(),
  })
}
