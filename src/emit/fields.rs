use super::{
  document::{Class, Document, Item},
  field_type_name, name_ident, peripheral_namespace,
};
use crate::{config::EmitConfig, FieldSpec, PeripheralSpec, RegisterSpec};

const TEMPLATE: [&str; 7] = [
  "class Register",
  "size_t offset",
  "size_t width",
  "class Access",
  "class Target",
  "class Family",
  "const char* name",
];

/// Renders one accessor template per field. Peripherals without fields still get a header with an
/// empty namespace so that every base-layout header has something to include.
pub(super) fn render(peripheral: &PeripheralSpec, config: &EmitConfig) -> Document {
  let mut doc = Document::header();
  doc.push(Item::SystemInclude("cstddef".to_owned()));
  doc.push(Item::Blank);
  doc.push(Item::include("Common/FieldBase.h"));
  doc.push(Item::include("Common/ValueBase.h"));
  doc.push(Item::Blank);

  let mut items = Vec::new();
  for (n, (register, field)) in peripheral.iter_fields().enumerate() {
    if n > 0 {
      items.push(Item::Blank);
    }
    items.push(Item::Class(accessor(register, field)));
  }

  doc.push(Item::namespace(
    &peripheral_namespace(peripheral, config),
    items,
  ));
  doc
}

fn accessor(register: &RegisterSpec, field: &FieldSpec) -> Class {
  let name = field_type_name(register, field);

  Class {
    comment: Some(field.description.clone()),
    template: TEMPLATE.iter().map(|p| p.to_string()).collect(),
    base: Some("FieldBase<Register, offset, width, Access, Target, Family, name>".to_owned()),
    private: field
      .values
      .iter()
      .map(|v| Item::name_string(&name_ident(&v.name), &v.name))
      .collect(),
    public: field
      .values
      .iter()
      .map(|v| {
        Item::using(
          &v.name,
          format!(
            "ValueBase<{}, {}, Target, Family, {}>",
            name,
            v.value,
            name_ident(&v.name)
          ),
          Some(v.description.clone()),
        )
      })
      .collect(),
    name,
  }
}
