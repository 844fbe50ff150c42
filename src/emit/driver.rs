use super::{
  document::{Class, Document, Item},
  peripheral_namespace,
};
use crate::{config::EmitConfig, PeripheralSpec};

/// Renders the empty driver template that hand-written peripheral logic specializes. The template
/// is parameterized by the bound register layout of one instance.
pub(super) fn render(peripheral: &PeripheralSpec, config: &EmitConfig) -> Document {
  let mut doc = Document::header();
  doc.push(Item::namespace(
    &peripheral_namespace(peripheral, config),
    vec![Item::Class(Class {
      template: vec!["class Peripheral".to_owned()],
      name: "Driver".to_owned(),
      ..Class::default()
    })],
  ));
  doc
}
