use serde::{Deserialize, Serialize};

/// Fields narrower than this many bits get placeholder enumerated values.
pub const ENUMERATED_WIDTH_LIMIT: u32 = 4;

/// Describes one selectable value of a narrow field.
///
/// Values are synthesized from the field width and are not read from the SVD
/// `<enumeratedValues>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueSpec {
  /// Generated name, `Value0`, `Value1`, ...
  pub name: String,

  pub description: String,

  /// The ordinal written to the field.
  pub value: u32,
}
impl EnumValueSpec {
  pub(crate) fn new(value: u32) -> Self {
    let name = format!("Value{}", value);
    Self {
      description: format!("Some description of {}", name),
      name,
      value,
    }
  }

  /// Generates `2^width` placeholder values for fields narrower than four bits, and none
  /// otherwise.
  pub fn synthesize(width: u32) -> Vec<Self> {
    if width >= ENUMERATED_WIDTH_LIMIT {
      return Vec::new();
    }
    (0..1u32 << width).map(EnumValueSpec::new).collect()
  }
}
