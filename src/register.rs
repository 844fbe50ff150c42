use serde::{Deserialize, Serialize};
use svd_parser::{Register, RegisterInfo};
use xmltree::Element;

use super::field::FieldSpec;
use super::AccessSpec;
use crate::{
  error::{CodegenError, CodegenResult},
  normalize_description,
};

/// Register widths the generated storage and access types support.
pub const SUPPORTED_WIDTHS: [u32; 3] = [8, 16, 32];

/// Register properties a peripheral supplies to registers that do not declare their own.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct RegisterDefaults {
  pub size: Option<u32>,
  pub access: Option<AccessSpec>,
}

/// Describes a register of a peripheral template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSpec {
  /// Name that identifies the register. Unique within its peripheral.
  pub name: String,

  /// Description of the details of the register.
  pub description: String,

  /// Register's starting address relative to the peripheral's base address.
  pub address_offset: u32,

  /// The bit width of the register; one of 8, 16 or 32.
  pub width: u32,

  /// The access rights of the register.
  pub access: AccessSpec,

  /// Number of consecutive registers of this layout, or 0 for a scalar register.
  pub array: u32,

  /// The fields that exist on the register.
  pub fields: Vec<FieldSpec>,
}
impl RegisterSpec {
  /// Builds a register from its parsed SVD form. `raw` is the source `<register>` element, which
  /// may carry a non-standard `array` attribute that svd-parser does not model.
  pub(crate) fn new(
    r: &Register,
    raw: Option<&Element>,
    peripheral_name: &str,
    defaults: RegisterDefaults,
  ) -> CodegenResult<Self> {
    let (ri, dim): (&RegisterInfo, u32) = match r {
      Register::Single(ref ri) => (ri, 0),
      Register::Array(ref ri, ref d) => (ri, d.dim),
    };

    let name = ri
      .name
      .replace("[%s]", "")
      .replace("%s", "")
      .to_uppercase();
    let path = format!("{}.{}", peripheral_name, name);

    let array = match raw.and_then(|el| el.attributes.get("array")) {
      Some(text) => parse_array_attribute(&path, text)?,
      None => dim,
    };

    let description = match ri.description {
      Some(ref d) => normalize_description(d)?,
      None => return Err(CodegenError::missing(&format!("{}.description", path))),
    };

    let width = match ri.size.or(defaults.size) {
      Some(w) if SUPPORTED_WIDTHS.contains(&w) => w,
      Some(w) => {
        return Err(CodegenError::schema(
          &format!("{}.size", path),
          &format!("unsupported register width {}", w),
        ))
      }
      None => return Err(CodegenError::missing(&format!("{}.size", path))),
    };

    let access = AccessSpec::from_opt(ri.access.as_ref())
      .or(defaults.access)
      .unwrap_or_default();

    let mut register = Self {
      name,
      description,
      address_offset: ri.address_offset,
      width,
      access,
      array,
      fields: Vec::new(),
    };

    register.fields = {
      let mut field_specs: Vec<FieldSpec> = Vec::new();

      if let Some(ref fields) = ri.fields {
        for f in fields.iter() {
          field_specs.extend(FieldSpec::new(f, &path, &register.name, register.access)?);
        }
      }

      field_specs
    };

    Ok(register)
  }

  pub fn is_array(&self) -> bool {
    self.array != 0
  }

  /// Whether the register is declared as a plain alias instead of a class with one accessor per
  /// field: it has no fields, or exactly one field covering the whole register.
  pub fn is_collapsed(&self) -> bool {
    match self.fields.as_slice() {
      [] => true,
      [only] => only.width == self.width,
      _ => false,
    }
  }

  /// Identifier of the generated address template parameter.
  pub fn address_ident(&self) -> String {
    format!("{}_address", self.name.to_lowercase())
  }

  /// Identifier of the generated name string.
  pub fn name_ident(&self) -> String {
    format!("{}_name", self.name.to_lowercase())
  }

  /// Storage type backing this register in simulation builds.
  pub fn storage_type(&self) -> &'static str {
    match self.width {
      8 => "uint8_t",
      16 => "uint16_t",
      _ => "uint32_t",
    }
  }
}

fn parse_array_attribute(path: &str, text: &str) -> CodegenResult<u32> {
  text.trim().parse::<u32>().map_err(|_| {
    CodegenError::schema(
      &format!("{}@array", path),
      &format!("'{}' is not a register count", text),
    )
  })
}
