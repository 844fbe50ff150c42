use serde::{Deserialize, Serialize};
use svd_parser::{Field, FieldInfo};

use super::AccessSpec;
use crate::{
  error::{CodegenError, CodegenResult},
  normalize_description,
  value::EnumValueSpec,
};

/// Describes a field on a register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
  /// A name that identfies the field. Unique within the parent register.
  pub name: String,

  /// Description of the field's usage, purpose, and/or operation.
  pub description: String,

  /// The position of the least-significant bit of this field within its register.
  pub offset: u32,

  /// The bit width of the field.
  pub width: u32,

  /// The access rights to the field. Inherited from the register when the SVD omits it.
  pub access: AccessSpec,

  /// Placeholder values, present only for fields narrower than four bits.
  pub values: Vec<EnumValueSpec>,
}
impl FieldSpec {
  /// Builds the field specs described by one SVD `<field>` element. Field arrays expand into one
  /// spec per index. Fields that repeat the name of their register are wrappers around the whole
  /// register and are dropped.
  pub(crate) fn new(
    f: &Field,
    register_path: &str,
    register_name: &str,
    register_access: AccessSpec,
  ) -> CodegenResult<Vec<Self>> {
    let specs: Vec<Self> = match f {
      Field::Single(ref fi) => vec![Self::from_field_info(
        fi,
        None,
        fi.bit_range.offset,
        register_path,
        register_access,
      )?],
      Field::Array(ref fi, ref d) => {
        let dim_indices = if let Some(ref di) = d.dim_index {
          if d.dim != di.len() as u32 {
            return Err(CodegenError::schema(
              &format!("{}.{}", register_path, fi.name),
              "'dim' element must have the same value as the length of 'dimIndex'",
            ));
          }
          di.to_owned()
        } else {
          (0..d.dim).map(|v| v.to_string()).collect()
        };

        let mut field_specs = Vec::with_capacity(d.dim as usize);

        for (n, dim_index) in dim_indices.iter().enumerate() {
          field_specs.push(Self::from_field_info(
            fi,
            Some(dim_index.as_str()),
            fi.bit_range.offset + n as u32 * d.dim_increment,
            register_path,
            register_access,
          )?);
        }

        field_specs
      }
    };

    Ok(
      specs
        .into_iter()
        .filter(|f| f.name != register_name)
        .collect(),
    )
  }

  fn from_field_info(
    fi: &FieldInfo,
    index: Option<&str>,
    offset: u32,
    register_path: &str,
    register_access: AccessSpec,
  ) -> CodegenResult<Self> {
    let interpolate = |text: &str| match index {
      Some(i) => text.replace("%s", i),
      None => text.to_owned(),
    };
    let name = interpolate(&fi.name).to_uppercase();
    let path = format!("{}.{}", register_path, name);

    let description = match fi.description {
      Some(ref d) => normalize_description(&interpolate(d))?,
      None => return Err(CodegenError::missing(&format!("{}.description", path))),
    };

    Ok(Self {
      name,
      description,
      offset,
      width: fi.bit_range.width,
      access: AccessSpec::from_opt(fi.access.as_ref()).unwrap_or(register_access),
      values: EnumValueSpec::synthesize(fi.bit_range.width),
    })
  }
}
