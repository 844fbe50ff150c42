//! Generates families of C++ register-access headers from CMSIS-SVD peripheral descriptions.
//!
//! The pipeline runs in three strictly ordered stages:
//!
//! 1. [`extract`] walks the SVD document and produces one [`PeripheralRecord`] per peripheral
//!    definition, folding `derivedFrom` aliases into instance lists on their source peripheral.
//! 2. [`DeviceSpec::build`] filters and normalizes the records into singleton or multi-instance
//!    [`PeripheralSpec`]s. This normalized model is also what the interchange document stores.
//! 3. [`emit::generate`] renders the model into base-layout, field, driver, aggregation and
//!    address-table headers.

use regex::Regex;
use serde::{Deserialize, Serialize};
use svd_parser::Access;

pub mod config;
mod device;
pub mod emit;
mod error;
pub mod extract;
mod field;
pub mod format;
pub mod interchange;
pub mod output;
mod peripheral;
mod register;
mod value;

pub use config::Config;
pub use device::DeviceSpec;
pub use error::{CodegenError, CodegenResult};
pub use extract::PeripheralRecord;
pub use field::FieldSpec;
pub use peripheral::{InstanceSpec, PeripheralSpec, Placement};
pub use register::RegisterSpec;
pub use value::EnumValueSpec;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum AccessSpec {
  ReadWrite,
  ReadOnly,
  WriteOnly,
}
impl AccessSpec {
  /// Classifies an SVD access value. Anything other than read-only or write-only is treated as
  /// read-write.
  pub fn new(access: &Access) -> AccessSpec {
    match access {
      Access::ReadOnly => AccessSpec::ReadOnly,
      Access::WriteOnly => AccessSpec::WriteOnly,
      _ => AccessSpec::ReadWrite,
    }
  }

  pub fn from_opt(access: Option<&Access>) -> Option<AccessSpec> {
    access.map(AccessSpec::new)
  }

  /// The access policy type name used by the generated headers.
  pub fn mnemonic(&self) -> &'static str {
    match self {
      AccessSpec::ReadWrite => "RW",
      AccessSpec::ReadOnly => "RO",
      AccessSpec::WriteOnly => "WO",
    }
  }
}
impl Default for AccessSpec {
  fn default() -> Self {
    AccessSpec::ReadWrite
  }
}

/// Collapses every run of line breaks, together with the indentation around them, into a single
/// space.
pub(crate) fn clean_whitespace(text: &str) -> CodegenResult<String> {
  let line_breaks = Regex::new(r"[ \t]*(\r?\n[ \t]*)+")?;
  Ok(line_breaks.replace_all(text.trim(), " ").into_owned())
}

/// Reflows a description and capitalizes it: first letter upper-case, the rest lower-case.
pub(crate) fn normalize_description(text: &str) -> CodegenResult<String> {
  let cleaned = clean_whitespace(text)?;
  let mut chars = cleaned.chars();
  Ok(match chars.next() {
    Some(first) => first
      .to_uppercase()
      .chain(chars.flat_map(|c| c.to_lowercase()))
      .collect(),
    None => String::new(),
  })
}

#[cfg(test)]
mod tests {
  use super::{clean_whitespace, normalize_description, AccessSpec};
  use svd_parser::Access;

  #[test]
  fn classifies_access() {
    assert_eq!(AccessSpec::ReadOnly, AccessSpec::new(&Access::ReadOnly));
    assert_eq!(AccessSpec::WriteOnly, AccessSpec::new(&Access::WriteOnly));
    assert_eq!(AccessSpec::ReadWrite, AccessSpec::new(&Access::ReadWrite));
    assert_eq!(AccessSpec::ReadWrite, AccessSpec::new(&Access::WriteOnce));
    assert_eq!(AccessSpec::ReadWrite, AccessSpec::new(&Access::ReadWriteOnce));
    assert_eq!(None, AccessSpec::from_opt(None));
  }

  #[test]
  fn collapses_line_breaks_and_indentation() {
    assert_eq!(
      "First line second line third",
      clean_whitespace("First line\n        second line\r\n  third\n").unwrap()
    );
  }

  #[test]
  fn collapses_blank_lines_between_paragraphs() {
    assert_eq!(
      "First para. second para.",
      clean_whitespace("First para.\n\n    second para.").unwrap()
    );
    assert_eq!("A b", clean_whitespace("A\r\n  \r\n\tb").unwrap());
  }

  #[test]
  fn keeps_single_line_text() {
    assert_eq!("Port mode", clean_whitespace("Port mode").unwrap());
  }

  #[test]
  fn normalizes_description() {
    assert_eq!(
      "Gpio port mode register",
      normalize_description("GPIO port\n      mode register").unwrap()
    );
    assert_eq!("", normalize_description("  ").unwrap());
  }
}
