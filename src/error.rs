use anyhow::Error as AnyhowError;
use std::{error::Error, fmt};

/// Convenience type for a result that may contain a `CodegenError`.
pub type CodegenResult<T> = std::result::Result<T, CodegenError>;

/// Error type for all errors raised by this crate or the crates on which it depends.
#[derive(Debug, Clone, PartialEq)]
pub enum CodegenError {
  /// A required schema element is missing or malformed.
  Schema {
    /// Dotted path of the offending element, e.g. `GPIOA.MODER.size`.
    path: String,
    details: String,
  },

  /// A `derivedFrom` reference names a peripheral that was not defined before it.
  UnresolvedReference { peripheral: String, reference: String },

  /// The interchange document could not be read back.
  InterchangeCorrupt { details: String },

  /// The configuration file could not be interpreted.
  Config { details: String },

  /// Reading or writing a file failed.
  Io { details: String },
}
impl CodegenError {
  pub(crate) fn schema(path: &str, details: &str) -> CodegenError {
    CodegenError::Schema {
      path: path.to_string(),
      details: details.to_string(),
    }
  }

  pub(crate) fn missing(path: &str) -> CodegenError {
    Self::schema(path, "required element is missing")
  }

  pub(crate) fn interchange(details: &str) -> CodegenError {
    CodegenError::InterchangeCorrupt {
      details: details.to_string(),
    }
  }
}
impl fmt::Display for CodegenError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      CodegenError::Schema { path, details } => write!(f, "schema error at '{}': {}", path, details),
      CodegenError::UnresolvedReference {
        peripheral,
        reference,
      } => write!(
        f,
        "peripheral '{}' is derived from '{}', which is not defined before it",
        peripheral, reference
      ),
      CodegenError::InterchangeCorrupt { details } => {
        write!(f, "corrupt interchange document: {}", details)
      }
      CodegenError::Config { details } => write!(f, "invalid configuration: {}", details),
      CodegenError::Io { details } => write!(f, "{}", details),
    }
  }
}
impl Error for CodegenError {}
impl From<std::io::Error> for CodegenError {
  fn from(err: std::io::Error) -> Self {
    CodegenError::Io {
      details: format!("std::io::Error {}", err),
    }
  }
}
/// The outermost context of an svd-parser error names the element that failed to parse.
impl From<AnyhowError> for CodegenError {
  fn from(err: AnyhowError) -> Self {
    let causes: Vec<String> = err.chain().map(|c| c.to_string()).collect();
    match causes.split_first() {
      Some((path, rest)) if !rest.is_empty() => CodegenError::schema(path, &rest.join(": ")),
      _ => CodegenError::schema("<svd>", &format!("{:#}", err)),
    }
  }
}
impl From<xmltree::ParseError> for CodegenError {
  fn from(err: xmltree::ParseError) -> Self {
    CodegenError::schema("<document>", &format!("xmltree::ParseError {:?}", err))
  }
}
impl From<serde_json::Error> for CodegenError {
  fn from(err: serde_json::Error) -> Self {
    CodegenError::interchange(&err.to_string())
  }
}
impl From<toml::de::Error> for CodegenError {
  fn from(err: toml::de::Error) -> Self {
    CodegenError::Config {
      details: err.to_string(),
    }
  }
}
impl From<regex::Error> for CodegenError {
  fn from(err: regex::Error) -> Self {
    CodegenError::Config {
      details: format!("regex::Error {}", err),
    }
  }
}
