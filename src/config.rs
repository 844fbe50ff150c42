//! Run configuration, loadable from a TOML file.
//!
//! ```toml
//! [model]
//! keep_instance_groups = ["TIM", "ETHERNET", "USB_OTG_FS", "USB_OTG_HS"]
//! include = ["GPIO", "TIM"]
//!
//! [emit]
//! namespace = "mcu"
//! family = "STM32F4xxx"
//!
//! [output]
//! formatter = "/usr/bin/clang-format"
//! ```

use regex::Regex;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

use crate::error::{CodegenError, CodegenResult};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub model: ModelConfig,
  pub emit: EmitConfig,
  pub output: OutputConfig,
}
impl Config {
  pub fn from_toml(text: &str) -> CodegenResult<Self> {
    let config: Config = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
  }

  pub fn load<P: AsRef<Path>>(path: P) -> CodegenResult<Self> {
    Self::from_toml(&fs::read_to_string(path)?)
  }

  /// Checks that every name which ends up in generated code is a valid identifier.
  pub fn validate(&self) -> CodegenResult<()> {
    let namespace = Regex::new(r"^[A-Za-z_]\w*(::[A-Za-z_]\w*)*$")?;
    let identifier = Regex::new(r"^[A-Za-z_]\w*$")?;

    let checks = [
      ("emit.namespace", &self.emit.namespace, &namespace),
      ("emit.storage_namespace", &self.emit.storage_namespace, &namespace),
      ("emit.family", &self.emit.family, &identifier),
      ("emit.simulation_symbol", &self.emit.simulation_symbol, &identifier),
    ];

    for (key, value, pattern) in checks.iter() {
      if !pattern.is_match(value) {
        return Err(CodegenError::Config {
          details: format!("{} = '{}' is not a valid C++ name", key, value),
        });
      }
    }

    Ok(())
  }
}

/// Controls how extracted peripherals are filtered and named.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
  /// Groups whose single-instance peripherals keep the instance name instead of the group name.
  pub keep_instance_groups: Vec<String>,

  /// When set, only peripherals whose group is listed are kept.
  pub include: Option<Vec<String>>,
}
impl ModelConfig {
  pub fn keeps_instance_name(&self, group: &str) -> bool {
    self
      .keep_instance_groups
      .iter()
      .any(|g| g.eq_ignore_ascii_case(group))
  }

  pub fn includes(&self, group: &str) -> bool {
    match self.include {
      Some(ref include) => include.iter().any(|g| g.eq_ignore_ascii_case(group)),
      None => true,
    }
  }
}
impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      keep_instance_groups: ["TIM", "ETHERNET", "USB_OTG_FS", "USB_OTG_HS"]
        .iter()
        .map(|g| g.to_string())
        .collect(),
      include: None,
    }
  }
}

/// Names baked into the generated headers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitConfig {
  /// Root namespace of every generated declaration.
  pub namespace: String,

  /// Device family type passed to the register, field and value templates.
  pub family: String,

  /// Preprocessor symbol selecting simulated register storage.
  pub simulation_symbol: String,

  /// Namespace holding simulated register storage.
  pub storage_namespace: String,
}
impl Default for EmitConfig {
  fn default() -> Self {
    Self {
      namespace: "mcu".to_owned(),
      family: "STM32F4xxx".to_owned(),
      simulation_symbol: "SIMULATION".to_owned(),
      storage_namespace: "storage".to_owned(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
  /// clang-format executable run over each output directory. No formatting when unset.
  pub formatter: Option<PathBuf>,

  /// Value of clang-format's `--style` option.
  pub format_style: String,

  /// Replace driver stubs that already exist in the output directory.
  pub overwrite_drivers: bool,
}
impl Default for OutputConfig {
  fn default() -> Self {
    Self {
      formatter: None,
      format_style: "file".to_owned(),
      overwrite_drivers: false,
    }
  }
}
