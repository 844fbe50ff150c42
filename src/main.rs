use clap::{ArgGroup, Parser};
use log::info;
use std::{fs, path::PathBuf, process};

use svd_header_gen::{
  emit::{self, Selection},
  format::{ClangFormat, Formatter},
  interchange,
  output::{self, WriteOptions},
  CodegenResult, Config, DeviceSpec,
};

#[derive(Parser, Debug)]
#[command(
  name = "svd-header-gen",
  author,
  version,
  about = "Generate C++ register access headers from a CMSIS-SVD file"
)]
#[command(group(ArgGroup::new("source").required(true).args(["svd", "json"])))]
struct Cli {
  /// SVD file to read peripherals from
  #[arg(long, value_name = "FILE")]
  svd: Option<PathBuf>,

  /// Interchange document saved by an earlier run
  #[arg(long, value_name = "FILE")]
  json: Option<PathBuf>,

  /// Output directory
  #[arg(short, long, value_name = "DIR", default_value = ".")]
  output: PathBuf,

  /// Only keep peripherals of these groups
  #[arg(short, long = "include", value_name = "GROUP", num_args = 1..)]
  include: Vec<String>,

  /// Generate base layout headers
  #[arg(long)]
  base: bool,

  /// Generate field headers
  #[arg(long)]
  fields: bool,

  /// Generate driver stubs
  #[arg(long)]
  drivers: bool,

  /// Generate every header family. This is the default when no family is selected.
  #[arg(long)]
  all: bool,

  /// Save the normalized model as an interchange document
  #[arg(long, value_name = "FILE")]
  save_json: Option<PathBuf>,

  /// Do not generate any headers
  #[arg(long)]
  no_headers: bool,

  /// TOML configuration file
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Root namespace of the generated code
  #[arg(long, value_name = "NS")]
  namespace: Option<String>,

  /// clang-format executable run over the generated headers
  #[arg(long, value_name = "PATH")]
  formatter: Option<PathBuf>,

  /// Replace existing driver stubs
  #[arg(long)]
  overwrite_drivers: bool,
}
impl Cli {
  fn selection(&self) -> Selection {
    if self.all || !(self.base || self.fields || self.drivers) {
      Selection::all()
    } else {
      Selection {
        base: self.base,
        fields: self.fields,
        drivers: self.drivers,
      }
    }
  }

  /// The configuration file, if any, with command line overrides applied.
  fn config(&self) -> CodegenResult<Config> {
    let mut config = match self.config {
      Some(ref path) => Config::load(path)?,
      None => Config::default(),
    };

    if !self.include.is_empty() {
      config.model.include = Some(self.include.clone());
    }
    if let Some(ref namespace) = self.namespace {
      config.emit.namespace = namespace.clone();
    }
    if let Some(ref formatter) = self.formatter {
      config.output.formatter = Some(formatter.clone());
    }
    if self.overwrite_drivers {
      config.output.overwrite_drivers = true;
    }

    config.validate()?;
    Ok(config)
  }
}

fn run(cli: &Cli) -> CodegenResult<()> {
  let config = cli.config()?;

  let device = match (&cli.svd, &cli.json) {
    (Some(svd), _) => {
      info!("reading {}", svd.display());
      DeviceSpec::from_xml(&fs::read_to_string(svd)?, &config.model)?
    }
    (None, Some(json)) => {
      // The group filter was already applied when the document was saved.
      info!("loading {}", json.display());
      interchange::load(json)?
    }
    (None, None) => unreachable!("clap requires a source"),
  };

  if let Some(ref path) = cli.save_json {
    interchange::save(&device, path)?;
  }

  if cli.no_headers {
    return Ok(());
  }

  let artifacts = emit::generate(&device, &config.emit, cli.selection());

  let clang_format = config
    .output
    .formatter
    .as_ref()
    .map(|path| ClangFormat::new(path, &config.output.format_style));
  let options = WriteOptions {
    overwrite_drivers: config.output.overwrite_drivers,
    formatter: clang_format.as_ref().map(|f| f as &dyn Formatter),
  };

  output::write(&artifacts, &cli.output, &options)?;
  Ok(())
}

fn main() {
  env_logger::init();

  let cli = Cli::parse();
  if let Err(e) = run(&cli) {
    eprintln!("error: {}", e);
    process::exit(1);
  }
}
