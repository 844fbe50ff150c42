//! Structured form of a generated header. Emitters build a [`Document`]; rendering it is the only
//! place where layout decisions (indentation, spacing, trailing comments) are made.

use std::fmt;

const INDENT: &str = "    ";

/// A generated header: an ordered list of top-level items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
  pub items: Vec<Item>,
}
impl Document {
  /// Starts a header with `#pragma once` followed by a blank line.
  pub fn header() -> Self {
    Self {
      items: vec![Item::PragmaOnce, Item::Blank],
    }
  }

  pub fn push(&mut self, item: Item) {
    self.items.push(item);
  }

  pub fn extend<I: IntoIterator<Item = Item>>(&mut self, items: I) {
    self.items.extend(items);
  }

  /// Renders the document to text. Rendering is deterministic and always ends with a newline.
  pub fn render(&self) -> String {
    self.to_string()
  }
}
impl fmt::Display for Document {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write_items(f, &self.items, 0)
  }
}

/// One declaration or preprocessor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
  PragmaOnce,

  /// `#include "path"`
  Include(String),

  /// `#include <path>`
  SystemInclude(String),

  Blank,

  /// `// text`
  Comment(String),

  /// `namespace name { ... }`. Namespace bodies are not indented.
  Namespace { name: String, items: Vec<Item> },

  Class(Class),

  Struct(Struct),

  /// `[template] using name = target;  // note`
  Using {
    template: Option<String>,
    name: String,
    target: String,
    note: Option<String>,
  },

  /// `static inline ty declarator = init;  // note`
  Static {
    ty: String,
    declarator: String,
    init: Option<String>,
    note: Option<String>,
  },

  /// `#define name value`
  Define { name: String, value: String },

  /// `#ifdef symbol ... #else ... #endif`. The `#else` branch is omitted when empty.
  IfDef {
    symbol: String,
    then: Vec<Item>,
    otherwise: Vec<Item>,
  },
}
impl Item {
  pub fn include(path: &str) -> Self {
    Item::Include(path.to_owned())
  }

  pub fn comment(text: &str) -> Self {
    Item::Comment(text.to_owned())
  }

  pub fn namespace(name: &str, items: Vec<Item>) -> Self {
    Item::Namespace {
      name: name.to_owned(),
      items,
    }
  }

  pub fn using(name: &str, target: String, note: Option<String>) -> Self {
    Item::Using {
      template: None,
      name: name.to_owned(),
      target,
      note,
    }
  }

  pub fn define(name: &str, value: String) -> Self {
    Item::Define {
      name: name.to_owned(),
      value,
    }
  }

  /// `static inline char ident[] = "value";`
  pub fn name_string(ident: &str, value: &str) -> Self {
    Item::Static {
      ty: "char".to_owned(),
      declarator: format!("{}[]", ident),
      init: Some(format!("\"{}\"", value)),
      note: None,
    }
  }
}

/// A class declaration with a private and a public section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Class {
  /// Comment line placed above the declaration.
  pub comment: Option<String>,

  /// Template parameters. An empty list declares a plain class.
  pub template: Vec<String>,

  pub name: String,

  /// Publicly inherited base class.
  pub base: Option<String>,

  pub private: Vec<Item>,

  /// Rendered after a `public:` label, which is omitted when this section is empty.
  pub public: Vec<Item>,
}

/// A struct declaration. A compact struct is rendered on a single line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Struct {
  pub name: String,
  pub base: Option<String>,
  pub items: Vec<Item>,
  pub compact: bool,
}

fn write_items(f: &mut fmt::Formatter, items: &[Item], depth: usize) -> fmt::Result {
  for item in items {
    write_item(f, item, depth)?;
  }
  Ok(())
}

fn write_indent(f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
  for _ in 0..depth {
    f.write_str(INDENT)?;
  }
  Ok(())
}

fn write_note(f: &mut fmt::Formatter, note: &Option<String>) -> fmt::Result {
  match note {
    Some(ref n) => writeln!(f, "  // {}", n),
    None => writeln!(f),
  }
}

fn write_item(f: &mut fmt::Formatter, item: &Item, depth: usize) -> fmt::Result {
  match item {
    Item::PragmaOnce => writeln!(f, "#pragma once"),
    Item::Include(path) => writeln!(f, "#include \"{}\"", path),
    Item::SystemInclude(path) => writeln!(f, "#include <{}>", path),
    Item::Blank => writeln!(f),
    Item::Comment(text) => {
      write_indent(f, depth)?;
      writeln!(f, "// {}", text)
    }
    Item::Namespace { name, items } => {
      write_indent(f, depth)?;
      writeln!(f, "namespace {}", name)?;
      write_indent(f, depth)?;
      writeln!(f, "{{")?;
      write_items(f, items, depth)?;
      write_indent(f, depth)?;
      writeln!(f, "}}")
    }
    Item::Class(class) => write_class(f, class, depth),
    Item::Struct(s) => write_struct(f, s, depth),
    Item::Using { note, .. } | Item::Static { note, .. } => {
      write_indent(f, depth)?;
      write_inline(f, item)?;
      write_note(f, note)
    }
    Item::Define { name, value } => writeln!(f, "#define {} {}", name, value),
    Item::IfDef {
      symbol,
      then,
      otherwise,
    } => {
      writeln!(f, "#ifdef {}", symbol)?;
      write_items(f, then, depth)?;
      if !otherwise.is_empty() {
        writeln!(f, "#else")?;
        write_items(f, otherwise, depth)?;
      }
      writeln!(f, "#endif")
    }
  }
}

/// Writes a single-line declaration without indentation, note or line break.
fn write_inline(f: &mut fmt::Formatter, item: &Item) -> fmt::Result {
  match item {
    Item::Using {
      template,
      name,
      target,
      ..
    } => {
      if let Some(ref t) = template {
        write!(f, "{} ", t)?;
      }
      write!(f, "using {} = {};", name, target)
    }
    Item::Static {
      ty,
      declarator,
      init,
      ..
    } => match init {
      Some(ref i) => write!(f, "static inline {} {} = {};", ty, declarator, i),
      None => write!(f, "static inline {} {};", ty, declarator),
    },
    Item::Comment(text) => write!(f, "// {}", text),
    _ => Err(fmt::Error),
  }
}

fn write_head(
  f: &mut fmt::Formatter,
  keyword: &str,
  name: &str,
  base: &Option<String>,
  public: bool,
) -> fmt::Result {
  write!(f, "{} {}", keyword, name)?;
  match (base, public) {
    (Some(ref b), true) => write!(f, " : public {}", b),
    (Some(ref b), false) => write!(f, " : {}", b),
    (None, _) => Ok(()),
  }
}

fn write_class(f: &mut fmt::Formatter, class: &Class, depth: usize) -> fmt::Result {
  if let Some(ref comment) = class.comment {
    write_indent(f, depth)?;
    writeln!(f, "// {}", comment)?;
  }
  if !class.template.is_empty() {
    write_indent(f, depth)?;
    writeln!(f, "template<{}>", class.template.join(", "))?;
  }
  write_indent(f, depth)?;
  write_head(f, "class", &class.name, &class.base, true)?;
  writeln!(f)?;
  write_indent(f, depth)?;
  writeln!(f, "{{")?;
  write_items(f, &class.private, depth + 1)?;
  if !class.public.is_empty() {
    write_indent(f, depth)?;
    writeln!(f, "public:")?;
    write_items(f, &class.public, depth + 1)?;
  }
  write_indent(f, depth)?;
  writeln!(f, "}};")
}

fn write_struct(f: &mut fmt::Formatter, s: &Struct, depth: usize) -> fmt::Result {
  write_indent(f, depth)?;
  write_head(f, "struct", &s.name, &s.base, false)?;

  if s.compact {
    f.write_str(" {")?;
    for item in s.items.iter() {
      f.write_str(" ")?;
      write_inline(f, item)?;
    }
    return writeln!(f, " }};");
  }

  writeln!(f)?;
  write_indent(f, depth)?;
  writeln!(f, "{{")?;
  write_items(f, &s.items, depth + 1)?;
  write_indent(f, depth)?;
  writeln!(f, "}};")
}

#[cfg(test)]
mod tests {
  use super::{Class, Document, Item, Struct};

  #[test]
  fn renders_header_prologue() {
    let mut doc = Document::header();
    doc.push(Item::include("Common/RegisterBase.h"));
    doc.push(Item::SystemInclude("cstdint".to_owned()));

    assert_eq!(
      "#pragma once\n\n#include \"Common/RegisterBase.h\"\n#include <cstdint>\n",
      doc.render()
    );
  }

  #[test]
  fn renders_class_sections_with_indentation() {
    let class = Class {
      comment: Some("Control".to_owned()),
      template: vec!["class Target".to_owned(), "auto cr_address".to_owned()],
      name: "CRBase".to_owned(),
      base: None,
      private: vec![Item::name_string("cr_name", "P::CR")],
      public: vec![Item::using(
        "CR",
        "RegisterBase<cr_address>".to_owned(),
        Some("Control register".to_owned()),
      )],
    };
    let doc = Document {
      items: vec![Item::namespace("mcu::p", vec![Item::Class(class)])],
    };

    assert_eq!(
      "namespace mcu::p\n\
       {\n\
       // Control\n\
       template<class Target, auto cr_address>\n\
       class CRBase\n\
       {\n\
       \x20   static inline char cr_name[] = \"P::CR\";\n\
       public:\n\
       \x20   using CR = RegisterBase<cr_address>;  // Control register\n\
       };\n\
       }\n",
      doc.render()
    );
  }

  #[test]
  fn omits_public_label_for_empty_class() {
    let doc = Document {
      items: vec![Item::Class(Class {
        template: vec!["class Peripheral".to_owned()],
        name: "Driver".to_owned(),
        ..Class::default()
      })],
    };

    assert_eq!("template<class Peripheral>\nclass Driver\n{\n};\n", doc.render());
  }

  #[test]
  fn renders_compact_struct_on_one_line() {
    let doc = Document {
      items: vec![Item::Struct(Struct {
        name: "GPIOA".to_owned(),
        base: Some("gpioa::Registers".to_owned()),
        items: vec![Item::using(
          "Driver",
          "gpioa::Driver<gpioa::Registers>".to_owned(),
          None,
        )],
        compact: true,
      })],
    };

    assert_eq!(
      "struct GPIOA : gpioa::Registers { using Driver = gpioa::Driver<gpioa::Registers>; };\n",
      doc.render()
    );
  }

  #[test]
  fn renders_conditional_branches() {
    let doc = Document {
      items: vec![Item::IfDef {
        symbol: "SIMULATION".to_owned(),
        then: vec![Item::define("A_ADDRESS", "&::storage::A::R".to_owned())],
        otherwise: vec![Item::define("A_ADDRESS", "0x40000000".to_owned())],
      }],
    };

    assert_eq!(
      "#ifdef SIMULATION\n#define A_ADDRESS &::storage::A::R\n#else\n#define A_ADDRESS 0x40000000\n#endif\n",
      doc.render()
    );
  }
}
