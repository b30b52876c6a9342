//! Opcode registry.
//!
//! Maps instruction attribute names (`data-if`, `data-css-class`, ...) to opcodes
//! and classifies every opcode into exactly one [`OpcodeType`]. The name
//! derivation strips the instruction prefix, upper-cases the rest and turns
//! hyphens into underscores; anything that does not land on a known name is
//! [`Opcode::None`] and passes through untouched.

use std::fmt;

use crate::element::ElementHandle;

/// Default instruction attribute prefix.
pub const OPCODE_PREFIX: &str = "data-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    None,
    Attr,
    Id,
    Src,
    Href,
    Title,
    Value,
    Exclude,
    Goto,
    If,
    IfNot,
    Case,
    Text,
    Html,
    Numbering,
    Object,
    List,
    OList,
    Map,
    OMap,
    CssClass,
}

/// Instruction class. Drives the one-slot-per-type bucketing of an element's operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeType {
    None,
    Jump,
    Conditional,
    Content,
    Attribute,
}

impl Opcode {
    /// Every real opcode, in registry order.
    pub const ALL: [Opcode; 20] = [
        Opcode::Attr,
        Opcode::Id,
        Opcode::Src,
        Opcode::Href,
        Opcode::Title,
        Opcode::Value,
        Opcode::Exclude,
        Opcode::Goto,
        Opcode::If,
        Opcode::IfNot,
        Opcode::Case,
        Opcode::Text,
        Opcode::Html,
        Opcode::Numbering,
        Opcode::Object,
        Opcode::List,
        Opcode::OList,
        Opcode::Map,
        Opcode::OMap,
        Opcode::CssClass,
    ];

    /// Resolve an attribute name to its opcode, `Opcode::None` when the name is not an instruction.
    pub fn from_attr_name(attr_name: &str, prefix: &str) -> Opcode {
        let Some(rest) = attr_name.strip_prefix(prefix) else {
            return Opcode::None;
        };
        let name = rest.to_ascii_uppercase().replace('-', "_");
        Opcode::from_name(&name)
    }

    /// Look up an opcode by its symbolic name (`"CSS_CLASS"`, `"OLIST"`, ...).
    pub fn from_name(name: &str) -> Opcode {
        match name {
            "ATTR" => Opcode::Attr,
            "ID" => Opcode::Id,
            "SRC" => Opcode::Src,
            "HREF" => Opcode::Href,
            "TITLE" => Opcode::Title,
            "VALUE" => Opcode::Value,
            "EXCLUDE" => Opcode::Exclude,
            "GOTO" => Opcode::Goto,
            "IF" => Opcode::If,
            "IFNOT" => Opcode::IfNot,
            "CASE" => Opcode::Case,
            "TEXT" => Opcode::Text,
            "HTML" => Opcode::Html,
            "NUMBERING" => Opcode::Numbering,
            "OBJECT" => Opcode::Object,
            "LIST" => Opcode::List,
            "OLIST" => Opcode::OList,
            "MAP" => Opcode::Map,
            "OMAP" => Opcode::OMap,
            "CSS_CLASS" => Opcode::CssClass,
            _ => Opcode::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::None => "NONE",
            Opcode::Attr => "ATTR",
            Opcode::Id => "ID",
            Opcode::Src => "SRC",
            Opcode::Href => "HREF",
            Opcode::Title => "TITLE",
            Opcode::Value => "VALUE",
            Opcode::Exclude => "EXCLUDE",
            Opcode::Goto => "GOTO",
            Opcode::If => "IF",
            Opcode::IfNot => "IFNOT",
            Opcode::Case => "CASE",
            Opcode::Text => "TEXT",
            Opcode::Html => "HTML",
            Opcode::Numbering => "NUMBERING",
            Opcode::Object => "OBJECT",
            Opcode::List => "LIST",
            Opcode::OList => "OLIST",
            Opcode::Map => "MAP",
            Opcode::OMap => "OMAP",
            Opcode::CssClass => "CSS_CLASS",
        }
    }

    pub fn opcode_type(self) -> OpcodeType {
        match self {
            Opcode::None => OpcodeType::None,
            Opcode::Goto => OpcodeType::Jump,
            Opcode::Exclude | Opcode::If | Opcode::IfNot | Opcode::Case => OpcodeType::Conditional,
            Opcode::Text
            | Opcode::Html
            | Opcode::Numbering
            | Opcode::Object
            | Opcode::List
            | Opcode::OList
            | Opcode::Map
            | Opcode::OMap => OpcodeType::Content,
            Opcode::Attr
            | Opcode::Id
            | Opcode::Src
            | Opcode::Href
            | Opcode::Title
            | Opcode::Value
            | Opcode::CssClass => OpcodeType::Attribute,
        }
    }

    /// Attribute name carrying this opcode under `prefix`.
    pub fn attr_name(self, prefix: &str) -> String {
        format!("{}{}", prefix, self.name().to_lowercase().replace('_', "-"))
    }

    /// Test whether `element` carries the named instruction, e.g. `has_operator(el, "data-", "list")`.
    pub fn has_operator<E: ElementHandle>(element: &E, prefix: &str, operator_name: &str) -> bool {
        element.has_attr(&format!("{}{}", prefix, operator_name.to_ascii_lowercase()))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for OpcodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpcodeType::None => "NONE",
            OpcodeType::Jump => "JUMP",
            OpcodeType::Conditional => "CONDITIONAL",
            OpcodeType::Content => "CONTENT",
            OpcodeType::Attribute => "ATTRIBUTE",
        };
        f.write_str(name)
    }
}
