//! Syntax tree types for EBL documents.
//!
//! The parser produces a [`Document`]; the validator walks it once. Every name
//! the validator may complain about is an [`Ident`] carrying its source span.

use std::fmt;

use ebl_types::Span;

/// A complete EBL document: a sequence of top-level definitions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub items: Vec<Item>,
}

/// An identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `Metadata { Vertical: "banking" }`
    Metadata(Metadata),
    /// `DataObject DO_Payment { amount: Decimal min=0 }`
    DataObject(DataObjectDef),
    /// `Entity Payment { dataRef: DO_Payment ... }`
    Entity(EntityDef),
    /// `ITAsset CoreLedger { ... }`
    ItAsset(ItAssetDef),
    /// `Relationship R { From: A To: B Type: owns }`
    Relationship(RelationshipDef),
    /// `Process P { Actors: [...] Steps: - A Verb ... }`
    Process(ProcessDef),
    /// `Rule R { Description: "..." Trigger: "..." }`
    Rule(RuleDef),
    /// `Report R { Query: "..." }`
    Report(ReportDef),
}

/// Discriminant of [`Item`], used in diagnostic context strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Metadata,
    DataObject,
    Entity,
    ItAsset,
    Relationship,
    Process,
    Rule,
    Report,
}

impl ItemKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ItemKind::Metadata => "Metadata",
            ItemKind::DataObject => "DataObject",
            ItemKind::Entity => "Entity",
            ItemKind::ItAsset => "ITAsset",
            ItemKind::Relationship => "Relationship",
            ItemKind::Process => "Process",
            ItemKind::Rule => "Rule",
            ItemKind::Report => "Report",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Metadata(_) => ItemKind::Metadata,
            Item::DataObject(_) => ItemKind::DataObject,
            Item::Entity(_) => ItemKind::Entity,
            Item::ItAsset(_) => ItemKind::ItAsset,
            Item::Relationship(_) => ItemKind::Relationship,
            Item::Process(_) => ItemKind::Process,
            Item::Rule(_) => ItemKind::Rule,
            Item::Report(_) => ItemKind::Report,
        }
    }

    /// The declared name, if the construct has one.
    pub fn name(&self) -> Option<&Ident> {
        match self {
            Item::Metadata(_) => None,
            Item::DataObject(d) => Some(&d.name),
            Item::Entity(e) => Some(&e.name),
            Item::ItAsset(a) => Some(&a.name),
            Item::Relationship(r) => Some(&r.name),
            Item::Process(p) => Some(&p.name),
            Item::Rule(r) => Some(&r.name),
            Item::Report(r) => Some(&r.name),
        }
    }
}

/// Free-form key/value header.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub entries: Vec<(Ident, AttrValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataObjectDef {
    pub name: Ident,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityDef {
    pub name: Ident,
    /// `dataRef: DO_X`: the data object backing this entity.
    pub data_ref: Option<Ident>,
    pub properties: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItAssetDef {
    pub name: Ident,
    pub fields: Vec<Field>,
}

/// A typed field or property: `name: Type attr=value ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Ident,
    pub ty: Ident,
    pub attrs: Vec<FieldAttr>,
}

impl Field {
    /// Look up an attribute by name.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs
            .iter()
            .find(|a| a.name.name == name)
            .map(|a| &a.value)
    }

    pub fn is_enum(&self) -> bool {
        self.ty.name == "Enum"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldAttr {
    pub name: Ident,
    pub value: AttrValue,
}

/// Attribute or metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    /// Numeric literal, kept as written.
    Number(String),
    /// Bare word such as `true` or `pending`.
    Word(String),
    List(Vec<AttrValue>),
}

impl AttrValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => n.parse().ok(),
            _ => None,
        }
    }

    /// Textual form of a scalar; `None` for lists.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) | AttrValue::Number(s) | AttrValue::Word(s) => Some(s),
            AttrValue::List(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipDef {
    pub name: Ident,
    pub from: Ident,
    pub to: Ident,
    pub rel_type: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessDef {
    pub name: Ident,
    /// `Actors: [...]`; empty when the section is absent.
    pub actors: Vec<Ident>,
    pub steps: Vec<Step>,
}

/// A process step: `- Actor Verb [reads|writes] DataObject ... ["note"]`
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub actor: Ident,
    pub verb: Ident,
    pub data: Vec<DataUse>,
    pub note: Option<String>,
}

/// A data object touched by a step.
#[derive(Debug, Clone, PartialEq)]
pub struct DataUse {
    pub object: Ident,
    /// Explicit qualifier; `None` defers to the verb's permission kind.
    pub access: Option<Access>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => f.write_str("read"),
            Access::Write => f.write_str("write"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleDef {
    pub name: Ident,
    pub description: String,
    pub trigger: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDef {
    pub name: Ident,
    pub query: String,
}
