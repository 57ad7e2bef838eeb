//! The compiled, read-only symbol table.
//!
//! Every name is canonicalized on the way in and on every query, so lookups
//! are insensitive to case and punctuation. Compilation is a pure union over
//! all domains of all supplied dictionaries: nothing a later domain says can
//! remove a grant made by an earlier one.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use ebl_types::{canon, CanonicalName};
use serde::Serialize;

use super::raw::RawDictionary;
use crate::error::DictionaryError;

/// What a verb does to the data it touches.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionKind {
    Read,
    Execute,
    Write,
    /// Any other label; carried through but never drives a data check.
    #[serde(untagged)]
    Other(String),
}

impl PermissionKind {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "read" => PermissionKind::Read,
            "write" => PermissionKind::Write,
            "execute" => PermissionKind::Execute,
            other => PermissionKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionKind::Read => f.write_str("read"),
            PermissionKind::Write => f.write_str("write"),
            PermissionKind::Execute => f.write_str("execute"),
            PermissionKind::Other(label) => f.write_str(label),
        }
    }
}

/// An actor's grant for one permission dimension.
///
/// An actor with no entry, or with an empty list, is unrestricted. Only a
/// non-empty list narrows what the actor may do.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Restriction {
    #[default]
    Unrestricted,
    RestrictedTo(BTreeSet<CanonicalName>),
}

static UNRESTRICTED: Restriction = Restriction::Unrestricted;

impl Restriction {
    fn from_set(set: BTreeSet<CanonicalName>) -> Self {
        if set.is_empty() {
            Restriction::Unrestricted
        } else {
            Restriction::RestrictedTo(set)
        }
    }

    /// Whether `name` (raw, canonicalized here) is allowed.
    pub fn allows(&self, name: &str) -> bool {
        match self {
            Restriction::Unrestricted => true,
            Restriction::RestrictedTo(set) => set.contains(canon(name).as_str()),
        }
    }
}

type Grants = BTreeMap<CanonicalName, BTreeSet<CanonicalName>>;

/// Canonical form of a raw name; `None` when nothing word-like remains.
fn canonical(raw: &str) -> Option<CanonicalName> {
    let name = CanonicalName::new(raw);
    (!name.is_empty()).then_some(name)
}

fn collect_names<'a>(names: impl IntoIterator<Item = &'a String>) -> BTreeSet<CanonicalName> {
    names.into_iter().filter_map(|n| canonical(n)).collect()
}

/// Merge `actor -> names` grants into an accumulator. An actor that appears
/// with an empty list still gets an (empty) entry.
fn merge_grants<'a>(
    mut acc: Grants,
    grants: impl IntoIterator<Item = (&'a String, &'a Vec<String>)>,
) -> Grants {
    for (actor, names) in grants {
        let Some(actor) = canonical(actor) else {
            continue;
        };
        acc.entry(actor).or_default().extend(collect_names(names));
    }
    acc
}

fn into_restrictions(grants: Grants) -> BTreeMap<CanonicalName, Restriction> {
    grants
        .into_iter()
        .map(|(actor, set)| (actor, Restriction::from_set(set)))
        .collect()
}

/// Immutable lookup surface over one or more dictionaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolTable {
    reserved: BTreeSet<CanonicalName>,
    verb_permissions: BTreeMap<CanonicalName, PermissionKind>,
    relationship_types: BTreeSet<CanonicalName>,
    actors: BTreeSet<CanonicalName>,
    verbs: BTreeSet<CanonicalName>,
    entities: BTreeSet<CanonicalName>,
    data_objects: BTreeSet<CanonicalName>,
    actor_verbs: BTreeMap<CanonicalName, Restriction>,
    actor_reads: BTreeMap<CanonicalName, Restriction>,
    actor_writes: BTreeMap<CanonicalName, Restriction>,
    /// Union of every actor's verb list. Unrestricted when that union is empty.
    permitted_verbs: Restriction,
    doc_types_by_jurisdiction: BTreeMap<CanonicalName, BTreeSet<CanonicalName>>,
}

impl SymbolTable {
    /// Compile a single dictionary.
    pub fn compile(raw: &RawDictionary) -> Self {
        Self::compile_all(std::slice::from_ref(raw))
    }

    /// Compile the union of several dictionaries.
    ///
    /// When two sources assign different permission kinds to the same verb
    /// the greater kind wins (`write` over `execute` over `read`), so the
    /// result does not depend on load order.
    pub fn compile_all(raws: &[RawDictionary]) -> Self {
        let mut verb_permissions: BTreeMap<CanonicalName, PermissionKind> = BTreeMap::new();
        for (verb, label) in raws.iter().flat_map(|r| &r.core.verb_permissions) {
            let Some(verb) = canonical(verb) else {
                continue;
            };
            let kind = PermissionKind::parse(label);
            match verb_permissions.get(&verb) {
                Some(existing) if *existing >= kind => {
                    if *existing != kind {
                        tracing::warn!(verb = %verb, kept = %existing, dropped = %kind, "conflicting verb permission");
                    }
                }
                _ => {
                    verb_permissions.insert(verb, kind);
                }
            }
        }

        let domains: Vec<_> = raws.iter().flat_map(|r| r.domains()).collect();

        let actor_verbs = domains
            .iter()
            .fold(Grants::new(), |acc, (_, d)| merge_grants(acc, &d.actor_verbs));
        let actor_reads = domains.iter().fold(Grants::new(), |acc, (_, d)| {
            merge_grants(acc, d.actor_data_perms.iter().map(|(a, p)| (a, &p.read)))
        });
        let actor_writes = domains.iter().fold(Grants::new(), |acc, (_, d)| {
            merge_grants(acc, d.actor_data_perms.iter().map(|(a, p)| (a, &p.write)))
        });

        let permitted_verbs = Restriction::from_set(actor_verbs.values().flatten().cloned().collect());

        let doc_types_by_jurisdiction = domains.iter().fold(Grants::new(), |acc, (_, d)| {
            merge_grants(acc, &d.doc_types_by_jurisdiction)
        });

        let table = SymbolTable {
            reserved: collect_names(raws.iter().flat_map(|r| &r.core.keywords.reserved)),
            verb_permissions,
            relationship_types: collect_names(
                raws.iter()
                    .flat_map(|r| &r.core.relationship_types)
                    .chain(domains.iter().flat_map(|(_, d)| &d.relationships)),
            ),
            actors: collect_names(domains.iter().flat_map(|(_, d)| &d.actors)),
            verbs: collect_names(domains.iter().flat_map(|(_, d)| &d.verbs)),
            entities: collect_names(domains.iter().flat_map(|(_, d)| &d.entities)),
            data_objects: collect_names(domains.iter().flat_map(|(_, d)| &d.data_objects)),
            actor_verbs: into_restrictions(actor_verbs),
            actor_reads: into_restrictions(actor_reads),
            actor_writes: into_restrictions(actor_writes),
            permitted_verbs,
            doc_types_by_jurisdiction,
        };

        tracing::debug!(
            sources = raws.len(),
            domains = domains.len(),
            actors = table.actors.len(),
            verbs = table.verbs.len(),
            data_objects = table.data_objects.len(),
            reserved = table.reserved.len(),
            "compiled symbol table"
        );
        table
    }

    /// Decode and compile a dictionary from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        RawDictionary::from_json_str(json).map(|raw| Self::compile(&raw))
    }

    /// Load and compile the union of several dictionary files.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self, DictionaryError> {
        let raws = paths
            .iter()
            .map(|p| RawDictionary::from_path(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::compile_all(&raws))
    }

    pub fn has_actor(&self, name: &str) -> bool {
        self.actors.contains(canon(name).as_str())
    }

    pub fn has_verb(&self, name: &str) -> bool {
        self.verbs.contains(canon(name).as_str())
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.contains(canon(name).as_str())
    }

    pub fn has_data_object(&self, name: &str) -> bool {
        self.data_objects.contains(canon(name).as_str())
    }

    /// Relationship tags come from the core list and every domain's
    /// `relationships`.
    pub fn is_relationship_type(&self, name: &str) -> bool {
        self.relationship_types.contains(canon(name).as_str())
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(canon(name).as_str())
    }

    /// The actor's verb restriction. Unknown actors are unrestricted.
    pub fn verb_restriction(&self, actor: &str) -> &Restriction {
        self.actor_verbs
            .get(canon(actor).as_str())
            .unwrap_or(&UNRESTRICTED)
    }

    pub fn read_restriction(&self, actor: &str) -> &Restriction {
        self.actor_reads
            .get(canon(actor).as_str())
            .unwrap_or(&UNRESTRICTED)
    }

    pub fn write_restriction(&self, actor: &str) -> &Restriction {
        self.actor_writes
            .get(canon(actor).as_str())
            .unwrap_or(&UNRESTRICTED)
    }

    pub fn actor_allows_verb(&self, actor: &str, verb: &str) -> bool {
        self.verb_restriction(actor).allows(verb)
    }

    pub fn can_read(&self, actor: &str, data_object: &str) -> bool {
        self.read_restriction(actor).allows(data_object)
    }

    pub fn can_write(&self, actor: &str, data_object: &str) -> bool {
        self.write_restriction(actor).allows(data_object)
    }

    pub fn permission_kind_for_verb(&self, verb: &str) -> Option<&PermissionKind> {
        self.verb_permissions.get(canon(verb).as_str())
    }

    /// Whether at least one actor lists the verb. Vacuously true when no
    /// actor lists any verb.
    pub fn is_permitted_by_any_actor(&self, verb: &str) -> bool {
        self.permitted_verbs.allows(verb)
    }

    /// Document types registered for a jurisdiction.
    pub fn doc_types_for(&self, jurisdiction: &str) -> impl Iterator<Item = &CanonicalName> {
        self.doc_types_by_jurisdiction
            .get(canon(jurisdiction).as_str())
            .into_iter()
            .flatten()
    }
}
