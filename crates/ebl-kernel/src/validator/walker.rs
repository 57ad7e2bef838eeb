//! The single-pass document walker.
//!
//! Items are visited in document order. Rules that need the whole document
//! (data references and relationship endpoints, which may point forward)
//! queue their occurrences and are resolved when the walk leaves the
//! document.

use std::collections::HashSet;

use ebl_types::{canon, CanonicalName, DiagnosticSink, Diagnostics, ValidationIssue};

use crate::ast::{
    DataObjectDef, Document, EntityDef, Field, Ident, Item, ItemKind, ItAssetDef, ProcessDef,
    RelationshipDef, ReportDef, RuleDef,
};
use crate::dictionary::SymbolTable;

use super::actor_tracker::ActorTracker;
use super::options::ValidatorOptions;
use super::rules;

/// Validates documents against a symbol table.
///
/// The validator holds no per-run state, so one instance can check any
/// number of documents, from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    symbols: &'a SymbolTable,
    options: ValidatorOptions,
}

impl<'a> Validator<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self::with_options(symbols, ValidatorOptions::default())
    }

    pub fn with_options(symbols: &'a SymbolTable, options: ValidatorOptions) -> Self {
        Self { symbols, options }
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Walk the document once and return every issue found.
    pub fn validate(&self, doc: &Document) -> Diagnostics {
        tracing::debug!(items = doc.items.len(), "validating document");

        let mut walk = Walk {
            symbols: self.symbols,
            options: self.options,
            state: WalkState::default(),
            sink: DiagnosticSink::new(),
        };
        for item in &doc.items {
            walk.visit_item(item);
        }
        walk.exit_document();

        let diagnostics = walk.sink.finish();
        tracing::debug!(
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "validation finished"
        );
        diagnostics
    }
}

/// A reference checked once the whole document has been seen.
struct Pending {
    name: Ident,
    role: &'static str,
    context: String,
}

#[derive(Default)]
struct WalkState {
    data_objects: HashSet<CanonicalName>,
    /// Entities and IT assets declared in the document.
    assets: HashSet<CanonicalName>,
    data_refs: Vec<Pending>,
    endpoints: Vec<Pending>,
    actors: ActorTracker,
}

struct Walk<'a> {
    symbols: &'a SymbolTable,
    options: ValidatorOptions,
    state: WalkState,
    sink: DiagnosticSink,
}

fn item_context(kind: ItemKind, name: &Ident) -> String {
    format!("{kind} '{name}'")
}

fn field_context(item: &str, field: &Field) -> String {
    format!("{item}, field '{}'", field.name)
}

impl Walk<'_> {
    fn emit(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        for issue in issues {
            tracing::trace!(code = %issue.code, message = %issue.message, "rule fired");
            self.sink.record(issue);
        }
    }

    fn visit_item(&mut self, item: &Item) {
        match item {
            Item::Metadata(_) => {}
            Item::DataObject(d) => self.visit_data_object(d),
            Item::Entity(e) => self.visit_entity(e),
            Item::ItAsset(a) => self.visit_it_asset(a),
            Item::Relationship(r) => self.visit_relationship(r),
            Item::Process(p) => self.visit_process(p),
            Item::Rule(r) => self.visit_rule(r),
            Item::Report(r) => self.visit_report(r),
        }
    }

    fn visit_data_object(&mut self, d: &DataObjectDef) {
        let symbols = self.symbols;
        let context = item_context(ItemKind::DataObject, &d.name);
        self.state.data_objects.insert(CanonicalName::new(d.name.as_str()));
        self.emit(rules::reserved_name(symbols, &d.name, "DataObject", &context));

        for field in &d.fields {
            let context = field_context(&context, field);
            self.emit(rules::reserved_name(symbols, &field.name, "field", &context));
            self.emit(rules::field_range(field, &context));
            self.emit(rules::enum_without_values(field, &context));
        }
    }

    fn visit_entity(&mut self, e: &EntityDef) {
        let symbols = self.symbols;
        let context = item_context(ItemKind::Entity, &e.name);
        self.state.assets.insert(CanonicalName::new(e.name.as_str()));
        self.emit(rules::reserved_name(symbols, &e.name, "Entity", &context));

        if let Some(data_ref) = &e.data_ref {
            self.state.data_refs.push(Pending {
                name: data_ref.clone(),
                role: "dataRef",
                context: format!("{context}, dataRef"),
            });
        }

        for property in &e.properties {
            let context = field_context(&context, property);
            self.emit(rules::reserved_name(symbols, &property.name, "property", &context));
            self.emit(rules::field_range(property, &context));
            self.emit(rules::enum_default(property, &context));
        }
    }

    fn visit_it_asset(&mut self, a: &ItAssetDef) {
        let symbols = self.symbols;
        let context = item_context(ItemKind::ItAsset, &a.name);
        self.state.assets.insert(CanonicalName::new(a.name.as_str()));
        self.emit(rules::reserved_name(symbols, &a.name, "ITAsset", &context));

        for field in &a.fields {
            let context = field_context(&context, field);
            self.emit(rules::reserved_name(symbols, &field.name, "field", &context));
            self.emit(rules::field_range(field, &context));
        }
    }

    fn visit_relationship(&mut self, r: &RelationshipDef) {
        let symbols = self.symbols;
        let context = item_context(ItemKind::Relationship, &r.name);
        self.emit(rules::reserved_name(symbols, &r.name, "Relationship", &context));
        self.emit(rules::relationship_type(symbols, r, &context));

        if self.options.check_relationship_endpoints {
            for (endpoint, role) in [(&r.from, "From"), (&r.to, "To")] {
                self.state.endpoints.push(Pending {
                    name: endpoint.clone(),
                    role,
                    context: context.clone(),
                });
            }
        }
    }

    fn visit_process(&mut self, p: &ProcessDef) {
        let symbols = self.symbols;
        let context = item_context(ItemKind::Process, &p.name);
        self.emit(rules::reserved_name(symbols, &p.name, "Process", &context));

        self.state.actors.push_frame(p.name.as_str());

        let actors_context = format!("{context}, Actors");
        for actor in &p.actors {
            self.emit(rules::unknown_actor(symbols, actor, &actors_context));
            self.state.actors.declare(actor);
        }

        for (index, step) in p.steps.iter().enumerate() {
            let context = format!("{context}, step {}", index + 1);
            self.state.actors.mark_used(step.actor.as_str());
            self.emit(rules::unknown_actor(symbols, &step.actor, &context));
            self.emit(rules::step_verb(symbols, step, &context));
            self.emit(rules::step_data_access(symbols, step, &context));
            for data in &step.data {
                self.state.data_refs.push(Pending {
                    name: data.object.clone(),
                    role: "data",
                    context: context.clone(),
                });
            }
        }

        if let Some(frame) = self.state.actors.pop_frame() {
            self.emit(rules::unused_actors(&frame));
        }
    }

    fn visit_rule(&mut self, r: &RuleDef) {
        let symbols = self.symbols;
        let context = item_context(ItemKind::Rule, &r.name);
        self.emit(rules::reserved_name(symbols, &r.name, "Rule", &context));

        if self.options.check_free_text {
            self.emit(rules::reserved_in_text(symbols, &r.description, "Description", &r.name, &context));
            self.emit(rules::reserved_in_text(symbols, &r.trigger, "Trigger", &r.name, &context));
        }
    }

    fn visit_report(&mut self, r: &ReportDef) {
        let symbols = self.symbols;
        let context = item_context(ItemKind::Report, &r.name);
        self.emit(rules::reserved_name(symbols, &r.name, "Report", &context));

        if self.options.check_free_text {
            self.emit(rules::reserved_in_text(symbols, &r.query, "Query", &r.name, &context));
        }
    }

    /// Resolve everything that was allowed to point forward.
    fn exit_document(&mut self) {
        let symbols = self.symbols;

        for pending in std::mem::take(&mut self.state.data_refs) {
            let name = pending.name.as_str();
            let declared = self.state.data_objects.contains(canon(name).as_str());
            if !declared && !symbols.has_data_object(name) {
                tracing::trace!(role = pending.role, name, "unresolved data reference");
                self.emit([rules::unknown_data_ref(&pending.name, &pending.context)]);
            }
        }

        for pending in std::mem::take(&mut self.state.endpoints) {
            let name = pending.name.as_str();
            let known = self.state.assets.contains(canon(name).as_str())
                || symbols.has_entity(name)
                || symbols.has_actor(name);
            if !known {
                self.emit([rules::unknown_endpoint(&pending.name, pending.role, &pending.context)]);
            }
        }
    }
}
