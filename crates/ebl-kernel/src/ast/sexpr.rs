//! S-expression rendering of the AST.
//!
//! Spans are omitted so assertions stay readable:
//!
//! ```text
//! (process Settle (actors Teller) (step Teller Transfer (writes DO_Ledger)))
//! ```

use super::types::*;

/// Render a whole document, one top-level item per line.
pub fn format_document(doc: &Document) -> String {
    doc.items
        .iter()
        .map(format_item)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_item(item: &Item) -> String {
    match item {
        Item::Metadata(m) => {
            let entries: Vec<String> = m
                .entries
                .iter()
                .map(|(k, v)| format!("({} {})", k, format_value(v)))
                .collect();
            list("metadata", &entries)
        }
        Item::DataObject(d) => {
            let mut parts = vec![d.name.to_string()];
            parts.extend(d.fields.iter().map(format_field));
            list("data-object", &parts)
        }
        Item::Entity(e) => {
            let mut parts = vec![e.name.to_string()];
            if let Some(data_ref) = &e.data_ref {
                parts.push(format!("(data-ref {data_ref})"));
            }
            parts.extend(e.properties.iter().map(format_field));
            list("entity", &parts)
        }
        Item::ItAsset(a) => {
            let mut parts = vec![a.name.to_string()];
            parts.extend(a.fields.iter().map(format_field));
            list("it-asset", &parts)
        }
        Item::Relationship(r) => list(
            "relationship",
            &[
                r.name.to_string(),
                r.from.to_string(),
                r.to.to_string(),
                r.rel_type.to_string(),
            ],
        ),
        Item::Process(p) => {
            let mut parts = vec![p.name.to_string()];
            if !p.actors.is_empty() {
                let actors: Vec<String> = p.actors.iter().map(|a| a.to_string()).collect();
                parts.push(list("actors", &actors));
            }
            parts.extend(p.steps.iter().map(format_step));
            list("process", &parts)
        }
        Item::Rule(r) => list(
            "rule",
            &[
                r.name.to_string(),
                format!("{:?}", r.description),
                format!("{:?}", r.trigger),
            ],
        ),
        Item::Report(r) => list("report", &[r.name.to_string(), format!("{:?}", r.query)]),
    }
}

fn format_step(step: &Step) -> String {
    let mut parts = vec![step.actor.to_string(), step.verb.to_string()];
    for data in &step.data {
        parts.push(match data.access {
            Some(Access::Read) => format!("(reads {})", data.object),
            Some(Access::Write) => format!("(writes {})", data.object),
            None => data.object.to_string(),
        });
    }
    if let Some(note) = &step.note {
        parts.push(format!("{note:?}"));
    }
    list("step", &parts)
}

fn format_field(field: &Field) -> String {
    let mut parts = vec![field.name.to_string(), field.ty.to_string()];
    parts.extend(
        field
            .attrs
            .iter()
            .map(|a| format!("({} {})", a.name, format_value(&a.value))),
    );
    list("field", &parts)
}

fn format_value(value: &AttrValue) -> String {
    match value {
        AttrValue::Str(s) => format!("{s:?}"),
        AttrValue::Number(n) => n.clone(),
        AttrValue::Word(w) => w.clone(),
        AttrValue::List(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", inner.join(" "))
        }
    }
}

fn list(head: &str, parts: &[String]) -> String {
    if parts.is_empty() {
        format!("({head})")
    } else {
        format!("({head} {})", parts.join(" "))
    }
}
