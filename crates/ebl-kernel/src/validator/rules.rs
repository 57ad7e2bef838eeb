//! Individual validation rules.
//!
//! Each rule looks at one construct plus the symbol table and yields zero or
//! more issues. Rules never see each other's output.

use ebl_types::{canon, IssueCode, ValidationIssue};

use crate::ast::{Access, AttrValue, DataUse, Field, Ident, RelationshipDef, Step};
use crate::dictionary::{PermissionKind, SymbolTable};

use super::actor_tracker::ActorFrame;

fn issue(code: IssueCode, message: String, context: &str, at: &Ident) -> ValidationIssue {
    ValidationIssue::new(code, message)
        .with_context(context)
        .with_span(at.span)
}

/// A declaration or field name that collides with a reserved keyword.
pub fn reserved_name(
    symbols: &SymbolTable,
    name: &Ident,
    role: &str,
    context: &str,
) -> Option<ValidationIssue> {
    symbols.is_reserved(name.as_str()).then(|| {
        issue(
            IssueCode::ReservedWord,
            format!("'{name}' is a reserved keyword and cannot be used as a {role} name"),
            context,
            name,
        )
    })
}

pub fn unknown_actor(symbols: &SymbolTable, actor: &Ident, context: &str) -> Option<ValidationIssue> {
    (!symbols.has_actor(actor.as_str())).then(|| {
        issue(
            IssueCode::UnknownActor,
            format!("unknown actor '{actor}': not declared in any dictionary domain"),
            context,
            actor,
        )
    })
}

/// Verb checks for one step: existence, the actor's grant, and whether any
/// actor may perform it at all.
pub fn step_verb(symbols: &SymbolTable, step: &Step, context: &str) -> Vec<ValidationIssue> {
    let actor = step.actor.as_str();
    let verb = step.verb.as_str();
    let mut issues = Vec::new();

    let verb_known = symbols.has_verb(verb);
    if !verb_known {
        issues.push(issue(
            IssueCode::UnknownVerb,
            format!("unknown verb '{verb}': not declared in any dictionary domain"),
            context,
            &step.verb,
        ));
    }

    if symbols.has_actor(actor) && verb_known && !symbols.actor_allows_verb(actor, verb) {
        issues.push(issue(
            IssueCode::VerbNotPermitted,
            format!("actor '{actor}' is not permitted to perform verb '{verb}'"),
            context,
            &step.verb,
        ));
    }

    if !symbols.is_permitted_by_any_actor(verb) {
        issues.push(issue(
            IssueCode::VerbNeverPermitted,
            format!("verb '{verb}' is never permitted by any actor"),
            context,
            &step.verb,
        ));
    }

    issues
}

/// How a step touches a data object: the explicit qualifier if present,
/// otherwise whatever the verb's permission kind implies.
pub fn resolve_access(symbols: &SymbolTable, verb: &str, data: &DataUse) -> Option<Access> {
    data.access.or_else(|| match symbols.permission_kind_for_verb(verb) {
        Some(PermissionKind::Read) => Some(Access::Read),
        Some(PermissionKind::Write) => Some(Access::Write),
        _ => None,
    })
}

/// Read/write permission checks for every data object a step touches.
pub fn step_data_access(symbols: &SymbolTable, step: &Step, context: &str) -> Vec<ValidationIssue> {
    let actor = step.actor.as_str();
    step.data
        .iter()
        .filter_map(|data| {
            let object = data.object.as_str();
            let access = resolve_access(symbols, step.verb.as_str(), data)?;
            let (allowed, code) = match access {
                Access::Read => (symbols.can_read(actor, object), IssueCode::ReadNotPermitted),
                Access::Write => (symbols.can_write(actor, object), IssueCode::WriteNotPermitted),
            };
            (!allowed).then(|| {
                issue(
                    code,
                    format!("actor '{actor}' lacks {access} permission on data object '{object}'"),
                    context,
                    &data.object,
                )
            })
        })
        .collect()
}

pub fn relationship_type(
    symbols: &SymbolTable,
    rel: &RelationshipDef,
    context: &str,
) -> Option<ValidationIssue> {
    (!symbols.is_relationship_type(rel.rel_type.as_str())).then(|| {
        issue(
            IssueCode::UnknownRelationshipType,
            format!(
                "relationship '{}': type '{}' is not an allowed relationship type",
                rel.name, rel.rel_type
            ),
            context,
            &rel.rel_type,
        )
    })
}

/// `min=` greater than `max=`.
pub fn field_range(field: &Field, context: &str) -> Option<ValidationIssue> {
    let min = field.attr("min").and_then(AttrValue::as_number)?;
    let max = field.attr("max").and_then(AttrValue::as_number)?;
    (min > max).then(|| {
        issue(
            IssueCode::FieldRangeInverted,
            format!("field '{}': min ({min}) is greater than max ({max})", field.name),
            context,
            &field.name,
        )
    })
}

fn enum_values(field: &Field) -> Option<Vec<&str>> {
    match field.attr("values")? {
        AttrValue::List(items) => Some(items.iter().filter_map(AttrValue::as_text).collect()),
        single => single.as_text().map(|v| vec![v]),
    }
}

pub fn enum_without_values(field: &Field, context: &str) -> Option<ValidationIssue> {
    (field.is_enum() && field.attr("values").is_none()).then(|| {
        issue(
            IssueCode::EnumWithoutValues,
            format!("enum field '{}' declares no values", field.name),
            context,
            &field.name,
        )
    })
}

/// An enum `default=` that is not one of its `values=`.
pub fn enum_default(field: &Field, context: &str) -> Option<ValidationIssue> {
    if !field.is_enum() {
        return None;
    }
    let default = field.attr("default")?.as_text()?;
    let values = enum_values(field)?;
    if values.is_empty() || values.contains(&default) {
        return None;
    }
    Some(issue(
        IssueCode::EnumDefaultNotInValues,
        format!(
            "enum property '{}': default '{default}' is not one of [{}]",
            field.name,
            values.join(", ")
        ),
        context,
        &field.name,
    ))
}

/// Reserved keywords appearing as whole words in free text, once each in
/// order of first appearance.
pub fn reserved_in_text(
    symbols: &SymbolTable,
    text: &str,
    label: &str,
    owner: &Ident,
    context: &str,
) -> Vec<ValidationIssue> {
    let mut seen = Vec::new();
    for word in text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_')) {
        if word.is_empty() || !symbols.is_reserved(word) {
            continue;
        }
        let key = canon(word);
        if !seen.contains(&key) {
            seen.push(key);
        }
    }
    seen.into_iter()
        .map(|keyword| {
            issue(
                IssueCode::ReservedWordInText,
                format!("{label} mentions reserved keyword '{keyword}'"),
                context,
                owner,
            )
        })
        .collect()
}

/// One warning per actor declared in the closed frame but never used.
pub fn unused_actors(frame: &ActorFrame) -> Vec<ValidationIssue> {
    frame
        .unused()
        .map(|actor| {
            issue(
                IssueCode::UnusedActor,
                format!(
                    "unused actor '{actor}': declared in Process '{}' but never used in any step",
                    frame.process()
                ),
                &format!("Process '{}'", frame.process()),
                actor,
            )
        })
        .collect()
}

pub fn unknown_data_ref(name: &Ident, context: &str) -> ValidationIssue {
    issue(
        IssueCode::UnknownDataRef,
        format!("unknown data reference '{name}': declared neither in the document nor in the dictionary"),
        context,
        name,
    )
}

pub fn unknown_endpoint(endpoint: &Ident, role: &str, context: &str) -> ValidationIssue {
    issue(
        IssueCode::UnknownRelationshipEndpoint,
        format!("relationship {role} '{endpoint}' is not a known entity, IT asset or actor"),
        context,
        endpoint,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::actor_tracker::ActorTracker;
    use ebl_types::Span;
    use rstest::rstest;

    const DICT: &str = r#"{
        "core": {
            "keywords": { "reserved": ["Process", "Rule", "Report"] },
            "verbPermissions": { "Transfer": "write", "View": "read", "Run": "execute" },
            "relationshipTypes": ["owns"]
        },
        "domains": {
            "banking": {
                "dataObjects": ["DO_Ledger", "DO_Rates"],
                "verbs": ["Transfer", "View", "Run", "Obfuscate"],
                "actors": ["Teller", "Auditor"],
                "actorVerbs": { "Teller": ["Transfer", "View", "Run"], "Auditor": ["View"] },
                "actorDataPerms": {
                    "Teller": { "read": ["DO_Rates"], "write": ["DO_Ledger"] }
                }
            }
        }
    }"#;

    fn symbols() -> SymbolTable {
        SymbolTable::from_json_str(DICT).expect("valid dictionary")
    }

    fn id(name: &str) -> Ident {
        Ident::new(name, Span::new(0, name.len()))
    }

    fn step(actor: &str, verb: &str, data: &[(&str, Option<Access>)]) -> Step {
        Step {
            actor: id(actor),
            verb: id(verb),
            data: data
                .iter()
                .map(|(object, access)| DataUse {
                    object: id(object),
                    access: *access,
                })
                .collect(),
            note: None,
        }
    }

    fn codes(issues: &[ValidationIssue]) -> Vec<&'static str> {
        issues.iter().map(|i| i.code.code()).collect()
    }

    #[rstest]
    #[case("Teller", "Transfer", &[])]
    #[case("Auditor", "Transfer", &["E103"])]
    #[case("Teller", "Approve", &["E102", "W202"])]
    #[case("Stranger", "Transfer", &[])]
    #[case("Teller", "Obfuscate", &["E103", "W202"])]
    fn verb_rules(#[case] actor: &str, #[case] verb: &str, #[case] expected: &[&str]) {
        let issues = step_verb(&symbols(), &step(actor, verb, &[]), "Process 'P', step 1");
        assert_eq!(codes(&issues), expected);
    }

    #[rstest]
    #[case("Transfer", "DO_Ledger", None, &[])]
    #[case("Transfer", "DO_Rates", None, &["E105"])]
    #[case("View", "DO_Rates", None, &[])]
    #[case("View", "DO_Ledger", None, &["E104"])]
    #[case("Run", "DO_Ledger", None, &[])]
    #[case("Run", "DO_Ledger", Some(Access::Read), &["E104"])]
    #[case("View", "DO_Rates", Some(Access::Write), &["E105"])]
    fn data_access_rules(
        #[case] verb: &str,
        #[case] object: &str,
        #[case] access: Option<Access>,
        #[case] expected: &[&str],
    ) {
        let issues = step_data_access(&symbols(), &step("Teller", verb, &[(object, access)]), "ctx");
        assert_eq!(codes(&issues), expected);
    }

    #[test]
    fn unrestricted_actor_touches_anything() {
        let issues = step_data_access(
            &symbols(),
            &step("Auditor", "Transfer", &[("DO_Ledger", None), ("DO_Rates", Some(Access::Read))]),
            "ctx",
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn data_access_message() {
        let issues = step_data_access(&symbols(), &step("Teller", "Transfer", &[("DO_Rates", None)]), "ctx");
        assert_eq!(
            issues[0].message,
            "actor 'Teller' lacks write permission on data object 'DO_Rates'"
        );
    }

    #[test]
    fn never_permitted_message_is_stable() {
        let issues = step_verb(&symbols(), &step("Stranger", "Obfuscate", &[]), "ctx");
        assert_eq!(codes(&issues), ["W202"]);
        assert!(issues[0].message.contains("never permitted by any actor"));
    }

    #[rstest]
    #[case("Process", true)]
    #[case("process", true)]
    #[case("Settle", false)]
    fn reserved_names(#[case] name: &str, #[case] fires: bool) {
        assert_eq!(reserved_name(&symbols(), &id(name), "Process", "ctx").is_some(), fires);
    }

    #[test]
    fn relationship_type_rule() {
        let rel = |ty: &str| RelationshipDef {
            name: id("R"),
            from: id("A"),
            to: id("B"),
            rel_type: id(ty),
        };
        assert!(relationship_type(&symbols(), &rel("Owns"), "ctx").is_none());
        let issue = relationship_type(&symbols(), &rel("adores"), "ctx").expect("fires");
        assert_eq!(issue.code, IssueCode::UnknownRelationshipType);
        assert_eq!(issue.span, Some(Span::new(0, 6)));
    }

    fn field(ty: &str, attrs: &[(&str, AttrValue)]) -> Field {
        Field {
            name: id("status"),
            ty: id(ty),
            attrs: attrs
                .iter()
                .map(|(name, value)| crate::ast::FieldAttr {
                    name: id(name),
                    value: value.clone(),
                })
                .collect(),
        }
    }

    fn num(n: &str) -> AttrValue {
        AttrValue::Number(n.into())
    }

    fn words(ws: &[&str]) -> AttrValue {
        AttrValue::List(ws.iter().map(|w| AttrValue::Word((*w).into())).collect())
    }

    #[test]
    fn field_range_rule() {
        assert!(field_range(&field("Decimal", &[("min", num("10")), ("max", num("1"))]), "ctx").is_some());
        assert!(field_range(&field("Decimal", &[("min", num("1")), ("max", num("10"))]), "ctx").is_none());
        assert!(field_range(&field("Decimal", &[("min", num("1")), ("max", num("1"))]), "ctx").is_none());
        assert!(field_range(&field("Decimal", &[("min", num("10"))]), "ctx").is_none());
        assert!(
            field_range(&field("Decimal", &[("min", AttrValue::Word("ten".into())), ("max", num("1"))]), "ctx")
                .is_none()
        );
    }

    #[test]
    fn enum_rules() {
        assert!(enum_without_values(&field("Enum", &[]), "ctx").is_some());
        assert!(enum_without_values(&field("Enum", &[("values", words(&["a"]))]), "ctx").is_none());
        assert!(enum_without_values(&field("String", &[]), "ctx").is_none());

        let ok = field(
            "Enum",
            &[("values", words(&["open", "closed"])), ("default", AttrValue::Word("open".into()))],
        );
        assert!(enum_default(&ok, "ctx").is_none());

        let bad = field(
            "Enum",
            &[("values", words(&["open", "closed"])), ("default", AttrValue::Str("pending".into()))],
        );
        let issue = enum_default(&bad, "ctx").expect("fires");
        assert_eq!(
            issue.message,
            "enum property 'status': default 'pending' is not one of [open, closed]"
        );

        let empty = field("Enum", &[("values", words(&[])), ("default", AttrValue::Word("x".into()))]);
        assert!(enum_default(&empty, "ctx").is_none());
    }

    #[test]
    fn free_text_reports_each_keyword_once() {
        let issues = reserved_in_text(
            &symbols(),
            "Run the Process, then the report; process again",
            "Description",
            &id("R1"),
            "Rule 'R1'",
        );
        let messages: Vec<_> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "Description mentions reserved keyword 'process'",
                "Description mentions reserved keyword 'report'",
            ]
        );
    }

    #[test]
    fn free_text_matches_whole_words_only() {
        let issues = reserved_in_text(&symbols(), "Processing Reports", "Query", &id("R"), "ctx");
        assert!(issues.is_empty());
    }

    #[test]
    fn unused_actor_wording() {
        let mut tracker = ActorTracker::default();
        tracker.push_frame("Onboard");
        tracker.declare(&id("ComplianceOfficer"));
        let frame = tracker.pop_frame().expect("frame");
        let issues = unused_actors(&frame);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "unused actor 'ComplianceOfficer': declared in Process 'Onboard' but never used in any step"
        );
        assert_eq!(issues[0].context.as_deref(), Some("Process 'Onboard'"));
    }
}
