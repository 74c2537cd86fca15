use serde::Serialize;

use super::{Diagnostic, Severity};
use crate::ast::SourceMap;

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    message: &'a str,
    labels: Vec<JsonLabel<'a>>,
    notes: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'a str>,
}

/// `line`/`col` are only present when the diagnostic carries its source.
#[derive(Serialize)]
struct JsonLabel<'a> {
    start: usize,
    end: usize,
    message: &'a str,
    primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    col: Option<usize>,
}

/// One diagnostic as a single-line JSON object.
pub fn render(d: &Diagnostic) -> String {
    let map = d.source.as_deref().map(SourceMap::new);
    let labels = d
        .labels
        .iter()
        .map(|label| {
            let position = map.as_ref().map(|m| m.lookup(label.span.start));
            JsonLabel {
                start: label.span.start,
                end: label.span.end,
                message: &label.message,
                primary: label.is_primary,
                line: position.map(|(line, _)| line),
                col: position.map(|(_, col)| col),
            }
        })
        .collect();

    let out = JsonDiagnostic {
        severity: match d.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        },
        code: d.code,
        message: &d.message,
        labels,
        notes: &d.notes,
        suggestion: d.suggestion.as_deref(),
    };

    match serde_json::to_string(&out) {
        Ok(json) => json,
        Err(e) => {
            log::error!("failed to serialize diagnostic: {e}");
            r#"{"severity":"error","message":"internal error serializing diagnostic"}"#.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;

    fn to_value(d: &Diagnostic) -> serde_json::Value {
        serde_json::from_str(&render(d)).expect("render produces valid JSON")
    }

    #[test]
    fn runtime_error_without_labels() {
        let v = to_value(&Diagnostic::error("stack underflow at ip 0").with_code("BFY-R002"));
        assert_eq!(v["severity"], "error");
        assert_eq!(v["code"], "BFY-R002");
        assert_eq!(v["message"], "stack underflow at ip 0");
        assert_eq!(v["labels"], serde_json::json!([]));
    }

    #[test]
    fn label_gets_position_from_source() {
        let d = Diagnostic::error("unexpected character '@'")
            .with_span(Span::new(6, 7), "here")
            .with_source("1 +\n2 @");
        let v = to_value(&d);
        assert_eq!(
            v["labels"][0],
            serde_json::json!({
                "start": 6, "end": 7, "message": "here", "primary": true, "line": 2, "col": 3
            })
        );
    }

    #[test]
    fn label_without_source_has_offsets_only() {
        let v = to_value(&Diagnostic::error("bad").with_span(Span::new(5, 8), "here"));
        let label = v["labels"][0].as_object().expect("label object");
        assert!(!label.contains_key("line"));
        assert!(!label.contains_key("col"));
        assert_eq!(label["start"], 5);
    }

    #[test]
    fn optional_keys_absent_when_unset() {
        let v = to_value(&Diagnostic::error("bad"));
        let obj = v.as_object().expect("object");
        assert!(!obj.contains_key("code"));
        assert!(!obj.contains_key("suggestion"));
    }

    #[test]
    fn notes_and_suggestion() {
        let d = Diagnostic::error("could not parse \"99999999999999999999\" as integer")
            .with_note("literals are signed 64-bit")
            .with_note("the largest is 9223372036854775807")
            .with_suggestion("use a smaller number");
        let v = to_value(&d);
        assert_eq!(v["notes"].as_array().map(Vec::len), Some(2));
        assert_eq!(v["suggestion"], "use a smaller number");
    }

    #[test]
    fn warning() {
        let v = to_value(&Diagnostic::warning("trailing input ignored").with_code("BFY-W001"));
        assert_eq!(v["severity"], "warning");
    }

    #[test]
    fn output_is_one_line() {
        let d = Diagnostic::error("multi\nline message").with_source("1\n2");
        assert_eq!(render(&d).lines().count(), 1);
    }
}
