//! Conversion of the producer's `stats.js` object literal into JSON.
//!
//! The report writes its data as a JavaScript assignment
//! (`var stats = { type: "GROUP", ... }`) followed by display script. Only
//! the first top-level object literal is of interest. JavaScript object
//! syntax differs from JSON in a few ways the producer actually uses, and a
//! couple more that hand-edited files pick up:
//!
//! - bare identifier keys (`type:`, `pathFormatted:`) are quoted,
//! - single-quoted strings are rewritten as double-quoted,
//! - trailing commas before `}` / `]` are dropped.
//!
//! Everything else is passed through for `serde_json` to judge.

use crate::error::StatsError;

/// Extract the first object literal in `text` and return it as JSON text.
pub fn object_literal_to_json(text: &str) -> Result<String, StatsError> {
    let start = text
        .find('{')
        .ok_or_else(|| StatsError::Parse("no object literal found".to_string()))?;
    let chars: Vec<char> = text[start..].chars().collect();
    let mut out = String::with_capacity(chars.len() + 128);
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                i = copy_string(&chars, i, &mut out)?;
                continue;
            }
            '{' | '[' => {
                depth += 1;
                out.push(c);
            }
            '}' | ']' => {
                out.push(c);
                depth -= 1;
                if depth == 0 {
                    return Ok(out);
                }
            }
            ',' => {
                if !matches!(next_significant(&chars, i + 1), Some('}') | Some(']')) {
                    out.push(',');
                }
            }
            c if is_ident_start(c) => {
                let end = ident_end(&chars, i);
                let ident: String = chars[i..end].iter().collect();
                if next_significant(&chars, end) == Some(':') {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
                i = end;
                continue;
            }
            _ => out.push(c),
        }
        i += 1;
    }

    Err(StatsError::Parse(
        "unterminated object literal".to_string(),
    ))
}

/// Copy the string literal starting at `chars[start]` as a JSON string.
/// Returns the index just past the closing quote.
fn copy_string(chars: &[char], start: usize, out: &mut String) -> Result<usize, StatsError> {
    let quote = chars[start];
    out.push('"');
    let mut j = start + 1;
    while j < chars.len() {
        let ch = chars[j];
        if ch == '\\' {
            let escaped = *chars.get(j + 1).ok_or_else(unterminated_string)?;
            if quote == '\'' && escaped == '\'' {
                out.push('\'');
            } else {
                out.push('\\');
                out.push(escaped);
            }
            j += 2;
            continue;
        }
        if ch == quote {
            out.push('"');
            return Ok(j + 1);
        }
        if quote == '\'' && ch == '"' {
            out.push_str("\\\"");
        } else {
            out.push(ch);
        }
        j += 1;
    }
    Err(unterminated_string())
}

fn unterminated_string() -> StatsError {
    StatsError::Parse("unterminated string literal".to_string())
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn ident_end(chars: &[char], start: usize) -> usize {
    let mut end = start;
    while end < chars.len() && (chars[end].is_ascii_alphanumeric() || matches!(chars[end], '_' | '$'))
    {
        end += 1;
    }
    end
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars[from.min(chars.len())..]
        .iter()
        .copied()
        .find(|c| !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_value(text: &str) -> serde_json::Value {
        let json = object_literal_to_json(text).expect("conversion should succeed");
        serde_json::from_str(&json).expect("output should be valid JSON")
    }

    #[test]
    fn quotes_bare_keys() {
        let v = to_value(r#"{ type: "GROUP", pathFormatted: "group_x" }"#);
        assert_eq!(v["type"], "GROUP");
        assert_eq!(v["pathFormatted"], "group_x");
    }

    #[test]
    fn strips_assignment_and_trailing_script() {
        let text = r##"var stats = {
    name: "All Requests",
    stats: { "count": 3 }
}

function fillStats(stat){
    $("#numberOfRequests").append(stat.numberOfRequests.total);
}"##;
        let v = to_value(text);
        assert_eq!(v["name"], "All Requests");
        assert_eq!(v["stats"]["count"], 3);
    }

    #[test]
    fn braces_and_colons_inside_strings_are_left_alone() {
        let v = to_value(r#"{ name: "GET /a{b}: c", path: "x, }" }"#);
        assert_eq!(v["name"], "GET /a{b}: c");
        assert_eq!(v["path"], "x, }");
    }

    #[test]
    fn keeps_escaped_quotes() {
        let v = to_value(r#"{ name: "say \"hi\"" }"#);
        assert_eq!(v["name"], "say \"hi\"");
    }

    #[test]
    fn single_quoted_strings_become_json_strings() {
        let v = to_value(r#"{ name: 'it\'s "quoted"' }"#);
        assert_eq!(v["name"], "it's \"quoted\"");
    }

    #[test]
    fn drops_trailing_commas() {
        let v = to_value("{ a: [1, 2, ], b: { c: 3, }, }");
        assert_eq!(v["a"][1], 2);
        assert_eq!(v["b"]["c"], 3);
    }

    #[test]
    fn literal_values_pass_through() {
        let v = to_value("{ a: true, b: null, c: 1e3 }");
        assert_eq!(v["a"], true);
        assert!(v["b"].is_null());
        assert_eq!(v["c"], 1000.0);
    }

    #[test]
    fn unicode_labels_survive() {
        let v = to_value(r#"{ htmlName: "t ≥ 800 ms <br> t < 1200 ms" }"#);
        assert_eq!(v["htmlName"], "t ≥ 800 ms <br> t < 1200 ms");
    }

    #[test]
    fn missing_literal_is_an_error() {
        let err = object_literal_to_json("var stats = null;").unwrap_err();
        assert!(err.to_string().contains("no object literal"));
    }

    #[test]
    fn unterminated_literal_is_an_error() {
        let err = object_literal_to_json("var stats = { a: { b: 1 }").unwrap_err();
        assert!(err.to_string().contains("unterminated object literal"));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = object_literal_to_json(r#"{ a: "open }"#).unwrap_err();
        assert!(err.to_string().contains("unterminated string"));
    }
}
