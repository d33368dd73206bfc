//! YAML front matter splitting.
//!
//! A block is recognised only when the very first line is exactly `---`;
//! it runs to the next line that is exactly `---`.

use serde_json::{Map, Value};
use serde_yaml::Value as YamlValue;
use tracing::debug;

use mdjson_shared::{MdJsonError, Result};

const DELIMITER: &str = "---";

/// A document split into its front matter and Markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct Split<'a> {
    /// Parsed front matter keys in source order. Empty when there is no block.
    pub front_matter: Map<String, Value>,
    /// Everything after the closing delimiter, or the whole input.
    pub body: &'a str,
}

/// Separate a leading `---` delimited YAML block from the Markdown body.
///
/// Without an opening delimiter, or without a closing one, the body is the
/// input unchanged and the front matter is empty.
pub fn split_front_matter(text: &str) -> Result<Split<'_>> {
    let Some((yaml, body)) = locate_block(text) else {
        return Ok(Split {
            front_matter: Map::new(),
            body: text,
        });
    };

    let front_matter = parse_block(yaml)?;
    debug!(
        keys = front_matter.len(),
        body_len = body.len(),
        "split front matter"
    );

    Ok(Split { front_matter, body })
}

/// Find the YAML text and body slices, if a complete block exists.
fn locate_block(text: &str) -> Option<(&str, &str)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if strip_eol(first) != DELIMITER {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if strip_eol(line) == DELIMITER {
            return Some((&text[yaml_start..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

fn strip_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Parse the YAML between the delimiters into an ordered JSON mapping.
fn parse_block(yaml: &str) -> Result<Map<String, Value>> {
    if yaml.trim().is_empty() {
        return Ok(Map::new());
    }

    let mut value: YamlValue =
        serde_yaml::from_str(yaml).map_err(|e| MdJsonError::front_matter(e.to_string()))?;
    value
        .apply_merge()
        .map_err(|e| MdJsonError::front_matter(e.to_string()))?;

    match value {
        YamlValue::Null => Ok(Map::new()),
        YamlValue::Mapping(mapping) => mapping_to_json(mapping),
        other => Err(MdJsonError::front_matter(format!(
            "expected a mapping, found {}",
            kind(&other)
        ))),
    }
}

fn mapping_to_json(mapping: serde_yaml::Mapping) -> Result<Map<String, Value>> {
    let mut map = Map::with_capacity(mapping.len());
    for (key, value) in mapping {
        map.insert(key_to_string(key)?, yaml_to_json(value)?);
    }
    Ok(map)
}

fn yaml_to_json(value: YamlValue) -> Result<Value> {
    let json = match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => number_to_json(&n)?,
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(seq) => Value::Array(
            seq.into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        YamlValue::Mapping(mapping) => Value::Object(mapping_to_json(mapping)?),
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value)?,
    };
    Ok(json)
}

fn number_to_json(n: &serde_yaml::Number) -> Result<Value> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::from(u));
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| MdJsonError::front_matter(format!("{n} cannot be represented in JSON")))
}

/// JSON keys are strings; scalar YAML keys are stringified.
fn key_to_string(key: YamlValue) -> Result<String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => key_to_string(tagged.value),
        other => Err(MdJsonError::front_matter(format!(
            "{} cannot be used as a key",
            kind(&other)
        ))),
    }
}

fn kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "a boolean",
        YamlValue::Number(_) => "a number",
        YamlValue::String(_) => "a string",
        YamlValue::Sequence(_) => "a sequence",
        YamlValue::Mapping(_) => "a mapping",
        YamlValue::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_block_from_body() {
        let split = split_front_matter("---\ntitle: lipsum ipsum\n---\n*\"dipsum\"*").unwrap();
        assert_eq!(split.front_matter["title"], "lipsum ipsum");
        assert_eq!(split.body, "*\"dipsum\"*");
    }

    #[test]
    fn no_block_leaves_content_untouched() {
        let text = "# Titulus\n*\"tipsum\"*";
        let split = split_front_matter(text).unwrap();
        assert!(split.front_matter.is_empty());
        assert_eq!(split.body, text);
    }

    #[test]
    fn indented_delimiter_is_not_front_matter() {
        let text = " ---\ntitle: x\n---\nbody";
        let split = split_front_matter(text).unwrap();
        assert!(split.front_matter.is_empty());
        assert_eq!(split.body, text);
    }

    #[test]
    fn unclosed_block_is_body() {
        let text = "---\ntitle: never closed\n\nSome text.";
        let split = split_front_matter(text).unwrap();
        assert!(split.front_matter.is_empty());
        assert_eq!(split.body, text);
    }

    #[test]
    fn crlf_delimiters_are_accepted() {
        let split = split_front_matter("---\r\ntitle: Windows\r\n---\r\nBody\r\n").unwrap();
        assert_eq!(split.front_matter["title"], "Windows");
        assert_eq!(split.body, "Body\r\n");
    }

    #[test]
    fn empty_block_is_empty_mapping() {
        let split = split_front_matter("---\n---\nBody").unwrap();
        assert!(split.front_matter.is_empty());
        assert_eq!(split.body, "Body");
    }

    #[test]
    fn keys_keep_source_order() {
        let split =
            split_front_matter("---\nzulu: 1\nalpha: 2\nmike: [a, b]\n---\n").unwrap();
        let keys: Vec<&str> = split.front_matter.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zulu", "alpha", "mike"]);
        assert_eq!(split.front_matter["mike"], serde_json::json!(["a", "b"]));
        assert_eq!(split.body, "");
    }

    #[test]
    fn nested_values_and_scalar_keys_convert() {
        let yaml = concat!(
            "---\nauthor:\n  name: Ada\n  born: 1815\n",
            "2016: archive\ndraft: false\nweight: 0.5\n---\n",
        );
        let split = split_front_matter(yaml).unwrap();
        assert_eq!(split.front_matter["author"]["name"], "Ada");
        assert_eq!(split.front_matter["author"]["born"], 1815);
        assert_eq!(split.front_matter["2016"], "archive");
        assert_eq!(split.front_matter["draft"], false);
        assert_eq!(split.front_matter["weight"], 0.5);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = split_front_matter("---\ntitle: [unclosed\n---\nbody").unwrap_err();
        assert!(matches!(err, MdJsonError::FrontMatter { .. }));
    }

    #[test]
    fn non_mapping_block_is_an_error() {
        let err = split_front_matter("---\n- just\n- a list\n---\nbody").unwrap_err();
        assert!(err.to_string().contains("expected a mapping"));
    }

    #[test]
    fn non_finite_number_is_an_error() {
        let err = split_front_matter("---\nratio: .nan\n---\n").unwrap_err();
        assert!(matches!(err, MdJsonError::FrontMatter { .. }));
    }
}
