//! Parsing of `key=value` field arguments.

use anyhow::{Context, Result, bail};

use crate::domain::{MetaValue, Metadata};

/// Parses one `key=value` pair.
///
/// The value is read as YAML, so `draft=true` is a boolean, `rank=3` an
/// integer and `tags=[a, b]` a list. Anything unparseable stays text.
pub fn parse_field(raw: &str) -> Result<(String, MetaValue)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("invalid field '{}': expected key=value", raw);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("invalid field '{}': key is empty", raw);
    }

    let value = match serde_yaml::from_str::<serde_yaml::Value>(value) {
        Ok(serde_yaml::Value::Null) => MetaValue::Text(value.to_string()),
        Ok(parsed) => MetaValue::from_yaml(parsed),
        Err(_) => MetaValue::Text(value.to_string()),
    };
    Ok((key.to_string(), value))
}

/// Collects field arguments into a metadata bag. Later keys win.
pub fn parse_fields(raw: &[String]) -> Result<Metadata> {
    let mut metadata = Metadata::new();
    for field in raw {
        let (key, value) =
            parse_field(field).with_context(|| "failed to parse --field argument")?;
        metadata.insert(key, value);
    }
    Ok(metadata)
}
