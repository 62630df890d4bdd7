use serde_json::Value;

use crate::credential_formatter::error::FormatterError;

/// Turns a JSON document into the exact byte string that gets hashed for a proof.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait DocumentCanonicalizer: Send + Sync {
    fn canonicalize(&self, document: &Value) -> Result<String, FormatterError>;
}

/// JSON canonicalization: object members sorted by key, no insignificant whitespace.
#[derive(Default, Clone)]
pub struct JcsCanonicalizer;

impl DocumentCanonicalizer for JcsCanonicalizer {
    fn canonicalize(&self, document: &Value) -> Result<String, FormatterError> {
        let mut output = String::new();
        write_value(document, &mut output)?;
        Ok(output)
    }
}

fn write_value(value: &Value, output: &mut String) -> Result<(), FormatterError> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

            output.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    output.push(',');
                }
                write_string(key, output)?;
                output.push(':');
                write_value(value, output)?;
            }
            output.push('}');
        }
        Value::Array(items) => {
            output.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    output.push(',');
                }
                write_value(item, output)?;
            }
            output.push(']');
        }
        Value::String(string) => write_string(string, output)?,
        scalar => output.push_str(&scalar.to_string()),
    }
    Ok(())
}

fn write_string(string: &str, output: &mut String) -> Result<(), FormatterError> {
    let escaped =
        serde_json::to_string(string).map_err(|e| FormatterError::JsonMapping(e.to_string()))?;
    output.push_str(&escaped);
    Ok(())
}
