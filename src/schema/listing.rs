//! Parser for schema editor listings
//!
//! A listing is the plain-text export of a field table:
//!
//! ```text
//! User Schema Editor
//! role
//! (
//! text
//! , required
//! )
//! The role of the user in the app
//! Options: admin, user
//! account_balance
//! (
//! number
//! )
//! Default: 0
//! ```
//!
//! A field starts with its name on one line followed by a parenthesized
//! `(type[, required])` block, which may be split across lines. Anything after
//! the block up to the next field is a description line, a `Default:` line
//! (a JSON literal, falling back to bare text), or an `Options:` line.

use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDef, FieldType, Schema};

const HEADER_SUFFIX: &str = "Schema Editor";

/// Parses a listing into a schema with the given version.
///
/// The schema id is the entity name from the header, lowercased.
pub fn parse_listing(text: &str, schema_version: &str) -> SchemaResult<Schema> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .collect();

    let (header_no, header) = *lines
        .first()
        .ok_or_else(|| SchemaError::listing(1, "listing is empty"))?;
    let entity = header
        .strip_suffix(HEADER_SUFFIX)
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            SchemaError::listing(header_no, format!("expected '<Entity> {}' header", HEADER_SUFFIX))
        })?;
    let schema_id = entity.to_lowercase().replace(' ', "_");

    let mut fields = Vec::new();
    let mut i = 1;

    while i < lines.len() {
        let (name_no, name) = lines[i];
        if !opens_block(lines.get(i + 1)) {
            return Err(SchemaError::listing(
                name_no,
                format!("expected a field name followed by '(', found '{}'", name),
            ));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(SchemaError::listing(name_no, format!("invalid field name '{}'", name)));
        }
        i += 1;

        let (block_no, _) = lines[i];
        let mut block = String::new();
        loop {
            let (_, line) = *lines
                .get(i)
                .ok_or_else(|| SchemaError::listing(block_no, "unterminated '(' block"))?;
            block.push_str(line);
            i += 1;
            if line.ends_with(')') {
                break;
            }
        }
        let (field_type, required) = parse_block(block_no, &block)?;

        let mut field = FieldDef {
            name: name.to_string(),
            field_type,
            required,
            default: None,
            options: None,
            description: None,
        };
        let mut description = Vec::new();

        while i < lines.len() && !opens_block(lines.get(i + 1)) {
            let (_, line) = lines[i];
            if let Some(raw) = line.strip_prefix("Default:") {
                field.default = Some(parse_default(raw.trim()));
            } else if let Some(raw) = line.strip_prefix("Options:") {
                field.options = Some(
                    raw.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect(),
                );
            } else {
                description.push(line);
            }
            i += 1;
        }
        if !description.is_empty() {
            field.description = Some(description.join(" "));
        }

        fields.push(field);
    }

    let schema = Schema::new(schema_id, schema_version, fields);
    schema.validate_structure()?;
    Ok(schema)
}

fn opens_block(line: Option<&(usize, &str)>) -> bool {
    matches!(line, Some((_, l)) if l.starts_with('('))
}

fn parse_block(line_no: usize, block: &str) -> SchemaResult<(FieldType, bool)> {
    let inner = block
        .strip_prefix('(')
        .and_then(|b| b.strip_suffix(')'))
        .ok_or_else(|| SchemaError::listing(line_no, format!("malformed type block '{}'", block)))?;

    let mut parts = inner.split(',').map(str::trim).filter(|p| !p.is_empty());
    let type_name = parts
        .next()
        .ok_or_else(|| SchemaError::listing(line_no, "missing field type"))?;
    let field_type = FieldType::from_name(type_name)
        .ok_or_else(|| SchemaError::listing(line_no, format!("unknown field type '{}'", type_name)))?;

    let mut required = false;
    for flag in parts {
        match flag {
            "required" => required = true,
            other => {
                return Err(SchemaError::listing(line_no, format!("unknown field flag '{}'", other)))
            }
        }
    }

    Ok((field_type, required))
}

fn parse_default(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_multiline_blocks() {
        let text = "Order Schema Editor\nsku\n(\ntext\n, required\n)\nStock keeping unit\nqty\n(\nnumber\n)\nDefault: 1\n";
        let schema = parse_listing(text, "3").unwrap();

        assert_eq!(schema.key(), ("order", "3"));
        assert_eq!(schema.fields.len(), 2);

        let sku = schema.field("sku").unwrap();
        assert_eq!(sku.field_type, FieldType::Text);
        assert!(sku.required);
        assert_eq!(sku.description.as_deref(), Some("Stock keeping unit"));

        let qty = schema.field("qty").unwrap();
        assert_eq!(qty.field_type, FieldType::Number);
        assert!(!qty.required);
        assert_eq!(qty.default, Some(json!(1)));
    }

    #[test]
    fn test_inline_blocks_and_options() {
        let text = "Ticket Schema Editor\n\
                    status (text)\n";
        // name and block must be on separate lines
        assert!(parse_listing(text, "1").is_err());

        let text = "Ticket Schema Editor\nstatus\n(text)\nDefault: \"open\"\nOptions: open, closed\nopened\n(date)\n";
        let schema = parse_listing(text, "1").unwrap();
        let status = schema.field("status").unwrap();
        assert_eq!(status.default, Some(json!("open")));
        assert_eq!(
            status.options,
            Some(vec!["open".to_string(), "closed".to_string()])
        );
        assert_eq!(schema.field("opened").unwrap().field_type, FieldType::Date);
    }

    #[test]
    fn test_bare_default_is_text() {
        let text = "Ticket Schema Editor\nstatus\n(text)\nDefault: open\n";
        let schema = parse_listing(text, "1").unwrap();
        assert_eq!(schema.field("status").unwrap().default, Some(json!("open")));
    }

    #[test]
    fn test_multiple_description_lines_joined() {
        let text = "Ticket Schema Editor\nnote\n(text)\nFree text.\nShown to staff only.\n";
        let schema = parse_listing(text, "1").unwrap();
        assert_eq!(
            schema.field("note").unwrap().description.as_deref(),
            Some("Free text. Shown to staff only.")
        );
    }

    #[test]
    fn test_bad_header() {
        let err = parse_listing("Users\nname\n(text)\n", "1").unwrap_err();
        assert!(matches!(err, SchemaError::Listing { line: 1, .. }));
    }

    #[test]
    fn test_unknown_type_reports_line() {
        let err = parse_listing("X Schema Editor\nflag\n(\nboolean\n)\n", "1").unwrap_err();
        assert!(matches!(err, SchemaError::Listing { line: 3, .. }));
        assert!(err.to_string().contains("boolean"));
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse_listing("X Schema Editor\nname\n(\ntext\n", "1").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_unknown_flag() {
        let err = parse_listing("X Schema Editor\nname\n(text, unique)\n", "1").unwrap_err();
        assert!(err.to_string().contains("unique"));
    }

    #[test]
    fn test_structure_checked() {
        let text = "X Schema Editor\nname\n(text)\nname\n(text)\n";
        let err = parse_listing(text, "1").unwrap_err();
        assert_eq!(err.code(), "REC_SCHEMA_DUPLICATE_FIELD");
    }

    #[test]
    fn test_empty_listing() {
        assert!(parse_listing("  \n\n", "1").is_err());
    }
}
