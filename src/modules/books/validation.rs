//! Schema check for books submitted through `POST /addBook`.

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::models::{BookType, NewBook};

const KNOWN_FIELDS: [&str; 4] = ["name", "author", "price", "booktype"];

/// One field-level rule a candidate book broke.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Violation {
    /// Human readable description
    pub message: String,
    /// Offending field, empty when the whole body is at fault
    pub path: Vec<String>,
    /// Machine readable rule name, e.g. `any.required`
    #[serde(rename = "type")]
    pub kind: String,
}

impl Violation {
    fn new(field: Option<&str>, kind: &str, message: String) -> Self {
        Self {
            message,
            path: field.map(|f| vec![f.to_string()]).unwrap_or_default(),
            kind: kind.to_string(),
        }
    }

    fn required(field: &str) -> Self {
        Self::new(Some(field), "any.required", format!("\"{}\" is required", field))
    }
}

/// Check a raw request body against the book schema.
///
/// Every violation is reported, not only the first. Nothing is persisted here.
pub fn validate_new_book(candidate: &Value) -> Result<NewBook, Vec<Violation>> {
    let Some(object) = candidate.as_object() else {
        return Err(vec![Violation::new(
            None,
            "object.base",
            "\"value\" must be of type object".to_string(),
        )]);
    };

    let mut violations = Vec::new();
    let name = required_string(object, "name", &mut violations);
    let author = required_string(object, "author", &mut violations);
    let price = required_number(object, "price", &mut violations);
    let booktype = required_booktype(object, "booktype", &mut violations);

    for key in object.keys() {
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            violations.push(Violation::new(
                Some(key.as_str()),
                "object.unknown",
                format!("\"{}\" is not allowed", key),
            ));
        }
    }

    match (name, author, price, booktype) {
        (Some(name), Some(author), Some(price), Some(booktype)) if violations.is_empty() => {
            Ok(NewBook {
                name,
                author,
                price,
                booktype,
            })
        }
        _ => Err(violations),
    }
}

fn required_string(
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match object.get(field) {
        None => violations.push(Violation::required(field)),
        Some(Value::String(s)) if s.is_empty() => violations.push(Violation::new(
            Some(field),
            "string.empty",
            format!("\"{}\" is not allowed to be empty", field),
        )),
        Some(Value::String(s)) => return Some(s.clone()),
        Some(_) => violations.push(Violation::new(
            Some(field),
            "string.base",
            format!("\"{}\" must be a string", field),
        )),
    }
    None
}

/// Numbers and numeric strings are accepted; the latter are converted.
fn required_number(
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<f64> {
    let parsed = match object.get(field) {
        None => {
            violations.push(Violation::required(field));
            return None;
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(n) if n.is_finite() => Some(n),
        _ => {
            violations.push(Violation::new(
                Some(field),
                "number.base",
                format!("\"{}\" must be a number", field),
            ));
            None
        }
    }
}

fn required_booktype(
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<BookType> {
    let Some(value) = object.get(field) else {
        violations.push(Violation::required(field));
        return None;
    };

    let parsed = value.as_str().and_then(BookType::from_name);
    if parsed.is_none() {
        let allowed: Vec<_> = BookType::ALL.iter().map(|kind| kind.as_str()).collect();
        violations.push(Violation::new(
            Some(field),
            "any.only",
            format!("\"{}\" must be one of [{}]", field, allowed.join(", ")),
        ));
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dune() -> Value {
        json!({
            "name": "Dune",
            "author": "Frank Herbert",
            "price": 15.5,
            "booktype": "adventure"
        })
    }

    fn kinds(violations: &[Violation]) -> Vec<(&str, &str)> {
        violations
            .iter()
            .map(|v| (v.path.first().map(String::as_str).unwrap_or(""), v.kind.as_str()))
            .collect()
    }

    #[test]
    fn accepts_valid_book() {
        let book = validate_new_book(&dune()).unwrap();
        assert_eq!(book.name, "Dune");
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.price, 15.5);
        assert_eq!(book.booktype, BookType::Adventure);
    }

    #[test]
    fn accepts_every_booktype() {
        for kind in ["adventure", "autobiography", "comic"] {
            let mut candidate = dune();
            candidate["booktype"] = json!(kind);
            assert!(validate_new_book(&candidate).is_ok(), "{kind} rejected");
        }
    }

    #[test]
    fn reports_each_missing_field() {
        let violations = validate_new_book(&json!({})).unwrap_err();
        assert_eq!(
            kinds(&violations),
            vec![
                ("name", "any.required"),
                ("author", "any.required"),
                ("price", "any.required"),
                ("booktype", "any.required"),
            ]
        );
        assert_eq!(violations[0].message, "\"name\" is required");
    }

    #[test]
    fn rejects_wrong_types() {
        let violations = validate_new_book(&json!({
            "name": 12,
            "author": null,
            "price": "cheap",
            "booktype": 3
        }))
        .unwrap_err();

        assert_eq!(
            kinds(&violations),
            vec![
                ("name", "string.base"),
                ("author", "string.base"),
                ("price", "number.base"),
                ("booktype", "any.only"),
            ]
        );
    }

    #[test]
    fn rejects_empty_strings() {
        let mut candidate = dune();
        candidate["author"] = json!("");
        let violations = validate_new_book(&candidate).unwrap_err();

        assert_eq!(kinds(&violations), vec![("author", "string.empty")]);
        assert_eq!(violations[0].message, "\"author\" is not allowed to be empty");
    }

    #[test]
    fn rejects_booktype_outside_set() {
        let mut candidate = dune();
        candidate["booktype"] = json!("thriller");
        let violations = validate_new_book(&candidate).unwrap_err();

        assert_eq!(
            violations[0].message,
            "\"booktype\" must be one of [adventure, autobiography, comic]"
        );
    }

    #[test]
    fn converts_numeric_price_strings() {
        let mut candidate = dune();
        candidate["price"] = json!(" 12.25 ");
        assert_eq!(validate_new_book(&candidate).unwrap().price, 12.25);

        candidate["price"] = json!("NaN");
        assert!(validate_new_book(&candidate).is_err());
    }

    #[test]
    fn rejects_unknown_fields() {
        let mut candidate = dune();
        candidate["isbn"] = json!("978-0441013593");
        let violations = validate_new_book(&candidate).unwrap_err();

        assert_eq!(kinds(&violations), vec![("isbn", "object.unknown")]);
    }

    #[test]
    fn rejects_non_object_body() {
        let violations = validate_new_book(&json!(["Dune"])).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, "object.base");
        assert!(violations[0].path.is_empty());
    }

    #[test]
    fn violation_serializes_type_key() {
        let violation = Violation::required("name");
        assert_eq!(
            serde_json::to_value(violation).unwrap(),
            json!({"message": "\"name\" is required", "path": ["name"], "type": "any.required"})
        );
    }
}
