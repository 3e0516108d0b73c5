use std::borrow::Cow;

use bookstack_db::{Document, Fields};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::openapi::schema::{AdditionalProperties, ObjectBuilder, Schema, Type};
use utoipa::openapi::RefOr;
use utoipa::{PartialSchema, ToSchema};

/// Category a book is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookType {
    Adventure,
    Autobiography,
    Comic,
}

impl BookType {
    pub const ALL: [BookType; 3] = [BookType::Adventure, BookType::Autobiography, BookType::Comic];

    pub fn as_str(self) -> &'static str {
        match self {
            BookType::Adventure => "adventure",
            BookType::Autobiography => "autobiography",
            BookType::Comic => "comic",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// A validated book ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "name": "The Alchemist",
    "author": "Paulo Coelho",
    "price": 19.99,
    "booktype": "adventure"
}))]
pub struct NewBook {
    /// Title of the book
    pub name: String,
    /// Author of the book
    pub author: String,
    /// Price of the book
    pub price: f64,
    pub booktype: BookType,
}

impl NewBook {
    /// Document fields stored for this book.
    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), Value::String(self.name));
        fields.insert("author".to_string(), Value::String(self.author));
        fields.insert("price".to_string(), price_value(self.price));
        fields.insert(
            "booktype".to_string(),
            Value::String(self.booktype.as_str().to_string()),
        );
        fields
    }
}

/// Whole prices are stored as integers so `20` reads back as `20`, not `20.0`.
fn price_value(price: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if price.fract() == 0.0 && price.abs() < MAX_EXACT {
        Value::from(price as i64)
    } else {
        json!(price)
    }
}

/// A stored book: its generated `id` plus every field it currently holds.
///
/// Updates are not validated, so the fields may drift from the creation
/// schema; the record is therefore carried as the raw document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Book(pub Document);

impl Book {
    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.fields.get(field)
    }
}

impl From<Document> for Book {
    fn from(doc: Document) -> Self {
        Self(doc)
    }
}

fn described(schema_type: Type, description: &str) -> ObjectBuilder {
    ObjectBuilder::new()
        .schema_type(schema_type)
        .description(Some(description))
}

impl utoipa::__dev::ComposeSchema for Book {
    fn compose(_new_generics: Vec<RefOr<Schema>>) -> RefOr<Schema> {
        ObjectBuilder::new()
            .property("id", described(Type::String, "Generated identifier"))
            .property("name", described(Type::String, "Title of the book"))
            .property("author", described(Type::String, "Author of the book"))
            .property("price", described(Type::Number, "Price of the book"))
            .property("booktype", BookType::schema())
            .required("id")
            .additional_properties(Some(AdditionalProperties::<Schema>::FreeForm(true)))
            .into()
    }
}

impl ToSchema for Book {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Book")
    }
}

/// Partial update body. Any set of fields is accepted and stored as given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct BookPatch(pub Fields);

impl PartialSchema for BookPatch {
    fn schema() -> RefOr<Schema> {
        ObjectBuilder::new()
            .description(Some("Fields to overwrite on the stored book"))
            .property("name", described(Type::String, "Title of the book"))
            .property("author", described(Type::String, "Author of the book"))
            .property("price", described(Type::Number, "Price of the book"))
            .property("booktype", BookType::schema())
            .additional_properties(Some(AdditionalProperties::<Schema>::FreeForm(true)))
            .into()
    }
}

impl ToSchema for BookPatch {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("BookPatch")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booktype_names_round_trip() {
        for kind in BookType::ALL {
            assert_eq!(BookType::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(BookType::from_name("thriller"), None);
        assert_eq!(BookType::from_name("Comic"), None);
    }

    #[test]
    fn new_book_fields_match_wire_names() {
        let book = NewBook {
            name: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            price: 15.5,
            booktype: BookType::Adventure,
        };

        assert_eq!(
            Value::Object(book.into_fields()),
            json!({
                "name": "Dune",
                "author": "Frank Herbert",
                "price": 15.5,
                "booktype": "adventure"
            })
        );
    }

    #[test]
    fn whole_prices_are_stored_as_integers() {
        let book = NewBook {
            name: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            price: 20.0,
            booktype: BookType::Adventure,
        };

        let fields = book.into_fields();
        assert_eq!(fields["price"], json!(20));
        assert_eq!(serde_json::to_string(&fields["price"]).unwrap(), "20");
        assert_eq!(price_value(-3.0), json!(-3));
        assert_eq!(price_value(0.1), json!(0.1));
    }

    #[test]
    fn book_serializes_as_flat_document() {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), json!("Dune"));
        let book = Book::from(Document {
            id: "42".to_string(),
            fields,
        });

        assert_eq!(book.id(), "42");
        assert_eq!(book.get("name"), Some(&json!("Dune")));
        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            json!({"id": "42", "name": "Dune"})
        );
    }

    #[test]
    fn patch_accepts_arbitrary_fields() {
        let patch: BookPatch = serde_json::from_value(json!({"price": 9.99, "shelf": "B2"})).unwrap();
        assert_eq!(patch.0.len(), 2);
        assert!(serde_json::from_value::<BookPatch>(json!([1, 2])).is_err());
    }
}
