//! The book resource.

use almanac_store::Entity;
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// A book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identifier; `None` until first saved.
    pub id: Option<i64>,
    /// Title of the book.
    pub title: String,
    /// Author of the book.
    pub author: String,
    /// Genre of the book.
    pub genre: String,
}

/// The caller-writable fields of a [`Book`].
///
/// Extra fields in the input (including a stray `id`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPayload {
    /// Title of the book.
    pub title: String,
    /// Author of the book.
    pub author: String,
    /// Genre of the book.
    pub genre: String,
}

impl Entity for Book {
    const KIND: &'static str = "Book";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl Resource for Book {
    const BASE_PATH: &'static str = "/api/book";
    const OPERATION_STEM: &'static str = "Book";

    type Payload = BookPayload;

    fn from_payload(payload: BookPayload) -> Self {
        Self {
            id: None,
            title: payload.title,
            author: payload.author,
            genre: payload.genre,
        }
    }

    fn apply(&mut self, payload: BookPayload) {
        self.title = payload.title;
        self.author = payload.author;
        self.genre = payload.genre;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_shape() {
        let book = Book {
            id: Some(7),
            title: "IT".to_string(),
            author: "Stephen King".to_string(),
            genre: "Horror".to_string(),
        };
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["title"], "IT");
        assert_eq!(json["author"], "Stephen King");
        assert_eq!(json["genre"], "Horror");
    }

    #[test]
    fn test_payload_from_query_string() {
        let payload: BookPayload =
            serde_urlencoded::from_str("title=IT&author=Stephen+King&genre=Horror").unwrap();
        assert_eq!(payload.author, "Stephen King");
    }

    #[test]
    fn test_payload_tolerates_stray_id() {
        let payload: BookPayload =
            serde_json::from_str(r#"{"id":99,"title":"t","author":"a","genre":"g"}"#).unwrap();
        assert_eq!(payload.title, "t");
    }

    #[test]
    fn test_payload_missing_field_is_rejected() {
        let result: Result<BookPayload, _> =
            serde_json::from_str(r#"{"title":"t","author":"a"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_keeps_id() {
        let mut book = Book::from_payload(BookPayload {
            title: "old".to_string(),
            author: "old".to_string(),
            genre: "old".to_string(),
        });
        book.set_id(3);

        book.apply(BookPayload {
            title: "new".to_string(),
            author: "new".to_string(),
            genre: "new".to_string(),
        });

        assert_eq!(book.id, Some(3));
        assert_eq!(book.title, "new");
    }
}
