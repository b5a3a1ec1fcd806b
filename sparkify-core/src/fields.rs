//! Typed access to the fields of a decoded JSON record.
//!
//! Input files are produced by upstream tools that drift over time, so every
//! accessor reports either [`ParseError::MissingField`] or
//! [`ParseError::WrongType`] rather than a generic deserialization failure.

use crate::error::ParseError;
use serde_json::{Map, Value};

pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn new(value: &'a Value) -> Result<Self, ParseError> {
        value
            .as_object()
            .map(|map| Self { map })
            .ok_or(ParseError::NotAnObject)
    }

    fn get(&self, field: &'static str) -> Result<&'a Value, ParseError> {
        self.map
            .get(field)
            .ok_or(ParseError::MissingField { field })
    }

    /// Key must be present; `null` reads as `None`.
    fn get_nullable(&self, field: &'static str) -> Result<Option<&'a Value>, ParseError> {
        match self.get(field)? {
            Value::Null => Ok(None),
            v => Ok(Some(v)),
        }
    }

    pub fn string(&self, field: &'static str) -> Result<String, ParseError> {
        self.get(field)?
            .as_str()
            .map(str::to_string)
            .ok_or(ParseError::WrongType {
                field,
                expected: "string",
            })
    }

    pub fn opt_string(&self, field: &'static str) -> Result<Option<String>, ParseError> {
        self.get_nullable(field)?
            .map(|v| {
                v.as_str().map(str::to_string).ok_or(ParseError::WrongType {
                    field,
                    expected: "string",
                })
            })
            .transpose()
    }

    pub fn i64(&self, field: &'static str) -> Result<i64, ParseError> {
        self.get(field)?.as_i64().ok_or(ParseError::WrongType {
            field,
            expected: "integer",
        })
    }

    pub fn i32(&self, field: &'static str) -> Result<i32, ParseError> {
        i32::try_from(self.i64(field)?).map_err(|_| ParseError::WrongType {
            field,
            expected: "32-bit integer",
        })
    }

    pub fn f64(&self, field: &'static str) -> Result<f64, ParseError> {
        self.get(field)?.as_f64().ok_or(ParseError::WrongType {
            field,
            expected: "number",
        })
    }

    pub fn opt_f64(&self, field: &'static str) -> Result<Option<f64>, ParseError> {
        self.get_nullable(field)?
            .map(|v| {
                v.as_f64().ok_or(ParseError::WrongType {
                    field,
                    expected: "number",
                })
            })
            .transpose()
    }

    /// Identifier emitted either as a JSON string or as an integer.
    pub fn id(&self, field: &'static str) -> Result<String, ParseError> {
        match self.get(field)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
            _ => Err(ParseError::WrongType {
                field,
                expected: "string or integer id",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_wrong_type_are_distinct() {
        let value = json!({"title": 42});
        let fields = Fields::new(&value).unwrap();

        let missing = fields.string("song_id").unwrap_err();
        assert!(matches!(missing, ParseError::MissingField { field: "song_id" }));

        let wrong = fields.string("title").unwrap_err();
        assert!(matches!(
            wrong,
            ParseError::WrongType {
                field: "title",
                expected: "string"
            }
        ));
    }

    #[test]
    fn test_nullable_requires_key() {
        let value = json!({"artist_latitude": null, "artist_location": ""});
        let fields = Fields::new(&value).unwrap();

        assert_eq!(fields.opt_f64("artist_latitude").unwrap(), None);
        assert_eq!(fields.opt_string("artist_location").unwrap().as_deref(), Some(""));
        assert!(matches!(
            fields.opt_f64("artist_longitude"),
            Err(ParseError::MissingField {
                field: "artist_longitude"
            })
        ));
    }

    #[test]
    fn test_id_accepts_string_or_integer() {
        let value = json!({"a": "39", "b": 39, "c": 3.5});
        let fields = Fields::new(&value).unwrap();

        assert_eq!(fields.id("a").unwrap(), "39");
        assert_eq!(fields.id("b").unwrap(), "39");
        assert!(matches!(fields.id("c"), Err(ParseError::WrongType { .. })));
    }

    #[test]
    fn test_integer_duration_reads_as_f64() {
        let value = json!({"duration": 200, "year": 1e3});
        let fields = Fields::new(&value).unwrap();

        assert_eq!(fields.f64("duration").unwrap(), 200.0);
        assert!(matches!(fields.i32("year"), Err(ParseError::WrongType { .. })));
    }

    #[test]
    fn test_rejects_non_object() {
        let value = json!([1, 2, 3]);
        assert!(matches!(Fields::new(&value), Err(ParseError::NotAnObject)));
    }
}
