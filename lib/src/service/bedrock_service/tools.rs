
use aws_smithy_types::{Document, Number};
use serde_json::{Map, Value};


pub trait ToDocument {
    fn to_document(&self) -> Document;
}

pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToDocument for Value {
    fn to_document(&self) -> Document {
        match self {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(*b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Document::Number(Number::PosInt(u))
                } else if let Some(i) = n.as_i64() {
                    Document::Number(Number::NegInt(i))
                } else {
                    Document::Number(Number::Float(n.as_f64().unwrap_or(0.0)))
                }
            }
            Value::String(s) => Document::String(s.to_owned()),
            Value::Array(items) => Document::Array(items.iter().map(|v| v.to_document()).collect()),
            Value::Object(map) => Document::Object(
                map.iter()
                    .map(|(key, value)| (key.to_owned(), value.to_document()))
                    .collect(),
            ),
        }
    }
}

impl ToValue for Document {
    fn to_value(&self) -> Value {
        match self {
            Document::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.to_owned(), value.to_value()))
                    .collect::<Map<String, Value>>(),
            ),
            Document::Array(items) => Value::Array(items.iter().map(|d| d.to_value()).collect()),
            Document::Number(Number::PosInt(u)) => Value::from(*u),
            Document::Number(Number::NegInt(i)) => Value::from(*i),
            Document::Number(number) => serde_json::Number::from_f64(number.to_f64_lossy())
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Document::String(s) => Value::String(s.to_owned()),
            Document::Bool(b) => Value::Bool(*b),
            Document::Null => Value::Null,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_survives_document_conversion() {
        let schema = json!({
            "type": "object",
            "properties": {"confidence": {"type": "number", "minimum": 0, "maximum": 1.0}},
            "required": ["confidence"],
            "nullable": null,
            "strict": true,
            "offset": -2
        });
        assert_eq!(schema.to_document().to_value(), schema);
    }
}
