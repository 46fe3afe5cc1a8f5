//! Query-string encoding for collection queries.

use serde::ser::Error as _;
use serde::Serialize;
use serde_json::Value;

use crate::rest::json_kind;

/// Encodes flat parameters as `key=value&...`.
///
/// `params` is serialized with serde and must produce either a JSON object
/// or a list of `[key, value]` pairs (e.g. `&[("active", "true")]`). Unit
/// and `None` encode to the empty string. Values are flattened:
///
/// - `null` entries are skipped
/// - strings, numbers and booleans are rendered as-is
/// - arrays of scalars are joined with commas
/// - nested objects are rendered as compact JSON
///
/// Object keys come out in sorted order; pair lists keep their order. Keys
/// and values are percent-encoded. An empty mapping encodes to `""`, in
/// which case the caller omits the `?` entirely.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if `params` cannot be serialized, or if it
/// serializes to anything other than an object, a pair list or null.
///
/// # Example
///
/// ```rust
/// use rest_model::clients::encode_query;
/// use serde_json::json;
///
/// assert_eq!(encode_query(&json!({"active": true})).unwrap(), "active=true");
/// assert_eq!(encode_query(&[("page", "2"), ("active", "true")]).unwrap(), "page=2&active=true");
/// assert_eq!(encode_query(&json!({})).unwrap(), "");
/// assert!(encode_query("active=true").is_err());
/// ```
pub fn encode_query<T: Serialize + ?Sized>(params: &T) -> Result<String, serde_json::Error> {
    let entries: Vec<(String, Value)> = match serde_json::to_value(params)? {
        Value::Null => return Ok(String::new()),
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .map(into_pair)
            .collect::<Result<_, _>>()?,
        other => {
            return Err(serde_json::Error::custom(format!(
                "query parameters must be a map or a list of pairs, got {}",
                json_kind(&other)
            )))
        }
    };

    let pairs: Vec<String> = entries
        .into_iter()
        .filter_map(|(key, val)| flatten_value(val).map(|v| (key, v)))
        .map(|(key, val)| {
            format!(
                "{}={}",
                urlencoding::encode(&key),
                urlencoding::encode(&val)
            )
        })
        .collect();

    Ok(pairs.join("&"))
}

/// Splits a serialized `(key, value)` tuple.
fn into_pair(item: Value) -> Result<(String, Value), serde_json::Error> {
    if let Value::Array(mut pair) = item {
        if pair.len() == 2 {
            if let (Some(value), Some(Value::String(key))) = (pair.pop(), pair.pop()) {
                return Ok((key, value));
            }
        }
    }
    Err(serde_json::Error::custom(
        "query parameter lists must contain (key, value) pairs with string keys",
    ))
}

/// Renders one parameter value, or `None` when it should be skipped.
fn flatten_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(arr) => {
            let values: Vec<String> = arr
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect();
            if values.is_empty() {
                None
            } else {
                Some(values.join(","))
            }
        }
        obj @ Value::Object(_) => Some(obj.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_query_handles_basic_types() {
        #[derive(Serialize)]
        struct Params {
            active: bool,
            limit: u32,
            title: String,
        }

        let params = Params {
            active: true,
            limit: 50,
            title: "Test".to_string(),
        };

        assert_eq!(
            encode_query(&params).unwrap(),
            "active=true&limit=50&title=Test"
        );
    }

    #[test]
    fn test_encode_query_skips_none() {
        #[derive(Serialize)]
        struct Params {
            limit: Option<u32>,
            page: Option<u32>,
        }

        let params = Params {
            limit: Some(10),
            page: None,
        };

        assert_eq!(encode_query(&params).unwrap(), "limit=10");
    }

    #[test]
    fn test_encode_query_joins_arrays() {
        assert_eq!(
            encode_query(&json!({"ids": [1, 2, 3]})).unwrap(),
            "ids=1%2C2%2C3"
        );
    }

    #[test]
    fn test_encode_query_percent_encodes() {
        assert_eq!(
            encode_query(&json!({"q": "a b&c"})).unwrap(),
            "q=a%20b%26c"
        );
    }

    #[test]
    fn test_encode_query_empty_inputs() {
        assert_eq!(encode_query(&json!({})).unwrap(), "");
        assert_eq!(encode_query(&()).unwrap(), "");
        assert_eq!(encode_query(&Option::<u32>::None).unwrap(), "");
        assert_eq!(encode_query(&Vec::<(String, String)>::new()).unwrap(), "");
    }

    #[test]
    fn test_encode_query_accepts_pair_lists_in_order() {
        assert_eq!(
            encode_query(&[("b", "2"), ("a", "x y")]).unwrap(),
            "b=2&a=x%20y"
        );
        assert_eq!(
            encode_query(&vec![("limit".to_string(), json!(5)), ("page".to_string(), json!(null))])
                .unwrap(),
            "limit=5"
        );
    }

    #[test]
    fn test_encode_query_rejects_other_shapes() {
        let error = encode_query("active=true").unwrap_err();
        assert!(error.to_string().contains("a string"));

        assert!(encode_query(&42).is_err());
        assert!(encode_query(&["active", "true"]).is_err());
        assert!(encode_query(&[(1, "one")]).is_err());
        assert!(encode_query(&[("a", "b", "c")]).is_err());
    }
}
