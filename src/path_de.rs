use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{RenderError, RenderResult};
use crate::node::Node;

fn with_path<T, E>(result: Result<T, serde_path_to_error::Error<E>>) -> RenderResult<T>
where
    E: std::fmt::Display,
{
    result.map_err(|err| RenderError::Tree {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> RenderResult<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    with_path(serde_path_to_error::deserialize::<_, T>(de))
}

pub fn from_value_with_path<T: DeserializeOwned>(value: Value) -> RenderResult<T> {
    with_path(serde_path_to_error::deserialize::<_, T>(value))
}

/// Decode one node tree from JSON text.
pub fn node_from_str(src: &str) -> RenderResult<Node> {
    from_str_with_path(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_names_the_offending_path() {
        let err = from_value_with_path::<Node>(json!({
            "kind": "Image",
            "url": ["not", "a", "string"],
            "alt": "x"
        }))
        .unwrap_err();
        let RenderError::Tree { path, message } = err else { panic!("expected a tree error") };
        assert_eq!(path, "url");
        assert!(message.contains("string"), "{message}");
    }

    #[test]
    fn nested_errors_keep_their_full_path() {
        let err = node_from_str(
            r#"{ "kind": "Message", "children": [
                { "kind": "Section", "children": "hi", "accessory": { "kind": "Image", "url": ["x"], "alt": "a" } }
            ] }"#,
        )
        .unwrap_err();
        let RenderError::Tree { path, message } = err else { panic!("expected a tree error") };
        assert_eq!(path, "children[0].accessory.url");
        assert!(message.contains("expected a string"), "{message}");
    }

    #[test]
    fn unknown_prop_is_reported_where_it_was_written() {
        let err = node_from_str(
            r#"{ "kind": "Home", "children": [{ "kind": "Divider", "blockID": "d" }] }"#,
        )
        .unwrap_err();
        let RenderError::Tree { path, message } = err else { panic!("expected a tree error") };
        assert!(path.starts_with("children[0]"), "{path}");
        assert!(message.contains("unknown field `blockID`"), "{message}");
    }

    #[test]
    fn decodes_text() {
        let node = node_from_str(r#"{ "kind": "Divider", "blockId": "d1" }"#).unwrap();
        assert_eq!(node.kind(), "Divider");
    }
}
