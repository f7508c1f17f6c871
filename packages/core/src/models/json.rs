//! JSON decoding for tree documents
//!
//! Every tree level adds two levels of JSON nesting (the node object and its
//! `children` array), so a chain of add-child calls quickly exceeds serde_json's
//! default recursion limit of 128. Everything that reads a tree goes through these
//! functions instead, which lift the limit and grow the stack on demand.

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Decode `bytes` with no nesting limit
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Decode `text` with no nesting limit
pub fn from_json_str<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    from_json_slice(text.as_bytes())
}
