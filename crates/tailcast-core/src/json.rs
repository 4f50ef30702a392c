use serde::de::DeserializeOwned;

use crate::error::TailcastError;

/// Deepest JSON nesting accepted from upstream documents. A Figma node costs
/// two levels (the node object and its `children` array), so this admits
/// trees around 500 nodes deep.
pub const MAX_DEPTH: usize = 1024;

/// Decode a document that may nest deeper than serde_json's default limit of
/// 128. Input above [`MAX_DEPTH`] is rejected with [`TailcastError::TooDeep`]
/// before any recursive work starts.
pub fn decode_deep<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, TailcastError> {
    let depth = nesting_depth(bytes);
    if depth > MAX_DEPTH {
        tracing::debug!(depth, "rejected deeply nested document");
        return Err(TailcastError::TooDeep(MAX_DEPTH));
    }

    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let value = deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

#[cfg(feature = "native")]
fn deserialize<'de, T: DeserializeOwned>(
    de: &mut serde_json::Deserializer<serde_json::de::SliceRead<'de>>,
) -> Result<T, serde_json::Error> {
    T::deserialize(serde_stacker::Deserializer::new(de))
}

#[cfg(not(feature = "native"))]
fn deserialize<'de, T: DeserializeOwned>(
    de: &mut serde_json::Deserializer<serde_json::de::SliceRead<'de>>,
) -> Result<T, serde_json::Error> {
    T::deserialize(de)
}

/// Maximum bracket depth, ignoring brackets inside strings. Malformed input
/// is left for the deserializer to report.
pub fn nesting_depth(bytes: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for &b in bytes {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                max = max.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}
