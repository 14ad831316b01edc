//! Header and trailer metadata.
//!
//! Both transports are normalized into one [`MetadataMap`]: a header name
//! mapped to its ordered values. RPC metadata arrives as a plain multi-value
//! map; HTTP headers arrive as an [`http::HeaderMap`]. Names are kept as
//! supplied and values are neither case-folded nor de-duplicated.

use std::collections::HashMap;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use invoke_messaging_core::{ListStringValue, MetadataMap};

use crate::ResponseError;

/// Build metadata from an RPC-style multi-value map.
///
/// Value lists are kept verbatim, duplicates included.
pub fn metadata_from_map<I, K, V>(map: I) -> MetadataMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    map.into_iter()
        .map(|(k, v)| (k.into(), ListStringValue::new(v)))
        .collect()
}

/// Build metadata from HTTP headers.
///
/// Every value of a repeated header is kept, in the order the header map
/// yields them. Values that are not valid UTF-8 are converted lossily.
pub fn metadata_from_header_map(headers: &HeaderMap) -> MetadataMap {
    let mut md = MetadataMap::with_capacity(headers.keys_len());
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        md.insert(name.as_str().to_string(), ListStringValue::new(values));
    }
    md
}

/// Flatten metadata back into a plain multi-value map.
pub fn metadata_to_map(md: &MetadataMap) -> HashMap<String, Vec<String>> {
    md.iter()
        .map(|(k, v)| (k.clone(), v.values.clone()))
        .collect()
}

/// Convert metadata into HTTP headers.
///
/// # Errors
///
/// Returns [`ResponseError::InvalidHeader`] if a name or value cannot be
/// represented as an HTTP header.
pub fn metadata_to_header_map(md: &MetadataMap) -> Result<HeaderMap, ResponseError> {
    let mut headers = HeaderMap::with_capacity(md.len());
    for (key, list) in md {
        let name = HeaderName::try_from(key.as_str())
            .map_err(|e| ResponseError::InvalidHeader(format!("{key:?}: {e}")))?;
        for value in &list.values {
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| ResponseError::InvalidHeader(format!("{key}={value:?}: {e}")))?;
            headers.append(name.clone(), value);
        }
    }
    Ok(headers)
}
