//! Request building helpers.

use error_stack::ResultExt;
use masking::{Maskable, PeekInterface};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, HttpClientError};

/// Outbound header collection; values carry their masking information so
/// credentials are logged masked.
pub type Headers = Vec<(String, Maskable<String>)>;

/// HTTP verb of an outbound call.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    /// GET; the only verb eligible for connection-reset retry.
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
    /// PATCH.
    Patch,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
            Method::Patch => Self::PATCH,
        }
    }
}

pub(crate) fn construct_header_map(headers: &Headers) -> CustomResult<HeaderMap, HttpClientError> {
    headers
        .iter()
        .try_fold(HeaderMap::new(), |mut header_map, (name, value)| {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .change_context(HttpClientError::HeaderMapConstructionFailed)?;
            let header_value = match value {
                Maskable::Masked(value) => HeaderValue::from_str(value.peek()).map(|mut value| {
                    value.set_sensitive(true);
                    value
                }),
                Maskable::Normal(value) => HeaderValue::from_str(value),
            }
            .change_context(HttpClientError::HeaderMapConstructionFailed)?;
            header_map.append(header_name, header_value);
            Ok(header_map)
        })
}

#[cfg(test)]
mod tests {
    use masking::Mask;

    use super::*;

    #[test]
    fn masked_headers_become_sensitive() {
        let headers: Headers = vec![
            ("authorization".to_string(), "secret-token".into_masked()),
            ("accept".to_string(), "application/json".into()),
        ];
        let header_map = construct_header_map(&headers).unwrap();
        assert!(header_map.get("authorization").unwrap().is_sensitive());
        assert!(!header_map.get("accept").unwrap().is_sensitive());
    }

    #[test]
    fn invalid_header_names_are_rejected() {
        let headers: Headers = vec![("bad header\n".to_string(), "value".into())];
        assert!(construct_header_map(&headers).is_err());
    }

    #[test]
    fn methods_render_uppercase() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }
}
