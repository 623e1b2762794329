use headers::authorization::{Bearer, Credentials};
use http::{HeaderMap, header::AUTHORIZATION};
use serde_json::{Map, Value};

/// A single place a bearer token may be carried in a request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenExtractor {
    /// `Authorization: Bearer <token>`, first whitespace-separated word after the scheme
    BearerHeader,
    /// A string field of the JSON request body
    BodyField(&'static str),
}

/// Extraction order used by [`extract_token`]. The header always wins.
const EXTRACTORS: [TokenExtractor; 2] = [
    TokenExtractor::BearerHeader,
    TokenExtractor::BodyField("idToken"),
];

impl TokenExtractor {
    /// Try this extractor alone. Empty tokens count as absent.
    pub fn extract(
        &self,
        headers: &HeaderMap,
        body: Option<&Map<String, Value>>,
    ) -> Option<String> {
        let token = match self {
            Self::BearerHeader => headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_auth_header)
                .filter(|(scheme, _)| scheme.eq_ignore_ascii_case(Bearer::SCHEME))
                .map(|(_, token)| token.to_string()),
            Self::BodyField(field) => body
                .and_then(|body| body.get(*field))
                .and_then(Value::as_str)
                .map(|token| token.trim().to_string()),
        };
        token.filter(|token| !token.is_empty())
    }
}

/// Split `<scheme> <value>` on any run of whitespace, ignoring leading whitespace
/// and anything after the value.
fn parse_auth_header(header: &str) -> Option<(&str, &str)> {
    let mut words = header.split_whitespace();
    Some((words.next()?, words.next()?))
}

/// Return the first non-empty token found by the fixed extractor chain.
pub fn extract_token(headers: &HeaderMap, body: Option<&Map<String, Value>>) -> Option<String> {
    EXTRACTORS
        .iter()
        .find_map(|extractor| extractor.extract(headers, body))
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;
    use serde_json::json;

    use super::*;

    fn headers_with(authorization: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(authorization));
        headers
    }

    fn body_with_id_token(token: &str) -> Map<String, Value> {
        json!({ "idToken": token }).as_object().cloned().unwrap()
    }

    #[test]
    fn header_wins_over_body() {
        let headers = headers_with("Bearer T1");
        let body = body_with_id_token("T2");
        assert_eq!(extract_token(&headers, Some(&body)).as_deref(), Some("T1"));
    }

    #[test]
    fn falls_back_to_body_field() {
        let body = body_with_id_token("T2");
        assert_eq!(
            extract_token(&HeaderMap::new(), Some(&body)).as_deref(),
            Some("T2")
        );
    }

    #[test]
    fn nothing_to_extract() {
        assert_eq!(extract_token(&HeaderMap::new(), None), None);
        let body = json!({ "idToken": "" }).as_object().cloned().unwrap();
        assert_eq!(extract_token(&HeaderMap::new(), Some(&body)), None);
        let body = json!({ "idToken": 42 }).as_object().cloned().unwrap();
        assert_eq!(extract_token(&HeaderMap::new(), Some(&body)), None);
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let headers = headers_with("bearer abc");
        assert_eq!(
            TokenExtractor::BearerHeader.extract(&headers, None).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn other_schemes_are_ignored() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        let body = body_with_id_token("T2");
        assert_eq!(TokenExtractor::BearerHeader.extract(&headers, None), None);
        assert_eq!(extract_token(&headers, Some(&body)).as_deref(), Some("T2"));
    }

    #[test]
    fn only_first_word_after_scheme_is_the_token() {
        let headers = headers_with("Bearer a b");
        assert_eq!(extract_token(&headers, None).as_deref(), Some("a"));
    }

    #[test]
    fn any_whitespace_separates_scheme_and_token() {
        for value in ["Bearer\tabc", "  Bearer abc", "Bearer    abc  "] {
            let headers = headers_with(value);
            assert_eq!(
                extract_token(&headers, None).as_deref(),
                Some("abc"),
                "header {value:?}"
            );
        }
    }

    #[test]
    fn scheme_without_token_falls_back_to_body() {
        let body = body_with_id_token("T2");
        for value in ["Bearer", "Bearer   "] {
            let headers = headers_with(value);
            assert_eq!(extract_token(&headers, Some(&body)).as_deref(), Some("T2"));
        }
    }
}
