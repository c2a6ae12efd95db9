//! HTTP execution shared by the resource gateways and the account forms.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::action_framework::FormData;
use crate::endpoint::Endpoint;
use crate::error::ActionError;

/// Success payload of a call. `None` when the server answered with an empty body.
pub type ApiReply = Option<Value>;

#[derive(Debug, Clone)]
pub enum Body {
    Empty,
    Form(FormData),
    Json(Value),
}

/// Issues one request and classifies the answer.
///
/// Connection failures map to [`ActionError::Transport`], non-2xx answers to
/// [`ActionError::Application`] with the server's `detail` message when it sent one.
#[instrument(skip(http, base_url, endpoint, body), fields(endpoint = %endpoint))]
pub async fn execute(
    http: &Client,
    base_url: &Url,
    endpoint: &Endpoint,
    body: Body,
) -> Result<ApiReply, ActionError> {
    let url = endpoint_url(base_url, &endpoint.path)
        .map_err(|e| ActionError::Unexpected(format!("invalid endpoint url {}: {e}", endpoint.path)))?;

    let request = http.request(endpoint.method.clone(), url);
    let request = match body {
        Body::Empty => request,
        Body::Form(form) => request.form(&form),
        Body::Json(json) => request.json(&json),
    };

    debug!("Sending request");
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        debug!(status = status.as_u16(), "Request succeeded");
        Ok(parse_reply(&text))
    } else {
        let detail = extract_detail(&text);
        warn!(status = status.as_u16(), detail = ?detail, "Request rejected by server");
        Err(ActionError::Application {
            status: status.as_u16(),
            detail,
        })
    }
}

/// Resolves `path` below `base_url`, keeping any path prefix the base carries
/// (`http://host/loja` + `/login` is `http://host/loja/login`).
fn endpoint_url(base_url: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path.trim_start_matches('/'))
}

fn parse_reply(text: &str) -> ApiReply {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(text.to_string())),
    }
}

/// Pulls a non-empty string `detail` field out of an error body.
pub fn extract_detail(text: &str) -> Option<String> {
    serde_json::from_str::<Value>(text)
        .ok()?
        .get("detail")?
        .as_str()
        .map(str::trim)
        .filter(|detail| !detail.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_is_read_from_json_error_bodies() {
        assert_eq!(extract_detail(r#"{"detail": "Produto não encontrado"}"#).as_deref(), Some("Produto não encontrado"));
        assert_eq!(extract_detail(r#"{"message": "nope"}"#), None);
        assert_eq!(extract_detail(r#"{"detail": [{"loc": ["body"]}]}"#), None);
        assert_eq!(extract_detail("Internal Server Error"), None);
        assert_eq!(extract_detail(r#"{"detail": "  "}"#), None);
    }

    #[test]
    fn endpoints_resolve_below_the_base_path() {
        let nested = Url::parse("http://loja.local/loja").unwrap();
        assert_eq!(
            endpoint_url(&nested, "/admin/api/products/1").unwrap().as_str(),
            "http://loja.local/loja/admin/api/products/1"
        );

        let nested_with_slash = Url::parse("http://loja.local/loja/").unwrap();
        assert_eq!(
            endpoint_url(&nested_with_slash, "/login").unwrap().as_str(),
            "http://loja.local/loja/login"
        );

        let origin = Url::parse("http://127.0.0.1:8000").unwrap();
        assert_eq!(
            endpoint_url(&origin, "/admin/api/users/3/status").unwrap().as_str(),
            "http://127.0.0.1:8000/admin/api/users/3/status"
        );
    }

    #[test]
    fn empty_success_bodies_carry_no_data() {
        assert_eq!(parse_reply(""), None);
        assert_eq!(parse_reply("  \n"), None);
        assert_eq!(parse_reply(r#"{"ok": true}"#), Some(json!({"ok": true})));
        assert_eq!(parse_reply("deleted"), Some(Value::String("deleted".into())));
    }
}
