//! Webhook dispatch.
//!
//! Renders a webhook's body and headers against the conversation's JSON
//! context, then sends the request. Rendering happens immediately before
//! dispatch so the template always sees the freshest entry list, including
//! tool results appended to the runtime cache mid-run.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use palaver_context::eval::evaluate_placeholders;
use palaver_context::history::ContextServices;
use palaver_core::ids::{ConversationId, RunId};

use crate::errors::HookError;
use crate::types::WebhookConfig;

/// Sends webhooks with context-rendered templates.
pub struct WebhookDispatcher {
    client: reqwest::Client,
    services: ContextServices,
}

impl WebhookDispatcher {
    /// Create a dispatcher with a default HTTP client.
    #[must_use]
    pub fn new(services: ContextServices) -> Self {
        Self::with_client(reqwest::Client::new(), services)
    }

    /// Create a dispatcher with a caller-provided HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, services: ContextServices) -> Self {
        Self { client, services }
    }

    /// Render and send one webhook for a conversation run.
    ///
    /// The body template is evaluated against the loaded history; a
    /// whole-string placeholder in the body keeps its result's native
    /// type, so a body of `"${{ $[-1] }}"` posts the most recent entry
    /// object itself. Returns the response status on success.
    pub async fn fire(
        &self,
        hook: &WebhookConfig,
        conversation: &ConversationId,
        run: Option<&RunId>,
    ) -> Result<StatusCode, HookError> {
        let entries = self.services.load_history(conversation, run).await;
        let body = evaluate_placeholders(&hook.body, &entries);

        let mut request = self.client.request(hook.method.as_reqwest(), &hook.url);
        for (name, template) in &hook.headers {
            let rendered = render_text(template, &entries);
            request = request.header(name.as_str(), rendered);
        }
        if !body.is_null() {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|source| {
            warn!(hook = %hook.name, error = %source, "webhook request failed");
            HookError::Request {
                name: hook.name.clone(),
                source,
            }
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(hook = %hook.name, %status, "webhook delivered");
            Ok(status)
        } else {
            warn!(hook = %hook.name, %status, "webhook endpoint returned failure status");
            Err(HookError::Status {
                name: hook.name.clone(),
                status: status.as_u16(),
            })
        }
    }
}

/// Render a template string to text.
///
/// Header values must end up as strings whatever the placeholder yields:
/// string results are used verbatim, anything else is JSON-encoded.
fn render_text(template: &str, entries: &[palaver_context::entry::Entry]) -> String {
    match evaluate_placeholders(&Value::String(template.to_owned()), entries) {
        Value::String(s) => s,
        other => serde_json::to_string(&other).unwrap_or_else(|_| other.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use palaver_context::cache::InMemoryCache;
    use palaver_context::store::InMemoryMessageStore;
    use palaver_core::messages::{ChatMessage, ContentPart};

    use crate::types::HttpMethod;

    fn services_with_context() -> ContextServices {
        let store = InMemoryMessageStore::new();
        let conv = ConversationId::from("conv-1");
        store.push(
            &conv,
            ChatMessage::assistant("").with_content(vec![ContentPart::tool_call_with_output(
                "ticket_lookup",
                r#"{"ticket": {"id": 17, "status": "open"}}"#,
            )]),
        );
        ContextServices::new(Arc::new(store), Arc::new(InMemoryCache::new()))
    }

    fn hook(url: String, body: Value) -> WebhookConfig {
        WebhookConfig {
            name: "notify".into(),
            url,
            method: HttpMethod::Post,
            headers: std::collections::BTreeMap::new(),
            body,
        }
    }

    #[tokio::test]
    async fn fires_with_rendered_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json(json!({
                "ticketId": 17,
                "summary": "ticket 17 is open"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let hook = hook(
            format!("{}/hook", server.uri()),
            json!({
                "ticketId": "${{ $[0].ticket.id }}",
                "summary": "ticket ${{ $[0].ticket.id }} is ${{ $[0].ticket.status }}"
            }),
        );
        let dispatcher = WebhookDispatcher::new(services_with_context());
        let status = dispatcher
            .fire(&hook, &ConversationId::from("conv-1"), None)
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn whole_string_body_posts_native_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"ticket": {"id": 17, "status": "open"}})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let hook = hook(server.uri(), json!("${{ $[-1] }}"));
        let dispatcher = WebhookDispatcher::new(services_with_context());
        let status = dispatcher
            .fire(&hook, &ConversationId::from("conv-1"), None)
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn headers_are_rendered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-ticket", "17"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut hook = hook(server.uri(), json!({"ok": true}));
        let _ = hook
            .headers
            .insert("x-ticket".into(), "${{ $[0].ticket.id }}".into());
        let dispatcher = WebhookDispatcher::new(services_with_context());
        let _ = dispatcher
            .fire(&hook, &ConversationId::from("conv-1"), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failure_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let hook = hook(server.uri(), json!({}));
        let dispatcher = WebhookDispatcher::new(services_with_context());
        let result = dispatcher
            .fire(&hook, &ConversationId::from("conv-1"), None)
            .await;
        assert_matches!(result, Err(HookError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn empty_context_still_dispatches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"latest": []})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        // No messages for this conversation: history degrades to empty and
        // the zero-match placeholder renders as an empty array.
        let services = ContextServices::new(
            Arc::new(InMemoryMessageStore::new()),
            Arc::new(InMemoryCache::new()),
        );
        let hook = hook(server.uri(), json!({"latest": "${{ $[*] }}"}));
        let dispatcher = WebhookDispatcher::new(services);
        let _ = dispatcher
            .fire(&hook, &ConversationId::from("conv-x"), None)
            .await
            .unwrap();
    }
}
