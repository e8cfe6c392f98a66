use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use super::traits::{PushEvent, PushStream, Transport};
use super::types::RawInboundMessage;
use crate::app::Config;
use crate::constants::{
    HEALTH_CHECK_TIMEOUT_SECS, HTTP_REQUEST_TIMEOUT_SECS, PUSH_EVENT_BUFFER,
};
use crate::session::{Credential, Session};
use crate::utils::{ChatError, Result};

/// HTTP transport against the bot backend.
pub struct HttpTransport {
    client: Client,
    // The push stream outlives any request timeout, so it gets its own
    // client without one
    stream_client: Client,
    config: Config,
}

impl HttpTransport {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
                .build()?,
            stream_client: Client::builder().build()?,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authed(
        &self,
        request: reqwest::RequestBuilder,
        credential: &Credential,
    ) -> reqwest::RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", credential.key))
            .header("x-application-id", &self.config.application_id)
    }

    /// Map a non-2xx response into an API error, consuming the body.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ChatError::Api { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn create_user(&self) -> Result<Credential> {
        let response = self
            .client
            .post(self.url("/users"))
            .header("x-application-id", &self.config.application_id)
            .json(&json!({}))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: CreateUserResponse = response.json().await?;
        debug!("Created user {}", body.user.id);
        Ok(Credential {
            user_id: body.user.id,
            key: body.key,
        })
    }

    async fn create_conversation(&self, credential: &Credential) -> Result<String> {
        let response = self
            .authed(self.client.post(self.url("/conversations")), credential)
            .json(&json!({}))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: CreateConversationResponse = response.json().await?;
        debug!("Created conversation {}", body.conversation.id);
        Ok(body.conversation.id)
    }

    async fn send_message(&self, session: &Session, text: &str) -> Result<String> {
        let request_body = json!({
            "conversationId": session.conversation_id,
            "payload": { "type": "text", "text": text },
        });

        let response = self
            .authed(self.client.post(self.url("/messages")), &session.credential)
            .json(&request_body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: SendMessageResponse = response.json().await?;
        Ok(body.message.id)
    }

    async fn list_messages(&self, session: &Session) -> Result<Vec<RawInboundMessage>> {
        let path = format!("/conversations/{}/messages", session.conversation_id);
        let response = self
            .authed(self.client.get(self.url(&path)), &session.credential)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: ListMessagesResponse = response.json().await?;
        Ok(body.messages)
    }

    async fn open_push_stream(&self, session: &Session) -> Result<PushStream> {
        let path = format!("/conversations/{}/listen", session.conversation_id);
        let response = self
            .authed(
                self.stream_client.get(self.url(&path)),
                &session.credential,
            )
            .header("Accept", "text/event-stream")
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let (tx, rx) = mpsc::channel(PUSH_EVENT_BUFFER);
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(Err(ChatError::Stream(e.to_string()))).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // Emit complete SSE events; a partial event stays
                // buffered until its terminator arrives
                while let Some(pos) = buffer.find("\n\n") {
                    let event_str = buffer[..pos].to_string();
                    buffer = buffer[pos + 2..].to_string();

                    for line in event_str.lines() {
                        if let Some(data) = line.strip_prefix("data: ") {
                            if data.trim().is_empty() {
                                continue;
                            }
                            let event = PushEvent {
                                data: data.to_string(),
                            };
                            if tx.send(Ok(event)).await.is_err() {
                                // Receiver dropped, stop reading
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok(ReceiverStream::new(rx).boxed())
    }

    async fn health_check(&self) -> bool {
        // Short timeout so a down backend doesn't stall startup
        let health_client = match Client::builder()
            .timeout(std::time::Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .build()
        {
            Ok(client) => client,
            Err(_) => return false,
        };

        match health_client.get(self.url("/hello")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

// Response envelopes for the backend API

#[derive(Debug, Deserialize)]
struct CreateUserResponse {
    user: UserBody,
    key: String,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreateConversationResponse {
    conversation: ConversationBody,
}

#[derive(Debug, Deserialize)]
struct ConversationBody {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    message: MessageBody,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListMessagesResponse {
    messages: Vec<RawInboundMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_url_joining_strips_trailing_slash() {
        let transport =
            HttpTransport::new(Config::new("http://localhost:3100/", "app")).unwrap();
        assert_eq!(transport.url("/users"), "http://localhost:3100/users");
    }

    #[test]
    fn test_envelope_shapes() {
        let user: CreateUserResponse =
            serde_json::from_str(r#"{"user":{"id":"u-9"},"key":"secret"}"#).unwrap();
        assert_eq!(user.user.id, "u-9");
        assert_eq!(user.key, "secret");

        let conversation: CreateConversationResponse =
            serde_json::from_str(r#"{"conversation":{"id":"c-9"}}"#).unwrap();
        assert_eq!(conversation.conversation.id, "c-9");

        let sent: SendMessageResponse =
            serde_json::from_str(r#"{"message":{"id":"m-9"}}"#).unwrap();
        assert_eq!(sent.message.id, "m-9");

        let listed: ListMessagesResponse =
            serde_json::from_str(r#"{"messages":[{"id":"m1"},{"id":"m2"}]}"#).unwrap();
        assert_eq!(listed.messages.len(), 2);
        assert_eq!(listed.messages[0].id, "m1");
    }
}
