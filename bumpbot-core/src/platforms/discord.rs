// File: bumpbot-core/src/platforms/discord.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use twilight_http::client::ClientBuilder;
use twilight_http::error::ErrorType;
use twilight_http::Client as HttpClient;
use twilight_model::id::marker::ChannelMarker;
use twilight_model::id::Id;

use crate::platforms::{ConnectionStatus, PlatformAuth, PlatformIntegration};
use crate::Error;

/// A REST-only Discord session; one instance per target per cycle. Sending
/// a single message only needs the HTTP API, so the gateway is never opened.
pub struct DiscordPlatform {
    pub token: String,
    pub connection_status: ConnectionStatus,
    http: Option<Arc<HttpClient>>,
}

impl DiscordPlatform {
    pub fn new(token: String) -> Self {
        Self {
            token,
            connection_status: ConnectionStatus::Disconnected,
            http: None,
        }
    }

    fn http(&self) -> Result<&Arc<HttpClient>, Error> {
        self.http
            .as_ref()
            .ok_or_else(|| Error::Platform("Discord session is not connected".into()))
    }
}

/// Maps a twilight HTTP failure onto the error taxonomy by status code.
fn http_error(context: &str, err: twilight_http::Error) -> Error {
    match err.kind() {
        ErrorType::Response { status, .. } => match status.get() {
            401 => Error::Auth(format!("{context}: {err}")),
            403 => Error::Permission(format!("{context}: {err}")),
            404 => Error::NotFound(format!("{context}: {err}")),
            _ => Error::Platform(format!("{context}: {err}")),
        },
        _ => Error::Network(format!("{context}: {err}")),
    }
}

#[async_trait]
impl PlatformAuth for DiscordPlatform {
    async fn authenticate(&mut self) -> Result<(), Error> {
        if self.token.is_empty() {
            return Err(Error::Auth("Discord token is empty".into()));
        }
        Ok(())
    }
    async fn refresh_auth(&mut self) -> Result<(), Error> {
        Ok(())
    }
    async fn revoke_auth(&mut self) -> Result<(), Error> {
        Ok(())
    }
    async fn is_authenticated(&self) -> Result<bool, Error> {
        Ok(!self.token.is_empty())
    }
}

#[async_trait]
impl PlatformIntegration for DiscordPlatform {
    async fn connect(&mut self) -> Result<(), Error> {
        if matches!(self.connection_status, ConnectionStatus::Connected) {
            debug!("(DiscordPlatform) Already connected => skipping");
            return Ok(());
        }

        let http = Arc::new(
            ClientBuilder::new()
                .token(self.token.clone())
                .timeout(Duration::from_secs(30))
                .build(),
        );

        // Validate the token up front so a bad credential surfaces as an
        // auth failure rather than a failed send.
        let user = http
            .current_user()
            .await
            .map_err(|e| http_error("fetching current user", e))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing current user: {e:?}")))?;
        info!("(DiscordPlatform) Logged in as {} (ID={})", user.name, user.id);

        self.http = Some(http);
        self.connection_status = ConnectionStatus::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), Error> {
        if self.http.take().is_some() {
            debug!("(DiscordPlatform) Session closed");
        }
        self.connection_status = ConnectionStatus::Disconnected;
        Ok(())
    }

    async fn send_message(&self, channel: &str, message: &str) -> Result<(), Error> {
        let channel_id_u64: u64 = channel
            .parse()
            .map_err(|_| Error::Platform(format!("Invalid channel ID: {channel}")))?;
        // Snowflakes are never zero; Id::new would panic on one.
        let channel_id = Id::<ChannelMarker>::new_checked(channel_id_u64)
            .ok_or_else(|| Error::NotFound(format!("Channel ID must be non-zero: {channel}")))?;
        let http = self.http()?;

        // Resolve the channel first; a stale id should fail here, not on send.
        let ch = http
            .channel(channel_id)
            .await
            .map_err(|e| http_error("resolving channel", e))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error parsing channel: {e:?}")))?;
        let channel_name = ch.name.unwrap_or_else(|| channel_id.to_string());
        debug!("(DiscordPlatform) Sending to channel {channel_id} ('{channel_name}')");

        http.create_message(channel_id)
            .content(message)
            .await
            .map_err(|e| http_error("sending message", e))?;

        Ok(())
    }

    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error> {
        Ok(self.connection_status.clone())
    }
}
