use crate::app::event::AppEvent;
use crate::config::model::TwitchConfig;
use anyhow::{Context, Result};
use futures::StreamExt;
use irc::client::prelude::*;
use tokio::sync::mpsc;

/// Capabilities that make Twitch send tags, CLEARCHAT/CLEARMSG/ROOMSTATE and
/// JOIN/PART.
pub const TWITCH_CAPABILITIES: [&str; 3] = [
    "twitch.tv/tags",
    "twitch.tv/commands",
    "twitch.tv/membership",
];

pub struct IrcConnection {
    pub channel: String,
    pub sender: irc::client::Sender,
}

impl IrcConnection {
    pub fn send_privmsg(&self, text: &str) -> Result<()> {
        // No CTCP injection in outbound messages
        let clean = text.replace('\x01', "");
        self.sender.send_privmsg(&self.channel, &clean)?;
        Ok(())
    }

    pub fn send_action(&self, text: &str) -> Result<()> {
        let clean = text.replace('\x01', "");
        let ctcp = format!("\x01ACTION {}\x01", clean);
        self.sender.send_privmsg(&self.channel, &ctcp)?;
        Ok(())
    }

    pub fn quit(&self, message: Option<&str>) {
        let _ = self.sender.send_quit(message.unwrap_or("Leaving"));
    }
}

pub async fn spawn_connection(
    twitch: &TwitchConfig,
    login: String,
    event_tx: mpsc::UnboundedSender<AppEvent>,
) -> Result<IrcConnection> {
    let channel = twitch.irc_channel();
    let config = Config {
        server: Some(twitch.host.clone()),
        port: Some(twitch.port),
        use_tls: Some(twitch.tls),
        nickname: Some(login.clone()),
        password: twitch.oauth_token.clone(),
        channels: vec![channel.clone()],
        ..Config::default()
    };

    let mut client = Client::from_config(config)
        .await
        .with_context(|| format!("Failed to connect to {}:{}", twitch.host, twitch.port))?;
    client.identify()?;
    client.send(Command::Raw(
        "CAP".to_string(),
        vec!["REQ".to_string(), TWITCH_CAPABILITIES.join(" ")],
    ))?;

    let sender = client.sender();
    let mut stream = client.stream()?;

    let event_tx_clone = event_tx.clone();
    let _ = event_tx.send(AppEvent::IrcConnected);
    tracing::info!("Connected to {} as {}", twitch.host, login);

    tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(message) => {
                    if event_tx_clone
                        .send(AppEvent::IrcMessage { message })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    let _ = event_tx_clone.send(AppEvent::IrcError {
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }
        let _ = event_tx_clone.send(AppEvent::IrcDisconnected {
            reason: "Connection closed".to_string(),
        });
    });

    Ok(IrcConnection {
        channel,
        sender,
    })
}
