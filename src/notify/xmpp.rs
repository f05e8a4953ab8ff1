//! XMPP chat message delivery
//!
//! Each send spins up a current-thread runtime, logs in, sends one chat
//! message, closes the stream and tears the runtime down again.

use std::fmt;
use std::str::FromStr;

use futures::StreamExt;
use serde::Deserialize;
use tokio_xmpp::parsers::message::{Body, Message, MessageType};
use tokio_xmpp::parsers::{BareJid, Jid};
use tokio_xmpp::AsyncClient;
use tracing::{debug, info};

use super::{NotificationSender, NotifyError};
use crate::config::Injectable;

/// Overrides the `[XMPP] password` value when set
pub const PASSWORD_ENV: &str = "AUTO_BACKUP_XMPP_PASSWORD";

/// The `[XMPP]` section
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct XmppParams {
    pub account: String,
    pub password: String,
    pub recipient: String,
}

impl Injectable for XmppParams {
    const TARGET: &'static str = "XMPP";
    const PARAMETERS: &'static [&'static str] = &["account", "password", "recipient"];
}

impl fmt::Debug for XmppParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmppParams")
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .finish()
    }
}

fn parse_jid(value: &str) -> Result<BareJid, NotifyError> {
    BareJid::from_str(value).map_err(|e| NotifyError::InvalidJid {
        jid: value.to_string(),
        reason: e.to_string(),
    })
}

/// Sends chat messages from one account to one recipient
pub struct XmppSender {
    account: BareJid,
    password: String,
    recipient: BareJid,
}

impl XmppSender {
    /// Validates both JIDs; no connection is made here
    pub fn new(params: XmppParams) -> Result<Self, NotifyError> {
        Ok(Self {
            account: parse_jid(&params.account)?,
            password: params.password,
            recipient: parse_jid(&params.recipient)?,
        })
    }

    pub fn account(&self) -> &BareJid {
        &self.account
    }

    pub fn recipient(&self) -> &BareJid {
        &self.recipient
    }

    fn chat_message(&self, text: &str) -> Message {
        let mut message = Message::new(Some(Jid::from(self.recipient.clone())));
        message.type_ = MessageType::Chat;
        message.bodies.insert(String::new(), Body(text.to_string()));
        message
    }

    async fn connect_and_send(&self, text: &str) -> Result<(), NotifyError> {
        let transport = |e: tokio_xmpp::Error| NotifyError::Transport(e.to_string());

        let mut client = AsyncClient::new(self.account.clone(), self.password.clone());
        client.set_reconnect(false);

        let mut sent = false;
        while let Some(event) = client.next().await {
            if event.is_online() && !sent {
                debug!(recipient = %self.recipient, "XMPP session online");
                client
                    .send_stanza(self.chat_message(text).into())
                    .await
                    .map_err(transport)?;
                client.send_end().await.map_err(transport)?;
                sent = true;
            }
        }

        if sent {
            Ok(())
        } else {
            Err(NotifyError::NotDelivered)
        }
    }
}

impl NotificationSender for XmppSender {
    fn send(&self, message: &str) -> Result<(), NotifyError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(NotifyError::Runtime)?;

        runtime.block_on(self.connect_and_send(message))?;
        info!(recipient = %self.recipient, "Notification sent");
        Ok(())
    }
}

impl fmt::Debug for XmppSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmppSender")
            .field("account", &self.account.to_string())
            .field("recipient", &self.recipient.to_string())
            .finish_non_exhaustive()
    }
}
