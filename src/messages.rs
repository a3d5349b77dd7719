use crate::settings::SettingsPatch;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ExtensionMessage {
    UpdateSettings { settings: SettingsPatch },
    GetStatus,
}

impl ExtensionMessage {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("decode extension message")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("encode extension message")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub overlay_active: bool,
    pub video_id: Option<String>,
    pub is_fullscreen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionResponse {
    Status(StatusReport),
    Ack { success: bool },
}

impl ExtensionResponse {
    pub fn ack() -> Self {
        Self::Ack { success: true }
    }
}

#[derive(Debug)]
pub struct Envelope {
    pub message: ExtensionMessage,
    reply: Option<Sender<ExtensionResponse>>,
}

impl Envelope {
    pub fn expects_reply(&self) -> bool {
        self.reply.is_some()
    }

    /// Sends the response if the sender asked for one. A requester that
    /// already went away is not an error.
    pub fn respond(self, response: ExtensionResponse) {
        if let Some(reply) = self.reply {
            if reply.send(response).is_err() {
                tracing::debug!("requester dropped before reply");
            }
        }
    }
}

/// Sending half, held by the settings surface (or any other context).
#[derive(Debug, Clone)]
pub struct MessagePort {
    tx: Sender<Envelope>,
}

/// Receiving half, drained by the overlay's lifecycle manager.
#[derive(Debug)]
pub struct MessageInbox {
    rx: Receiver<Envelope>,
}

pub fn message_channel() -> (MessagePort, MessageInbox) {
    let (tx, rx) = channel::<Envelope>();
    (MessagePort { tx }, MessageInbox { rx })
}

impl MessagePort {
    pub fn post(&self, message: ExtensionMessage) -> Result<()> {
        self.tx
            .send(Envelope {
                message,
                reply: None,
            })
            .map_err(|_| anyhow!("extension message receiver disconnected"))
    }

    pub fn request(&self, message: ExtensionMessage) -> Result<PendingReply> {
        let (reply_tx, reply_rx) = channel::<ExtensionResponse>();
        self.tx
            .send(Envelope {
                message,
                reply: Some(reply_tx),
            })
            .map_err(|_| anyhow!("extension message receiver disconnected"))?;
        Ok(PendingReply { rx: reply_rx })
    }
}

#[derive(Debug)]
pub struct PendingReply {
    rx: Receiver<ExtensionResponse>,
}

impl PendingReply {
    pub fn try_take(&self) -> Result<Option<ExtensionResponse>> {
        match self.rx.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(anyhow!("message dropped without a reply")),
        }
    }

    pub fn wait(&self, timeout: Duration) -> Result<ExtensionResponse> {
        match self.rx.recv_timeout(timeout) {
            Ok(response) => Ok(response),
            Err(RecvTimeoutError::Timeout) => Err(anyhow!("no reply within {timeout:?}")),
            Err(RecvTimeoutError::Disconnected) => Err(anyhow!("message dropped without a reply")),
        }
    }
}

#[derive(Debug)]
pub enum InboxPoll {
    Message(Envelope),
    Empty,
    Disconnected,
}

impl MessageInbox {
    pub fn poll(&self) -> InboxPoll {
        match self.rx.try_recv() {
            Ok(envelope) => InboxPoll::Message(envelope),
            Err(TryRecvError::Empty) => InboxPoll::Empty,
            Err(TryRecvError::Disconnected) => InboxPoll::Disconnected,
        }
    }
}
