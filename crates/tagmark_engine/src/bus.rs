//! Manager-to-page relay for tag refresh messages.

use serde::{Deserialize, Serialize};
use tagmark_core::{matches_any, UrlPattern};
use tagmark_logging::{tagmark_debug, tagmark_info};
use tokio::sync::{mpsc, oneshot};
use url::Url;

use crate::watcher::PageCommand;

/// Message sent to every open target page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RelayMessage {
    RefreshTags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
}

struct RegisteredPage {
    url: Url,
    commands: mpsc::UnboundedSender<PageCommand>,
}

/// Registry of open pages. Broadcasts go only to pages on a target pattern.
pub struct Relay {
    targets: Vec<UrlPattern>,
    pages: Vec<RegisteredPage>,
}

impl Relay {
    pub fn new(targets: Vec<UrlPattern>) -> Self {
        Self {
            targets,
            pages: Vec::new(),
        }
    }

    pub fn register(&mut self, url: Url, commands: mpsc::UnboundedSender<PageCommand>) {
        tagmark_debug!("relay: registered {}", url);
        self.pages.push(RegisteredPage { url, commands });
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Drops pages whose watch loop has ended. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.pages.len();
        self.pages.retain(|page| !page.commands.is_closed());
        before - self.pages.len()
    }

    /// Sends `message` to every matching page and returns one reply receiver per delivery.
    pub fn broadcast(&mut self, message: RelayMessage) -> Vec<oneshot::Receiver<RelayResponse>> {
        self.prune();
        let mut replies = Vec::new();
        for page in &self.pages {
            if !matches_any(&self.targets, &page.url) {
                continue;
            }
            let (reply, receiver) = oneshot::channel();
            if page
                .commands
                .send(PageCommand::Relay { message, reply })
                .is_ok()
            {
                replies.push(receiver);
            }
        }
        tagmark_info!(
            "relay: {:?} sent to {} of {} page(s)",
            message,
            replies.len(),
            self.pages.len()
        );
        replies
    }
}

/// Waits for every reply; pages that close before answering are left out.
pub async fn collect_responses(
    receivers: Vec<oneshot::Receiver<RelayResponse>>,
) -> Vec<RelayResponse> {
    let mut responses = Vec::with_capacity(receivers.len());
    for receiver in receivers {
        if let Ok(response) = receiver.await {
            responses.push(response);
        }
    }
    responses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_messages_use_action_tagged_json() {
        assert_eq!(
            serde_json::to_string(&RelayMessage::RefreshTags).unwrap(),
            r#"{"action":"refreshTags"}"#
        );
        assert_eq!(
            serde_json::to_string(&RelayResponse { success: true }).unwrap(),
            r#"{"success":true}"#
        );
        let parsed: RelayMessage = serde_json::from_str(r#"{"action":"refreshTags"}"#).unwrap();
        assert_eq!(parsed, RelayMessage::RefreshTags);
    }
}
