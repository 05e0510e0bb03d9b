//! Async driver for a [`PageSession`]: one task per page owns the session and
//! serializes commands with the debounce timer.

use std::future;

use tagmark_logging::{tagmark_debug, tagmark_info};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use url::Url;

use crate::bus::{RelayMessage, RelayResponse};
use crate::dom::{DomEvent, NodeId};
use crate::session::PageSession;
use crate::types::{PageAction, PassReport};

#[derive(Debug)]
pub enum PageCommand {
    /// Parse `html` and append it under `parent`.
    Insert { parent: NodeId, html: String },
    Dispatch {
        target: NodeId,
        event: DomEvent,
        reply: oneshot::Sender<Option<PageAction>>,
    },
    Relay {
        message: RelayMessage,
        reply: oneshot::Sender<RelayResponse>,
    },
    Shutdown,
}

pub struct WatchLoop {
    session: PageSession,
    commands: mpsc::UnboundedReceiver<PageCommand>,
    reports: mpsc::UnboundedSender<PassReport>,
}

impl WatchLoop {
    pub fn new(
        session: PageSession,
        commands: mpsc::UnboundedReceiver<PageCommand>,
        reports: mpsc::UnboundedSender<PassReport>,
    ) -> Self {
        Self {
            session,
            commands,
            reports,
        }
    }

    /// Starts the session and spawns its loop on the current runtime.
    pub fn spawn(session: PageSession) -> PageHandle {
        let url = session.url().clone();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(WatchLoop::new(session, cmd_rx, report_tx).run());
        PageHandle {
            url,
            commands: cmd_tx,
            reports: report_rx,
            task,
        }
    }

    /// Runs until `Shutdown` or until every sender is dropped, then returns the disposed session.
    pub async fn run(mut self) -> PageSession {
        let initial = self.session.start();
        let _ = self.reports.send(initial);

        loop {
            let deadline = self.session.pending_deadline();
            tokio::select! {
                command = self.commands.recv() => match command {
                    None | Some(PageCommand::Shutdown) => break,
                    Some(command) => self.handle(command),
                },
                _ = sleep_until(deadline) => {
                    if let Some(report) = self.session.fire_timer(Instant::now().into_std()) {
                        let _ = self.reports.send(report);
                    }
                }
            }
        }

        tagmark_info!("watch loop for {} stopped", self.session.url());
        self.session.dispose();
        self.session
    }

    fn handle(&mut self, command: PageCommand) {
        match command {
            PageCommand::Insert { parent, html } => {
                let inserted = self.session.document_mut().insert_html(parent, &html);
                tagmark_debug!("inserted {} node(s) under {}", inserted.len(), parent);
                self.session.observe(Instant::now().into_std());
            }
            PageCommand::Dispatch {
                target,
                event,
                reply,
            } => {
                let _ = reply.send(self.session.dispatch(target, event));
            }
            PageCommand::Relay { message, reply } => {
                let (response, report) = self.session.handle_relay(message);
                if let Some(report) = report {
                    let _ = self.reports.send(report);
                }
                let _ = reply.send(response);
            }
            PageCommand::Shutdown => {}
        }
    }
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(Instant::from_std(deadline)).await,
        None => future::pending().await,
    }
}

/// Caller side of a spawned [`WatchLoop`].
pub struct PageHandle {
    url: Url,
    commands: mpsc::UnboundedSender<PageCommand>,
    reports: mpsc::UnboundedReceiver<PassReport>,
    task: JoinHandle<PageSession>,
}

impl PageHandle {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Sender to register with a [`Relay`](crate::Relay).
    pub fn sender(&self) -> mpsc::UnboundedSender<PageCommand> {
        self.commands.clone()
    }

    pub fn insert(&self, parent: NodeId, html: impl Into<String>) -> bool {
        self.commands
            .send(PageCommand::Insert {
                parent,
                html: html.into(),
            })
            .is_ok()
    }

    pub async fn dispatch(&self, target: NodeId, event: DomEvent) -> Option<PageAction> {
        let (reply, receiver) = oneshot::channel();
        self.commands
            .send(PageCommand::Dispatch {
                target,
                event,
                reply,
            })
            .ok()?;
        receiver.await.ok().flatten()
    }

    pub async fn next_report(&mut self) -> Option<PassReport> {
        self.reports.recv().await
    }

    /// Stops the loop and returns the session, or `None` if the task panicked.
    pub async fn shutdown(self) -> Option<PageSession> {
        let _ = self.commands.send(PageCommand::Shutdown);
        self.task.await.ok()
    }
}
