//! Single-dispatcher task around a [`Panel`].
//!
//! One tokio task owns the panel. Commands arrive on an mpsc channel; fetches
//! and POSTs run as spawned tasks and report back on a completion channel,
//! so the panel is only ever touched from the dispatcher loop. After every
//! command or completion the current snapshot is published on a watch
//! channel.

use std::marker::PhantomData;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::{post_all, FetchTicket, Panel, PanelSnapshot, PanelView, PendingSubmit, SubmitOutcome, SubmitStart};
use crate::error::{MetricsError, MetricsResult};
use crate::types::Page;

/// Command buffer per panel.
const COMMAND_CHANNEL_SIZE: usize = 32;

#[derive(Debug)]
pub enum PanelCommand<F> {
    SetPage(u32),
    NextPage,
    PrevPage,
    SetSize(u32),
    /// Re-fetch the current page.
    Refresh,
    SetField {
        form: F,
        field: String,
        value: String,
    },
    Submit {
        form: F,
        reply: oneshot::Sender<SubmitOutcome>,
    },
}

type Reply = (oneshot::Sender<SubmitOutcome>, SubmitOutcome);

enum Completion<F> {
    Fetched(FetchTicket, MetricsResult<Page<serde_json::Value>>),
    Posted(PendingSubmit<F>, MetricsResult<()>, oneshot::Sender<SubmitOutcome>),
}

/// Caller side of a running panel task.
pub struct PanelHandle<V: PanelView> {
    commands: mpsc::Sender<PanelCommand<V::Form>>,
    snapshots: watch::Receiver<PanelSnapshot>,
    task: JoinHandle<()>,
    _view: PhantomData<V>,
}

/// Move `panel` into its own task and mount it.
pub fn spawn_panel<V: PanelView>(panel: Panel<V>) -> PanelHandle<V> {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let (snap_tx, snap_rx) = watch::channel(panel.snapshot());
    let task = tokio::spawn(run(panel, cmd_rx, snap_tx));

    PanelHandle {
        commands: cmd_tx,
        snapshots: snap_rx,
        task,
        _view: PhantomData,
    }
}

async fn run<V: PanelView>(
    mut panel: Panel<V>,
    mut commands: mpsc::Receiver<PanelCommand<V::Form>>,
    snapshots: watch::Sender<PanelSnapshot>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion<V::Form>>();

    let ticket = panel.begin_fetch();
    spawn_fetch(&panel, ticket, &done_tx);
    snapshots.send_replace(panel.snapshot());

    log::info!("Panel {}: dispatcher started", V::RESOURCE);

    loop {
        let reply = tokio::select! {
            cmd = commands.recv() => {
                let Some(cmd) = cmd else {
                    break;
                };
                handle_command(&mut panel, cmd, &done_tx)
            }
            Some(done) = done_rx.recv() => match done {
                Completion::Fetched(ticket, result) => {
                    panel.complete_fetch(ticket, result);
                    None
                }
                Completion::Posted(pending, result, reply) => {
                    Some((reply, panel.complete_submit(pending, result)))
                }
            },
        };

        // Publish before replying so a caller sees its own edit.
        snapshots.send_replace(panel.snapshot());
        if let Some((reply, outcome)) = reply {
            let _ = reply.send(outcome);
        }
    }

    log::info!("Panel {}: dispatcher stopped", V::RESOURCE);
}

/// Apply one command. Returns a submit reply that is ready to send.
fn handle_command<V: PanelView>(
    panel: &mut Panel<V>,
    cmd: PanelCommand<V::Form>,
    done_tx: &mpsc::UnboundedSender<Completion<V::Form>>,
) -> Option<Reply> {
    let ticket = match cmd {
        PanelCommand::SetPage(page) => panel.set_page(page),
        PanelCommand::NextPage => panel.next_page(),
        PanelCommand::PrevPage => panel.prev_page(),
        PanelCommand::SetSize(size) => panel.set_size(size),
        PanelCommand::Refresh => Some(panel.begin_fetch()),
        PanelCommand::SetField { form, field, value } => {
            panel.set_field(form, &field, value);
            None
        }
        PanelCommand::Submit { form, reply } => {
            return match panel.begin_submit(form) {
                SubmitStart::Incomplete => Some((reply, SubmitOutcome::Incomplete)),
                SubmitStart::Applied => Some((reply, SubmitOutcome::Local)),
                SubmitStart::Remote(pending) => {
                    spawn_post(panel, pending, reply, done_tx);
                    None
                }
            };
        }
    };

    if let Some(ticket) = ticket {
        spawn_fetch(panel, ticket, done_tx);
    }
    None
}

fn spawn_fetch<V: PanelView>(
    panel: &Panel<V>,
    ticket: FetchTicket,
    done_tx: &mpsc::UnboundedSender<Completion<V::Form>>,
) {
    let backend = panel.backend();
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let result = backend.fetch_page(V::RESOURCE, ticket.page, ticket.size).await;
        let _ = done_tx.send(Completion::Fetched(ticket, result));
    });
}

fn spawn_post<V: PanelView>(
    panel: &Panel<V>,
    pending: PendingSubmit<V::Form>,
    reply: oneshot::Sender<SubmitOutcome>,
    done_tx: &mpsc::UnboundedSender<Completion<V::Form>>,
) {
    let backend = panel.backend();
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let result = post_all(backend.as_ref(), pending.resource, &pending.bodies).await;
        let _ = done_tx.send(Completion::Posted(pending, result, reply));
    });
}

impl<V: PanelView> PanelHandle<V> {
    async fn send(&self, cmd: PanelCommand<V::Form>) -> MetricsResult<()> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| MetricsError::PanelStopped)
    }

    pub async fn set_page(&self, page: u32) -> MetricsResult<()> {
        self.send(PanelCommand::SetPage(page)).await
    }

    pub async fn next_page(&self) -> MetricsResult<()> {
        self.send(PanelCommand::NextPage).await
    }

    pub async fn prev_page(&self) -> MetricsResult<()> {
        self.send(PanelCommand::PrevPage).await
    }

    pub async fn set_size(&self, size: u32) -> MetricsResult<()> {
        self.send(PanelCommand::SetSize(size)).await
    }

    pub async fn refresh(&self) -> MetricsResult<()> {
        self.send(PanelCommand::Refresh).await
    }

    pub async fn set_field(
        &self,
        form: V::Form,
        field: &str,
        value: impl Into<String>,
    ) -> MetricsResult<()> {
        self.send(PanelCommand::SetField {
            form,
            field: field.to_string(),
            value: value.into(),
        })
        .await
    }

    /// Submit a form and wait until its POSTs (if any) resolve.
    pub async fn submit(&self, form: V::Form) -> MetricsResult<SubmitOutcome> {
        let (reply, outcome) = oneshot::channel();
        self.send(PanelCommand::Submit { form, reply }).await?;
        outcome.await.map_err(|_| MetricsError::PanelStopped)
    }

    pub async fn submit_fields(
        &self,
        form: V::Form,
        fields: &[(&str, &str)],
    ) -> MetricsResult<SubmitOutcome> {
        for (field, value) in fields {
            self.set_field(form, field, *value).await?;
        }
        self.submit(form).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> PanelSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait for the first snapshot matching `ready`.
    pub async fn wait_for(
        &self,
        ready: impl FnMut(&PanelSnapshot) -> bool,
    ) -> MetricsResult<PanelSnapshot> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(ready)
            .await
            .map_err(|_| MetricsError::PanelStopped)?;
        Ok(snapshot.clone())
    }

    /// Close the command channel and wait for the dispatcher to exit.
    pub async fn shutdown(self) {
        drop(self.commands);
        if let Err(e) = self.task.await {
            log::warn!("Panel {}: dispatcher ended abnormally: {}", V::RESOURCE, e);
        }
    }
}
