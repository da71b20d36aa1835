//! Headline form session
//!
//! An actor task owns the three UI-visible fields (input, headline,
//! error) and is their only writer. Generations run on their own tasks
//! and report back with the ticket they were issued; only the most
//! recently issued ticket may update the form (last-request-wins).

use tokio::sync::{mpsc, oneshot, watch};
use log::{debug, error, info, trace};
use serde::Serialize;

use crate::client::GenerationClient;
use crate::error::Error;
use crate::request::{FailureKind, GenerationResult};

/// Where the form is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase
{   Idle
  , Submitting
    {   ticket: u64
    }
  , Success
  , Failure
}

/// Snapshot of the form as the renderer sees it.
/// `headline` and `error` are never both set; `failure` is set
/// exactly when `error` is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView
{   pub input: String
  , pub phase: Phase
  , pub headline: Option<String>
  , pub error: Option<String>
  , /// Kind of the failure behind `error`
    pub failure: Option<FailureKind>
  , /// Ticket whose result is on display
    pub settled_ticket: Option<u64>
  , /// Stale settlements dropped so far
    pub discarded: u64
}

impl Default for FormView
{   fn default() -> Self
    {   FormView
        {   input: String::new()
          , phase: Phase::Idle
          , headline: None
          , error: None
          , failure: None
          , settled_ticket: None
          , discarded: 0
        }
    }
}

/// What to do with a submit while another is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy
{   /// Start the new generation; older ones can no longer update the form
    #[default]
    LatestWins
  , /// Refuse until the outstanding generation settles
    Reject
}

/// Outcome of `HeadlineSession::submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission
{   /// A generation was started under this ticket
    Issued(u64)
  , /// Input failed validation; no request was made
    Rejected(Error)
  , /// `OverlapPolicy::Reject` and this ticket is still outstanding
    Busy(u64)
}

// ===== Session Actor =====

/// Commands for the session actor
enum SessionCommand
{   Edit
    {   text: String
    }
  , Submit
    {   reply: oneshot::Sender<Submission>
    }
  , Snapshot
    {   reply: oneshot::Sender<FormView>
    }
  , Shutdown
    {   reply: oneshot::Sender<()>
    }
}

/// A generation task reporting back
struct Settled
{   ticket: u64
  , result: GenerationResult
}

/// Session state, owned by the loop task
struct SessionState
{   view: FormView
  , policy: OverlapPolicy
  , client: GenerationClient
  , next_ticket: u64
  , /// Only this ticket may settle into the view
    latest: Option<u64>
  , settled_tx: mpsc::UnboundedSender<Settled>
  , view_tx: watch::Sender<FormView>
}

impl SessionState
{   fn publish(&self)
    {   self.view_tx.send_replace(self.view.clone());
    }

    fn handle_edit(&mut self, text: String)
    {   trace!("Edit: {} chars", text.len());
        self.view.input = text;
        if matches!(self.view.phase, Phase::Success | Phase::Failure)
        {   self.view.phase = Phase::Idle;
        }
        self.publish();
    }

    fn handle_submit(&mut self) -> Submission
    {   if let (OverlapPolicy::Reject, Phase::Submitting { ticket })
          = (self.policy, self.view.phase)
        {   debug!("Submit refused, ticket {} outstanding", ticket);
            return Submission::Busy(ticket);
        }

        let request = match self.client.prepare(&self.view.input)
        {   Ok(request) => request
          , Err(e) => {
              debug!("Submit rejected: {}", e);
              // supersedes anything still in flight
              self.latest = None;
              self.view.phase = Phase::Failure;
              self.view.headline = None;
              self.view.error = Some(e.to_string());
              self.view.failure = Some(FailureKind::ValidationError);
              self.publish();
              return Submission::Rejected(e);
            }
        };

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.latest = Some(ticket);
        self.view.error = None;
        self.view.failure = None;
        self.view.phase = Phase::Submitting { ticket };
        self.publish();
        debug!("Issued ticket {}", ticket);

        let client = self.client.clone();
        let settled_tx = self.settled_tx.clone();
        tokio::spawn(async move {
          let result = client.generate(&request).await;
          if settled_tx.send(Settled { ticket, result }).is_err()
          {   debug!("Session gone before ticket {} settled", ticket);
          }
        });

        Submission::Issued(ticket)
    }

    fn handle_settled(&mut self, settled: Settled)
    {   let Settled { ticket, result } = settled;
        if self.latest != Some(ticket)
        {   debug!(
              "Dropping stale ticket {} (latest: {:?})",
              ticket, self.latest
            );
            self.view.discarded += 1;
            self.publish();
            return;
        }

        match result
        {   GenerationResult::Success { headline } => {
              self.view.phase = Phase::Success;
              self.view.headline = Some(headline);
              self.view.error = None;
              self.view.failure = None;
            }
          , GenerationResult::Failure { kind, detail } => {
              debug!("Ticket {} failed ({}): {}", ticket, kind, detail);
              self.view.phase = Phase::Failure;
              self.view.headline = None;
              self.view.error = Some(detail);
              self.view.failure = Some(kind);
            }
        }
        self.view.settled_ticket = Some(ticket);
        self.publish();
    }
}

/// Handle to a running headline form session
pub struct HeadlineSession
{   tx: mpsc::UnboundedSender<SessionCommand>
  , view_rx: watch::Receiver<FormView>
  , _task: tokio::task::JoinHandle<()>
}

impl HeadlineSession
{   /// Spawn the session loop. Must be called inside a tokio runtime.
    pub fn new(client: GenerationClient, policy: OverlapPolicy) -> Self
    {   debug!("Creating HeadlineSession with {:?}", policy);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(FormView::default());

        let _task = tokio::spawn(async move {
          run_session_loop(cmd_rx, view_tx, client, policy).await;
        });

        HeadlineSession
        {   tx: cmd_tx
          , view_rx
          , _task
        }
    }

    /// Replace the bio text
    pub async fn edit(&self, text: impl Into<String>)
      -> Result<(), Error>
    {   self.send(SessionCommand::Edit { text: text.into() })
    }

    /// Submit the current bio
    pub async fn submit(&self) -> Result<Submission, Error>
    {   let (reply, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Submit { reply })?;
        reply_rx.await.map_err(|_| Error::SessionClosed)
    }

    /// Current view, after every command sent before this one
    pub async fn snapshot(&self) -> Result<FormView, Error>
    {   let (reply, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot { reply })?;
        reply_rx.await.map_err(|_| Error::SessionClosed)
    }

    /// Receiver that sees every published view
    pub fn subscribe(&self) -> watch::Receiver<FormView>
    {   self.view_rx.clone()
    }

    /// Stop the loop; in-flight generations are dropped on settle
    pub async fn shutdown(self) -> Result<(), Error>
    {   debug!("Shutting down HeadlineSession");
        let (reply, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Shutdown { reply })?;
        reply_rx.await.map_err(|_| Error::SessionClosed)
    }

    fn send(&self, cmd: SessionCommand) -> Result<(), Error>
    {   self.tx.send(cmd).map_err(|_| {
          error!("Session loop disconnected");
          Error::SessionClosed
        })
    }
}

/// Main session event loop
async fn run_session_loop(
  mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>
, view_tx: watch::Sender<FormView>
, client: GenerationClient
, policy: OverlapPolicy
)
{   debug!("Starting session loop");
    let (settled_tx, mut settled_rx) = mpsc::unbounded_channel();
    let mut state = SessionState
    {   view: FormView::default()
      , policy
      , client
      , next_ticket: 0
      , latest: None
      , settled_tx
      , view_tx
    };

    loop
    { tokio::select!
      { cmd = cmd_rx.recv() => {
          match cmd
          {   Some(SessionCommand::Edit { text }) => {
                state.handle_edit(text);
              }
            , Some(SessionCommand::Submit { reply }) => {
                let _ = reply.send(state.handle_submit());
              }
            , Some(SessionCommand::Snapshot { reply }) => {
                let _ = reply.send(state.view.clone());
              }
            , Some(SessionCommand::Shutdown { reply }) => {
                let _ = reply.send(());
                info!("Headline session shutting down");
                break;
              }
            , None => {
                debug!("Command channel closed");
                break;
              }
          }
        }
      , Some(settled) = settled_rx.recv() => {
          state.handle_settled(settled);
        }
      }
    }
}
