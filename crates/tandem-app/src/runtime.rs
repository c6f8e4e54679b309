//! Generic runtime for session orchestration.
//!
//! The Runtime drives the session event loop, coordinating between:
//! - [`Session`]: the pure orchestrator
//! - [`KeyAgent`]: asynchronous crypto
//! - [`Driver`]: platform-specific I/O
//!
//! There is one logical queue. Driver input, crypto completions and clock
//! ticks are raced with `tokio::select!`, but each is handled to completion,
//! actions included, before the next is taken. Crypto requests run as spawned
//! tasks and report back through a channel, so a completion can interleave
//! with relay traffic; the session treats a stale one as a protocol
//! violation.

use std::future::Future;

use tandem_core::{
    SessionConfig,
    handshake::{CONNECTION_LOST, OOPS, ROOM_UNAVAILABLE},
};
use tokio::{
    sync::mpsc,
    time::{Interval, MissedTickBehavior},
};

use crate::{
    CryptoResult, Driver, DriverInput, KeyAgent, SEND_DROPPED, Session, SessionAction,
    SessionEvent, SessionFlags,
};

/// What woke the loop.
enum Wake {
    Input(DriverInput),
    Completion(CryptoResult),
    Tick,
}

/// Generic runtime that owns a [`Session`] and executes its actions.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `K`: Crypto collaborator
pub struct Runtime<D, K>
where
    D: Driver,
    K: KeyAgent,
{
    driver: D,
    agent: K,
    session: Session<D::Instant>,
    completions_tx: mpsc::UnboundedSender<CryptoResult>,
    completions_rx: mpsc::UnboundedReceiver<CryptoResult>,
    ticker: Interval,
}

impl<D, K> Runtime<D, K>
where
    D: Driver,
    K: KeyAgent,
{
    /// Create a runtime with the given driver and crypto agent.
    ///
    /// Must be called from within a tokio runtime (the tick interval is
    /// created here).
    pub fn new(driver: D, agent: K, flags: SessionFlags, config: SessionConfig) -> Self {
        let session = Session::new(flags, &config, driver.now());
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let mut ticker = tokio::time::interval(config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self { driver, agent, session, completions_tx, completions_rx, ticker }
    }

    /// Run the event loop until the driver asks to quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.session)?;

        loop {
            let should_quit = self.step().await?;
            if should_quit {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Wait for one input, handle it and execute the resulting actions.
    ///
    /// Returns `true` if the driver asked to quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        let wake = tokio::select! {
            input = self.driver.next_input() => Wake::Input(input?),
            Some(result) = self.completions_rx.recv() => Wake::Completion(result),
            _ = self.ticker.tick() => Wake::Tick,
        };

        let event = match wake {
            Wake::Input(DriverInput::Quit) => return Ok(true),
            Wake::Input(DriverInput::Relay(text)) => SessionEvent::RelayText(text),
            Wake::Input(DriverInput::RelayClosed) => SessionEvent::RelayClosed,
            Wake::Input(DriverInput::User(intent)) => SessionEvent::User(intent),
            Wake::Completion(result) => SessionEvent::Crypto(result),
            Wake::Tick => SessionEvent::Tick(self.driver.now()),
        };

        self.dispatch(event).await?;
        Ok(false)
    }

    /// Feed one event to the session and execute the resulting actions.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn dispatch(&mut self, event: SessionEvent<D::Instant>) -> Result<(), D::Error> {
        let actions = self.session.handle(event);
        self.execute(actions).await
    }

    async fn execute(&mut self, actions: Vec<SessionAction>) -> Result<(), D::Error> {
        for action in actions {
            match action {
                SessionAction::Render => self.driver.render(&self.session)?,
                SessionAction::Send(frame) => match frame.to_json() {
                    Ok(text) => self.driver.send_text(text).await?,
                    Err(e) => tracing::error!(error = %e, "failed to encode outbound frame"),
                },
                SessionAction::ExportKey => self.request(|agent| async move {
                    CryptoResult::KeyExported(
                        agent.export_public_key().await.map_err(|e| e.to_string()),
                    )
                }),
                SessionAction::ImportKey(key) => self.request(|agent| async move {
                    CryptoResult::KeyImported(
                        agent.import_peer_key(key).await.map_err(|e| e.to_string()),
                    )
                }),
                SessionAction::Encrypt(plaintext) => self.request(|agent| async move {
                    CryptoResult::Encrypted(agent.encrypt(plaintext).await.map_err(|e| e.to_string()))
                }),
                SessionAction::Decrypt(ciphertext) => self.request(|agent| async move {
                    CryptoResult::Decrypted(
                        agent.decrypt(ciphertext).await.map_err(|e| e.to_string()),
                    )
                }),
                SessionAction::Navigate(path) => self.driver.navigate(&path),
                SessionAction::ResetAnimation => self.driver.reset_animation(),
                SessionAction::ScrollToBottom => self.driver.scroll_to_bottom(),
                SessionAction::Log { tag, value } => emit_log(tag, &value),
            }
        }
        Ok(())
    }

    /// Spawn a crypto request whose result re-enters the loop as an event.
    fn request<F, Fut>(&self, job: F)
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = CryptoResult> + Send + 'static,
    {
        let completion = job(self.agent.clone());
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = completion.await;
            if tx.send(result).is_err() {
                tracing::debug!("runtime gone, dropping crypto completion");
            }
        });
    }

    /// Get a reference to the Session
    pub fn session(&self) -> &Session<D::Instant> {
        &self.session
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

/// Route a session log through `tracing`.
///
/// Expected lifecycle events are informational; everything else points at a
/// misbehaving peer, relay or collaborator.
fn emit_log(tag: &'static str, value: &str) {
    match tag {
        _ if is_lifecycle(tag) => tracing::info!(tag, value, "session event"),
        OOPS => tracing::warn!(value, "protocol violation"),
        _ => tracing::warn!(tag, value, "session fault"),
    }
}

fn is_lifecycle(tag: &str) -> bool {
    matches!(tag, ROOM_UNAVAILABLE | CONNECTION_LOST | SEND_DROPPED)
}
