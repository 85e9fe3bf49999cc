//! Stream session lifecycle.
//!
//! A [`Stream`] owns one [`FrameReader`] and a handle to the [`Network`]. On
//! [`start`](Stream::start) it issues the long-lived GET, binds the response
//! body to the reader and spawns a background task that feeds framed messages
//! into a delivery queue. [`stop`](Stream::stop) closes a one-shot signal the
//! task watches.
//!
//! # States
//!
//! ```text
//! Idle ──start() ok──► Running ──stop() / end of stream / read error──► Stopped
//!   │                                                                      │
//!   └─start() err──► Idle                           renew() ──► new Idle ◄──┘
//! ```
//!
//! The delivery queue holds a single message, so the task waits for the
//! consumer to take the previous one before it reads further: a slow consumer
//! throttles the connection instead of losing messages. Keep-alives are never
//! delivered. A session ends with at most one terminal error message.

use crate::core::client::config::Endpoints;
use crate::core::client::query::StreamQuery;
use crate::core::client::reader::FrameReader;
use crate::core::client::signal::StopSignal;
use crate::core::client::utils;
use crate::core::error::{Result, StreamError};
use crate::core::traits::Network;
use crate::core::types::{Bytes, RequestOptions, StreamMessage};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Decode hook applied to every non-empty message on the background task.
pub type DecodeHook<T> = Arc<dyn Fn(Bytes) -> Result<T> + Send + Sync>;

/// Observable state of a stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Running,
    Stopped,
}

/// Receiving end of a session's delivery queue.
///
/// Meant for a single consumer. Returns `None` once the session has ended
/// and every message has been taken.
#[derive(Debug, Clone)]
pub struct Messages<T = Bytes> {
    receiver: async_channel::Receiver<StreamMessage<T>>,
}

impl<T> Messages<T> {
    /// Wait for the next message.
    pub async fn next(&self) -> Option<StreamMessage<T>> {
        self.receiver.recv().await.ok()
    }

    /// Take a message if one is queued, without waiting.
    pub fn try_next(&self) -> Option<StreamMessage<T>> {
        self.receiver.try_recv().ok()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Whether the session has ended. Queued messages may still be taken.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }

    /// Use the queue as a `futures::Stream`.
    pub fn into_stream(self) -> async_channel::Receiver<StreamMessage<T>> {
        self.receiver
    }
}

/// One streaming session.
pub struct Stream<T = Bytes> {
    network: Arc<dyn Network>,
    endpoints: Endpoints,
    reader: Option<FrameReader>,
    decode: DecodeHook<T>,
    sender: Option<async_channel::Sender<StreamMessage<T>>>,
    receiver: async_channel::Receiver<StreamMessage<T>>,
    signal: Arc<StopSignal>,
    started: bool,
    task: Option<JoinHandle<()>>,
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("stream_url", &self.endpoints.stream)
            .field("state", &self.state())
            .finish()
    }
}

impl Stream<Bytes> {
    /// Create a session that delivers raw message bytes.
    pub fn new(network: Arc<dyn Network>, endpoints: Endpoints) -> Self {
        Self::with_hook(network, endpoints, Arc::new(raw))
    }
}

fn raw(bytes: Bytes) -> Result<Bytes> {
    Ok(bytes)
}

impl<T: Send + 'static> Stream<T> {
    /// Create a session that runs `decode` over every message.
    ///
    /// A decode failure is delivered as [`StreamError::Decode`] and the
    /// session keeps going.
    pub fn with_decoder<F, E>(network: Arc<dyn Network>, endpoints: Endpoints, decode: F) -> Self
    where
        F: Fn(&[u8]) -> std::result::Result<T, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        let hook: DecodeHook<T> = Arc::new(move |bytes: Bytes| {
            decode(&bytes[..]).map_err(|e| StreamError::Decode(e.to_string()))
        });
        Self::with_hook(network, endpoints, hook)
    }

    fn with_hook(network: Arc<dyn Network>, endpoints: Endpoints, decode: DecodeHook<T>) -> Self {
        let (sender, receiver) = async_channel::bounded(1);
        Stream {
            network,
            endpoints,
            reader: Some(FrameReader::new()),
            decode,
            sender: Some(sender),
            receiver,
            signal: Arc::new(StopSignal::new()),
            started: false,
            task: None,
        }
    }

    /// Replace the decode hook. Must be called before [`start`](Stream::start).
    pub fn decode_with<U, F, E>(self, decode: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(&[u8]) -> std::result::Result<U, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Stream::with_decoder(self.network.clone(), self.endpoints.clone(), decode)
    }

    /// A fresh idle session over the same network, endpoints and decode hook.
    ///
    /// This is how a stopped session reconnects. [`Messages`] handles taken
    /// from this session keep pointing at the old queue.
    pub fn renew(&self) -> Stream<T> {
        Self::with_hook(
            self.network.clone(),
            self.endpoints.clone(),
            self.decode.clone(),
        )
    }

    /// Open the stream and start delivering messages.
    ///
    /// On failure the session stays idle and may be started again. A session
    /// that has already run cannot be started again; use
    /// [`renew`](Stream::renew).
    pub async fn start(&mut self, query: &StreamQuery) -> Result<()> {
        if self.started || self.signal.is_closed() {
            return Err(StreamError::AlreadyStarted);
        }

        let url = utils::url_with_query(&self.endpoints.stream, &query.build())?;
        let mut opts = RequestOptions::get(url);
        let response = self.network.execute(&mut opts).await?;

        let (Some(mut reader), Some(sender)) = (self.reader.take(), self.sender.take()) else {
            return Err(StreamError::AlreadyStarted);
        };
        reader.bind_boxed(response.into_body());

        tracing::debug!(url = %opts.url, retries = opts.retries, "stream started");
        self.started = true;
        self.task = Some(utils::spawn_task(run(
            reader,
            self.decode.clone(),
            sender,
            self.signal.clone(),
        )));
        Ok(())
    }
}

impl<T> Stream<T> {
    /// Handle to the delivery queue.
    pub fn messages(&self) -> Messages<T> {
        Messages {
            receiver: self.receiver.clone(),
        }
    }

    pub fn state(&self) -> StreamState {
        if self.signal.is_closed() {
            return StreamState::Stopped;
        }
        match (self.started, &self.task) {
            (false, _) => StreamState::Idle,
            (true, Some(task)) if !task.is_finished() => StreamState::Running,
            (true, _) => StreamState::Stopped,
        }
    }

    /// Ask the background task to stop.
    ///
    /// Returns `true` if this call closed the signal. Stopping twice is
    /// harmless and returns `false`.
    pub fn stop(&self) -> bool {
        let closed = self.signal.close();
        if !self.started {
            // No task owns the sender yet, so wake waiting consumers here.
            self.receiver.close();
        }
        if closed {
            tracing::debug!("stream stop requested");
        } else {
            tracing::warn!("stream stop requested more than once");
        }
        closed
    }

    /// Wait for the background task to finish. Returns immediately when the
    /// session never started.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("stream task ended abnormally: {}", e);
            }
        }
    }
}

impl<T> Drop for Stream<T> {
    fn drop(&mut self) {
        // Let the background task release the connection.
        self.signal.close();
        if !self.started {
            self.receiver.close();
        }
    }
}

/// Background consumption loop.
async fn run<T>(
    mut reader: FrameReader,
    decode: DecodeHook<T>,
    sender: async_channel::Sender<StreamMessage<T>>,
    signal: Arc<StopSignal>,
) {
    loop {
        if signal.is_closed() {
            break;
        }

        let next = tokio::select! {
            biased;
            _ = signal.closed() => break,
            next = reader.next() => next,
        };

        let message = match next {
            Ok(Some(frame)) if frame.is_empty() => {
                tracing::debug!("keep-alive");
                continue;
            }
            Ok(Some(frame)) => StreamMessage::from(decode(frame)),
            Ok(None) => {
                deliver(&sender, &signal, StreamMessage::Error(StreamError::EndOfStream)).await;
                break;
            }
            Err(e) => {
                tracing::warn!("stream read failed: {}", e);
                deliver(&sender, &signal, StreamMessage::Error(e)).await;
                break;
            }
        };

        if !deliver(&sender, &signal, message).await {
            break;
        }
    }
    tracing::debug!("stream task exiting");
}

/// Push one message, giving up if the session is stopped or nobody is
/// listening anymore.
async fn deliver<T>(
    sender: &async_channel::Sender<StreamMessage<T>>,
    signal: &StopSignal,
    message: StreamMessage<T>,
) -> bool {
    tokio::select! {
        biased;
        _ = signal.closed() => false,
        sent = sender.send(message) => sent.is_ok(),
    }
}
