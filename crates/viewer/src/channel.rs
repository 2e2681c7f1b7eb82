//! Messaging channel between the analysis process and the graph.
//!
//! A producer task decodes messages from its source and hands them over one
//! at a time, in arrival order, through a bounded async channel.

use std::path::PathBuf;

use anyhow::{Context, Result};
use graphview::Event;
use smol::channel::{Receiver, Sender};
use smol::io::{AsyncBufReadExt, AsyncRead, BufReader};
use smol::stream::StreamExt;
use smol::{Task, Timer};

use crate::demo::{self, DemoConfig};

const CAPACITY: usize = 64;

/// Where stream messages come from
#[derive(Debug, Clone)]
pub enum Source {
    /// Newline-delimited JSON messages
    File(PathBuf),
    Stdin,
    /// Synthetic analysis process
    Demo(DemoConfig),
}

pub struct EventChannel {
    events: Receiver<Event>,
    producer: Task<Result<usize>>,
}

impl EventChannel {
    /// Connects to `source`. Once this returns the channel is ready for ingestion.
    pub async fn open(source: Source) -> Result<Self> {
        match source {
            Source::File(path) => {
                let file = smol::fs::File::open(&path)
                    .await
                    .with_context(|| format!("opening event stream {}", path.display()))?;
                Ok(Self::from_reader(file))
            }
            Source::Stdin => Ok(Self::from_reader(smol::Unblock::new(std::io::stdin()))),
            Source::Demo(config) => {
                let (tx, rx) = smol::channel::bounded(CAPACITY);
                Ok(Self {
                    events: rx,
                    producer: smol::spawn(forward_demo(config, tx)),
                })
            }
        }
    }

    /// Channel fed by newline-delimited messages from `reader`
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = smol::channel::bounded(CAPACITY);
        Self {
            events: rx,
            producer: smol::spawn(forward_lines(reader, tx)),
        }
    }

    /// Next event, or `None` once the producer is done
    pub async fn next(&self) -> Option<Event> {
        self.events.recv().await.ok()
    }

    /// Stops receiving and waits for the producer; returns how many events it delivered
    pub async fn finish(self) -> Result<usize> {
        self.events.close();
        self.producer.await
    }

    /// Stops receiving and drops the producer wherever it is, even if its
    /// source never ends. The count is `None` when the producer was still running.
    pub async fn cancel(self) -> Result<Option<usize>> {
        self.events.close();
        self.producer.cancel().await.transpose()
    }
}

async fn forward_lines<R>(reader: R, tx: Sender<Event>) -> Result<usize>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = BufReader::new(reader).lines();
    let mut sent = 0;
    let mut line_no = 0;
    while let Some(line) = lines.next().await {
        line_no += 1;
        let line = line.with_context(|| format!("reading event stream line {line_no}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event = match Event::from_json(line) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(line = line_no, %err, "skipping undecodable message");
                continue;
            }
        };
        if tx.send(event).await.is_err() {
            tracing::debug!(line = line_no, "receiver closed, stopping reader");
            break;
        }
        sent += 1;
    }
    Ok(sent)
}

async fn forward_demo(config: DemoConfig, tx: Sender<Event>) -> Result<usize> {
    let delay = config.delay;
    let mut sent = 0;
    for event in demo::generate(&config) {
        if !delay.is_zero() && matches!(event, Event::NodeAdded(_)) {
            Timer::after(delay).await;
        }
        if tx.send(event).await.is_err() {
            break;
        }
        sent += 1;
    }
    Ok(sent)
}
