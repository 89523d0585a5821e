//! Relaying and checking newline-delimited event streams.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use metricsbus_sdk::{EventBus, EventCodec, LocalBus, Sink, SinkService};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::settings::Settings;

/// Counts from one relay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Lines published to the bus.
    pub published: usize,
    /// Blank lines skipped.
    pub skipped: usize,
}

/// Relay every line of `input` through a bus to the configured sinks.
pub async fn relay<R>(input: R, settings: &Settings) -> Result<RelayStats>
where
    R: AsyncBufRead + Unpin,
{
    let sinks = settings.build_sinks()?;
    relay_to_sinks(input, &settings.sink_address, sinks).await
}

/// Relay every line of `input` to `address`, where a sink service records
/// the decoded events to `sinks`.
///
/// Lines are published as they are read. Malformed lines reach the handler
/// like any other and are logged there. The service is stopped and awaited
/// once the input is exhausted.
pub async fn relay_to_sinks<R>(
    input: R,
    address: &str,
    sinks: Vec<Arc<dyn Sink>>,
) -> Result<RelayStats>
where
    R: AsyncBufRead + Unpin,
{
    let bus = LocalBus::new();
    let service = SinkService::builder()
        .address(address)
        .sinks(sinks)
        .build()?
        .start(&bus);

    let mut stats = RelayStats::default();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            stats.skipped += 1;
            continue;
        }
        bus.publish(address, line.to_string());
        stats.published += 1;
    }
    debug!(published = stats.published, "Input drained");

    service.stop();
    service.join().await;

    info!(
        address = %address,
        published = stats.published,
        skipped = stats.skipped,
        "Relay finished"
    );
    Ok(stats)
}

/// Counts from one check run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// Lines that decoded.
    pub ok: usize,
    /// Lines that failed to decode.
    pub failed: usize,
}

impl CheckSummary {
    /// Whether every line decoded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Decode every non-blank line of `input`, writing one verdict per line to
/// `out`.
///
/// ```
/// use metricsbus::relay::check;
///
/// let input = "{\"annotations\":{},\"timerSamples\":{},\"counterSamples\":{},\"gaugeSamples\":{}}\nnope\n";
/// let mut out = Vec::new();
///
/// let summary = check(input.as_bytes(), &mut out).unwrap();
/// assert_eq!((summary.ok, summary.failed), (1, 1));
/// assert!(String::from_utf8(out).unwrap().starts_with("line 1: ok"));
/// ```
pub fn check<R, W>(input: R, out: &mut W) -> Result<CheckSummary>
where
    R: BufRead,
    W: Write,
{
    let codec = EventCodec::new();
    let mut summary = CheckSummary::default();

    for (index, line) in input.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let number = index + 1;
        match codec.decode(line) {
            Ok(event) => {
                summary.ok += 1;
                writeln!(out, "line {}: ok ({} samples)", number, event.sample_count())?;
            }
            Err(e) => {
                summary.failed += 1;
                writeln!(out, "line {}: error: {}", number, e)?;
            }
        }
    }

    Ok(summary)
}
