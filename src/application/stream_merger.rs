// Stream merger - Owns per-metric sample collections and applies live samples
use crate::application::aggregator::{summarize, summarize_with};
use crate::domain::summary::MetricSummary;
use crate::domain::telemetry::{HistorySnapshot, MetricKind, Sample, UsageStat};

#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Same `time` as the previous delivery on this metric; nothing changed.
    Duplicate,
    /// Sample appended and the metric recomputed.
    Recomputed(MetricSummary),
}

#[derive(Debug, Default)]
struct MetricChannel {
    samples: Vec<Sample>,
    usage: Vec<UsageStat>,
    /// `time` of the last live delivery.
    cursor: Option<String>,
}

impl MetricChannel {
    fn summarize(&self, kind: MetricKind) -> Option<MetricSummary> {
        summarize(&self.samples, &self.usage, kind)
    }

    /// Append a live sample and return the recomputed summary.
    fn append(&mut self, kind: MetricKind, sample: Sample) -> MetricSummary {
        let summary = summarize_with(&self.samples, &sample, &self.usage, kind);
        self.samples.push(sample);
        summary
    }
}

/// Authoritative in-memory history for the three metrics.
///
/// Each metric keeps its own collection and dedup cursor, so traffic on one
/// channel never touches another.
#[derive(Debug, Default)]
pub struct StreamMerger {
    temperature: MetricChannel,
    load: MetricChannel,
    fuel: MetricChannel,
}

impl StreamMerger {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn channel(&self, kind: MetricKind) -> &MetricChannel {
        match kind {
            MetricKind::Temperature => &self.temperature,
            MetricKind::Load => &self.load,
            MetricKind::Fuel => &self.fuel,
        }
    }

    fn channel_mut(&mut self, kind: MetricKind) -> &mut MetricChannel {
        match kind {
            MetricKind::Temperature => &mut self.temperature,
            MetricKind::Load => &mut self.load,
            MetricKind::Fuel => &mut self.fuel,
        }
    }

    /// Replace all history with an initial fetch result.
    ///
    /// Returns a summary for every metric that has samples; empty metrics are skipped.
    /// Dedup cursors only follow live deliveries and are left as they are.
    pub fn seed(&mut self, snapshot: HistorySnapshot) -> Vec<MetricSummary> {
        let mut summaries = Vec::new();
        for kind in MetricKind::ALL {
            let usage = snapshot.usage_for(kind);
            let samples = snapshot.samples(kind).to_vec();
            let channel = self.channel_mut(kind);
            channel.samples = samples;
            channel.usage = usage;

            match channel.summarize(kind) {
                Some(summary) => summaries.push(summary),
                None => tracing::debug!(metric = %kind, "no historical samples"),
            }
        }
        summaries
    }

    /// Merge one live sample into its metric.
    ///
    /// Only an immediate repeat of the previous delivery's `time` is dropped;
    /// an older, different `time` is appended and sorted into place.
    pub fn apply(&mut self, kind: MetricKind, sample: Sample) -> MergeOutcome {
        let channel = self.channel_mut(kind);
        if channel.cursor.as_deref() == Some(sample.time.as_str()) {
            tracing::debug!(metric = %kind, time = %sample.time, "dropping repeated delivery");
            return MergeOutcome::Duplicate;
        }

        channel.cursor = Some(sample.time.clone());
        MergeOutcome::Recomputed(channel.append(kind, sample))
    }

    #[cfg(test)]
    pub fn samples(&self, kind: MetricKind) -> &[Sample] {
        &self.channel(kind).samples
    }
}
