use jiff::Timestamp;

use crate::Sample;

/// Metrics the console charts out of a telemetry batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temp,
    HumidityAir,
    HumiditySoil,
    Light,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Temp,
        Metric::HumidityAir,
        Metric::HumiditySoil,
        Metric::Light,
    ];

    /// Operator-facing series name.
    pub const fn label(self) -> &'static str {
        match self {
            Metric::Temp => "Temperature",
            Metric::HumidityAir => "Air humidity",
            Metric::HumiditySoil => "Soil humidity",
            Metric::Light => "Light",
        }
    }

    fn project(self, sample: &Sample) -> Option<f64> {
        match self {
            Metric::Temp => sample.temp,
            Metric::HumidityAir => sample.humidity_air,
            Metric::HumiditySoil => sample.humidity_soil,
            Metric::Light => sample.light,
        }
    }
}

/// One chart series: a metric and its values, aligned with the labels
/// of the enclosing [`ChartData`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub metric: Metric,
    pub name: &'static str,
    pub values: Vec<f64>,
}

/// Chart-ready view of a telemetry batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// No samples available. Consumers render a distinct waiting state,
    /// never an empty chart frame.
    NoData,
    Ready {
        /// One time label per sample, oldest first.
        labels: Vec<String>,
        /// One aligned value array per metric in [`Metric::ALL`] order.
        series: Vec<MetricSeries>,
    },
}

impl ChartData {
    /// Reorder a newest-first history batch into oldest-first chart
    /// series.
    ///
    /// The input sequence is reversed exactly once; each sample gets a
    /// human-readable time label, and each metric in [`Metric::ALL`]
    /// gets its own value array aligned with the labels. Missing metric
    /// readings become `0.0` so chart consumers never see holes.
    pub fn reconcile(samples: &[Sample]) -> ChartData {
        if samples.is_empty() {
            return ChartData::NoData;
        }

        let ordered: Vec<&Sample> = samples.iter().rev().collect();

        let labels = ordered
            .iter()
            .map(|sample| time_label(sample.timestamp))
            .collect();

        let series = Metric::ALL
            .iter()
            .map(|&metric| MetricSeries {
                metric,
                name: metric.label(),
                values: ordered
                    .iter()
                    .map(|sample| metric.project(sample).unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        ChartData::Ready { labels, series }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ChartData::NoData)
    }

    /// Number of plotted points per series.
    pub fn len(&self) -> usize {
        match self {
            ChartData::NoData => 0,
            ChartData::Ready { labels, .. } => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn time_label(timestamp: Timestamp) -> String {
    timestamp.strftime("%H:%M").to_string()
}
