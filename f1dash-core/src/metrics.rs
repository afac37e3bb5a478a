//! Derived comparison metrics
//!
//! Pure functions over extracted telemetry: chart series, the delta-time
//! curve between two laps and the sampled frames of the track replay.

use crate::error::{DashboardError, Result};
use crate::model::{LapRecord, TelemetryPoint, TelemetrySample, TimingPoint};
use serde::{Deserialize, Serialize};

/// A named x/y series ready for plotting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Telemetry channel plotted against distance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Speed,
    Throttle,
    Brake,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Speed => "Speed",
            Metric::Throttle => "Throttle",
            Metric::Brake => "Brake",
        }
    }

    fn value(&self, point: &TelemetryPoint) -> f64 {
        match self {
            Metric::Speed => point.speed,
            Metric::Throttle => point.throttle,
            Metric::Brake => point.brake,
        }
    }
}

/// One channel of a driver's lap against distance, point for point
pub fn metric_series(driver: &str, sample: &TelemetrySample, metric: Metric) -> Series {
    Series {
        name: driver.to_string(),
        x: sample.distances(),
        y: sample.column(|p| metric.value(p)),
    }
}

/// Both drivers' speed traces as-is. No common distance grid: the two
/// series keep their own point counts and spacing.
pub fn speed_overlay(
    first: (&str, &TelemetrySample),
    second: (&str, &TelemetrySample),
) -> Vec<Series> {
    vec![
        metric_series(first.0, first.1, Metric::Speed),
        metric_series(second.0, second.1, Metric::Speed),
    ]
}

// === Delta time ===

/// Time gained or lost along the reference lap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaCurve {
    /// Reference lap distances
    pub distance: Vec<f64>,
    /// Seconds; positive means the comparison driver is behind
    pub delta: Vec<f64>,
}

/// Delta between two laps on the reference lap's distance grid
///
/// The comparison lap's elapsed time is linearly interpolated at each
/// reference distance, clamping beyond either end of its trace.
pub fn delta_time(reference: &LapRecord, comparison: &LapRecord) -> Result<DeltaCurve> {
    if comparison.timing.is_empty() {
        return Err(DashboardError::NoLapData {
            driver: comparison.driver.clone(),
        });
    }

    let (distance, delta): (Vec<f64>, Vec<f64>) = reference
        .timing
        .iter()
        .map(|point| {
            let compared = time_at_distance(&comparison.timing, point.distance);
            (point.distance, compared - point.time)
        })
        .unzip();

    Ok(DeltaCurve { distance, delta })
}

/// Elapsed time at `distance` over a trace with non-decreasing distance
fn time_at_distance(trace: &[TimingPoint], distance: f64) -> f64 {
    let first = trace[0];
    let last = trace[trace.len() - 1];
    if distance <= first.distance {
        return first.time;
    }
    if distance >= last.distance {
        return last.time;
    }

    // first index at or beyond `distance`; strictly inside the trace here
    let hi = trace.partition_point(|p| p.distance < distance);
    let upper = trace[hi];
    if upper.distance == distance {
        return upper.time;
    }

    let lower = trace[hi - 1];
    let t = (distance - lower.distance) / (upper.distance - lower.distance);
    lower.time + (upper.time - lower.time) * t
}

// === Track replay frames ===

/// Sub-sampling and playback settings for the track replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationOptions {
    /// First sample shown, skipping the noisy start of the trace
    pub start: usize,
    /// Samples between consecutive frames
    pub stride: usize,
    /// Client-side playback time per frame
    pub frame_duration_ms: u64,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            start: 10,
            stride: 8,
            frame_duration_ms: 240,
        }
    }
}

impl AnimationOptions {
    /// Number of frames produced for a trace of `samples` points
    pub fn frame_count(&self, samples: usize) -> usize {
        if samples < self.start {
            return 0;
        }
        (samples - self.start) / self.stride.max(1)
    }
}

/// One step of the track replay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrame {
    /// Frame number, from 0
    pub index: usize,
    /// Telemetry sample the frame shows
    pub sample: usize,
    /// Car position, centred on the lap's mean position
    pub x: f64,
    pub y: f64,
    /// km/h at this sample
    pub speed: f64,
    /// Mean throttle (0-100) from the start of the lap through this sample
    pub throttle_avg: f64,
    /// Share of samples on the brake, as a percentage, through this sample
    pub brake_avg: f64,
}

/// Mean x and y of the lap, used to centre the track drawing
pub fn track_centre(sample: &TelemetrySample) -> (f64, f64) {
    if sample.is_empty() {
        return (0.0, 0.0);
    }
    let n = sample.len() as f64;
    let (sx, sy) = sample
        .points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    (sx / n, sy / n)
}

/// Sample the lap every `stride` points from `start`, carrying running
/// throttle and brake averages over everything driven so far
pub fn animation_frames(sample: &TelemetrySample, options: &AnimationOptions) -> Vec<AnimationFrame> {
    let count = options.frame_count(sample.len());
    if count == 0 {
        return Vec::new();
    }

    let stride = options.stride.max(1);
    let (cx, cy) = track_centre(sample);
    let last = options.start + (count - 1) * stride;

    let mut frames = Vec::with_capacity(count);
    let mut throttle_sum = 0.0;
    let mut brake_sum = 0.0;
    let mut next = options.start;

    for (i, point) in sample.points.iter().enumerate().take(last + 1) {
        throttle_sum += point.throttle;
        brake_sum += point.brake;

        if i != next {
            continue;
        }

        let seen = (i + 1) as f64;
        frames.push(AnimationFrame {
            index: frames.len(),
            sample: i,
            x: point.x - cx,
            y: point.y - cy,
            speed: point.speed,
            throttle_avg: throttle_sum / seen,
            brake_avg: brake_sum / seen * 100.0,
        });
        next += stride;
    }

    frames
}
