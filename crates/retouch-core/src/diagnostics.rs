//! Render diagnostics: per-operation timing and output sizes.
//!
//! [`render_with_diagnostics`] produces exactly the same pixels as
//! [`Renderer::render`] while recording how long each step took. Time
//! is read through the [`Clock`] trait so this crate stays free of
//! platform time APIs; callers inject a clock backed by whatever timer
//! their platform provides.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chain::FilterChain;
use crate::operation::OperationKind;
use crate::render::Renderer;
use crate::types::{Dimensions, RgbaImage};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// A monotonic time source.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Capture the current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderDiagnostics {
    /// Source image dimensions.
    pub source: Dimensions,
    /// One entry per operation, in application order.
    pub steps: Vec<StepDiagnostics>,
    /// Total wall-clock duration of the render (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Diagnostics for one applied operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDiagnostics {
    /// Which operation ran.
    pub kind: OperationKind,
    /// Wall-clock duration of this step (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Dimensions of the image this step produced.
    pub output: Dimensions,
}

impl RenderDiagnostics {
    /// Dimensions of the final rendered image.
    #[must_use]
    pub fn output(&self) -> Dimensions {
        self.steps.last().map_or(self.source, |step| step.output)
    }

    /// Human-readable multi-line report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Render Diagnostics Report\n{}", "=".repeat(60)));
        let output = self.output();
        lines.push(format!(
            "Image: {}x{} -> {}x{}",
            self.source.width, self.source.height, output.width, output.height,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        if self.steps.is_empty() {
            lines.push("(empty chain)".to_string());
            return lines.join("\n");
        }

        lines.push(format!(
            "{:<4} {:<18} {:>10} {:>9}  {}",
            "#", "Operation", "Duration", "% Total", "Output"
        ));
        lines.push("-".repeat(60));

        let total_ms = duration_ms(self.total_duration);
        for (index, step) in self.steps.iter().enumerate() {
            let ms = duration_ms(step.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "{:<4} {:<18} {ms:>8.3}ms {pct:>8.1}%  {}x{}",
                index + 1,
                step.kind,
                step.output.width,
                step.output.height,
            ));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Render `chain` over `source`, timing each operation.
#[must_use = "returns the rendered image and its diagnostics"]
pub fn render_with_diagnostics<C: Clock>(
    renderer: &Renderer,
    source: &RgbaImage,
    chain: &FilterChain,
    clock: &C,
) -> (RgbaImage, RenderDiagnostics) {
    let start = clock.now();
    let mut image = source.clone();
    let mut steps = Vec::with_capacity(chain.len());

    for op in chain {
        let step_start = clock.now();
        image = renderer.apply(&image, op);
        steps.push(StepDiagnostics {
            kind: op.kind(),
            duration: clock.elapsed(&step_start),
            output: Dimensions::of(&image),
        });
    }

    let diagnostics = RenderDiagnostics {
        source: Dimensions::of(source),
        steps,
        total_duration: clock.elapsed(&start),
    };
    (image, diagnostics)
}
