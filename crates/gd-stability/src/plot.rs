//! S-domain plot data handed to an external renderer.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub real: f64,
    pub imag: f64,
    /// Imaginary part in Hz (`imag / 2π`).
    pub imag_hz: f64,
}

/// Scatter of eigenvalues plus a constant-damping guide line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SDomainPlot {
    pub points: Vec<PlotPoint>,
    pub damping_ratio: f64,
    /// Guide line endpoints `(real, imag)`: upper end, origin, lower end.
    pub damping_line: Vec<(f64, f64)>,
}

impl SDomainPlot {
    /// Guide line for `damping_ratio`, long enough to reach the furthest point.
    pub fn new(eigenvalues: &[Complex64], damping_ratio: f64) -> Self {
        let points = eigenvalues
            .iter()
            .map(|l| PlotPoint {
                real: l.re,
                imag: l.im,
                imag_hz: l.im / TAU,
            })
            .collect();
        let reach = eigenvalues.iter().map(|l| l.norm()).fold(1.0, f64::max);
        let re = -damping_ratio * reach;
        let im = (1.0 - damping_ratio * damping_ratio).max(0.0).sqrt() * reach;
        Self {
            points,
            damping_ratio,
            damping_line: vec![(re, im), (0.0, 0.0), (re, -im)],
        }
    }
}

/// Receives plot data. Rendering must not feed back into the analysis.
pub trait PlotSink {
    fn render(&mut self, plot: &SDomainPlot);
}

/// Default sink: logs the points.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl PlotSink for LogSink {
    fn render(&mut self, plot: &SDomainPlot) {
        for p in &plot.points {
            info!(real = p.real, imag = p.imag, imag_hz = p.imag_hz, "eigenvalue");
        }
    }
}
