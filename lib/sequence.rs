//! Pulse sequences: timing grids that drive a voxel through programmed RF
//! excitation and free evolution, sampling the state into a signal trace.

use std::f64::consts::FRAC_PI_2;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    config::SimParams,
    error::{ Error, Result },
    voxel::Voxel,
};

/// Common interface for pulse sequences.
///
/// A sequence is immutable configuration; `run` borrows a voxel exclusively
/// for the duration of the call, mutates it through the programmed schedule,
/// and returns the sampled trace. The voxel is left in its final state, so a
/// caller wanting the initial condition back must clone beforehand.
pub trait Sequence {
    /// Simulation parameters the sequence was built with.
    fn params(&self) -> &SimParams;

    /// Drive `voxel` through the sequence and return the sampled signal,
    /// one `(Mx, My, Mz)` row per sampling instant.
    fn run(&self, voxel: &mut Voxel) -> nd::Array2<f64>;

    /// Apply an RF pulse with flip angle `alpha` [radians] to the voxel.
    fn apply_rf(&self, voxel: &mut Voxel, alpha: f64) {
        voxel.apply_rf(alpha);
    }

    /// Apply a gradient event to the voxel. Extension seam; no current
    /// sequence emits gradients.
    fn apply_gradient(&self, voxel: &mut Voxel, grad: [f64; 3]) {
        voxel.apply_gradient(grad);
    }
}

/// Free induction decay: a single 90° excitation followed by sampled free
/// evolution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FidSequence {
    params: SimParams,
    total_duration: f64,
    num_steps: usize,
}

impl FidSequence {
    /// Create a new FID sequence sampling every time step over
    /// `total_duration` seconds.
    pub fn new(params: SimParams, total_duration: f64) -> Result<Self> {
        let params = params.validated()?;
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(Error::InvalidDuration {
                name: "total_duration", value: total_duration });
        }
        let num_steps = (total_duration / params.dt).round() as usize;
        Ok(Self { params, total_duration, num_steps })
    }

    /// Number of samples `run` will produce.
    pub fn num_steps(&self) -> usize { self.num_steps }
}

impl Sequence for FidSequence {
    fn params(&self) -> &SimParams { &self.params }

    fn run(&self, voxel: &mut Voxel) -> nd::Array2<f64> {
        self.apply_rf(voxel, FRAC_PI_2);
        let mut signal: nd::Array2<f64>
            = nd::Array2::zeros((self.num_steps, 3));
        // sample before evolving: row 0 is the immediately-post-pulse state
        for mut row in signal.axis_iter_mut(nd::Axis(0)) {
            row.assign(&voxel.read_state());
            voxel.evolve(&self.params);
        }
        signal
    }
}

/// Spin echo: repeated excitation with one sample per repetition at the echo
/// time.
///
/// Each repetition applies only the 90° excitation; no 180° refocusing
/// pulse is emitted at `te/2` yet.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpinEchoSequence {
    params: SimParams,
    tr: f64,
    te: f64,
    num_reps: usize,
    steps_per_rep: usize,
    echo_step: usize,
}

impl SpinEchoSequence {
    /// Create a new spin-echo sequence with repetition time `tr`, echo time
    /// `te` (both seconds), and `num_reps` repetitions.
    ///
    /// The echo is sampled at the discrete step nearest `te` after each
    /// excitation; that step must land strictly inside the repetition.
    pub fn new(params: SimParams, tr: f64, te: f64, num_reps: usize)
        -> Result<Self>
    {
        let params = params.validated()?;
        if !tr.is_finite() || tr <= 0.0 {
            return Err(Error::InvalidDuration { name: "tr", value: tr });
        }
        if !te.is_finite() || te <= 0.0 {
            return Err(Error::InvalidDuration { name: "te", value: te });
        }
        if num_reps == 0 {
            return Err(Error::ZeroRepetitions);
        }
        let steps_per_rep = (tr / params.dt).round() as usize;
        let echo_step = (te / params.dt).round() as usize;
        if echo_step >= steps_per_rep {
            return Err(Error::EchoOutsideRepetition { te, tr });
        }
        Ok(Self { params, tr, te, num_reps, steps_per_rep, echo_step })
    }

    /// Number of repetitions, i.e. the number of samples `run` will produce.
    pub fn num_reps(&self) -> usize { self.num_reps }
}

impl Sequence for SpinEchoSequence {
    fn params(&self) -> &SimParams { &self.params }

    fn run(&self, voxel: &mut Voxel) -> nd::Array2<f64> {
        let mut signal: nd::Array2<f64>
            = nd::Array2::zeros((self.num_reps, 3));
        for mut row in signal.axis_iter_mut(nd::Axis(0)) {
            self.apply_rf(voxel, FRAC_PI_2);
            for n in 0..self.steps_per_rep {
                if n == self.echo_step {
                    row.assign(&voxel.read_state());
                }
                voxel.evolve(&self.params);
            }
        }
        signal
    }
}

/// Complex transverse signal `Mx + i·My` for each sample of a trace.
pub fn transverse(signal: &nd::Array2<f64>) -> nd::Array1<C64> {
    signal.axis_iter(nd::Axis(0))
        .map(|row| C64::new(row[0], row[1]))
        .collect()
}

/// Magnitude `|M|` for each sample of a trace.
pub fn magnitude(signal: &nd::Array2<f64>) -> nd::Array1<f64> {
    signal.axis_iter(nd::Axis(0))
        .map(|row| row.dot(&row).sqrt())
        .collect()
}

/// Sample instants for a trace recorded once per time step.
pub fn time_axis(num_steps: usize, dt: f64) -> nd::Array1<f64> {
    (0..num_steps).map(|n| n as f64 * dt).collect()
}
