//! Process-wide simulation parameters.
//!
//! These are fixed before a run and read-only thereafter; nothing in the
//! core mutates them.

use std::{ f64::consts::TAU, fmt, path::Path, str::FromStr };
use serde::Deserialize;
use crate::error::{ Error, Result };

/// Gyromagnetic ratio of ¹H in water [Hz/T].
pub const GAMMA_1H: f64 = 42_576_384.74;

/// Reference frame for the simulation.
///
/// In the lab frame free precession about the main field is modeled
/// explicitly; in the rotating frame the coordinate system co-rotates at the
/// Larmor frequency and only relaxation applies between pulses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frame {
    #[default]
    Lab,
    Rot,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lab => write!(f, "lab"),
            Self::Rot => write!(f, "rot"),
        }
    }
}

impl FromStr for Frame {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lab" => Ok(Self::Lab),
            "rot" => Ok(Self::Rot),
            _ => Err(Error::UnknownFrame(s.into())),
        }
    }
}

/// Fixed parameters of a simulation run.
///
/// The time step is uniform and caller-chosen. For a faithful lab-frame
/// trajectory it must be well below the precession period (~100x below the
/// Nyquist period `1 / (2 γ B0)`), otherwise the sampled trajectory
/// aliases.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Gyromagnetic ratio [Hz/T].
    pub gamma: f64,
    /// Main field strength [T].
    pub b0: f64,
    /// Reference frame.
    pub frame: Frame,
    /// Simulation time step [s].
    pub dt: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self { gamma: GAMMA_1H, b0: 0.1, frame: Frame::Lab, dt: 1e-9 }
    }
}

impl SimParams {
    /// Check parameter values, passing `self` through unchanged if they are
    /// well-formed.
    pub fn validated(self) -> Result<Self> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(Error::InvalidTimeStep(self.dt));
        }
        if !self.gamma.is_finite() {
            return Err(
                Error::InvalidFieldParam { name: "gamma", value: self.gamma });
        }
        if !self.b0.is_finite() {
            return Err(
                Error::InvalidFieldParam { name: "b0", value: self.b0 });
        }
        Ok(self)
    }

    /// Load parameters from a TOML file; keys not present fall back to the
    /// defaults.
    pub fn from_toml_file<P>(path: P) -> Result<Self>
    where P: AsRef<Path>
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| Error::ConfigRead(path.to_path_buf(), err))?;
        let params: Self = toml::from_str(&text)
            .map_err(|err| Error::ConfigParse(path.to_path_buf(), err))?;
        params.validated()
    }

    /// Larmor precession frequency `γ B0` [Hz].
    pub fn larmor(&self) -> f64 { self.gamma * self.b0 }

    /// Phase accumulated by free precession over a single time step
    /// [radians].
    pub fn step_phase(&self) -> f64 { TAU * self.larmor() * self.dt }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = SimParams::default();
        assert!(params.validated().is_ok());
        assert!((params.larmor() - GAMMA_1H * 0.1).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_time_step() {
        let params = SimParams { dt: 0.0, ..Default::default() };
        assert!(matches!(params.validated(), Err(Error::InvalidTimeStep(_))));
        let params = SimParams { dt: f64::NAN, ..Default::default() };
        assert!(params.validated().is_err());
    }

    #[test]
    fn parses_toml_with_defaults() {
        let params: SimParams
            = toml::from_str("frame = \"rot\"\ndt = 2e-9\n").unwrap();
        assert_eq!(params.frame, Frame::Rot);
        assert!((params.dt - 2e-9).abs() < 1e-24);
        assert!((params.gamma - GAMMA_1H).abs() < 1e-6);
    }

    #[test]
    fn frame_roundtrips_through_strings() {
        assert_eq!("lab".parse::<Frame>().unwrap(), Frame::Lab);
        assert_eq!("rot".parse::<Frame>().unwrap(), Frame::Rot);
        assert_eq!(Frame::Rot.to_string(), "rot");
        assert!("labframe".parse::<Frame>().is_err());
    }
}
