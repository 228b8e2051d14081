//! Error types for simulation construction and configuration loading.

use std::path::PathBuf;

/// Errors produced when constructing or configuring a simulation.
///
/// The update operations themselves are total over finite inputs and never
/// fail; everything that can go wrong is caught at construction time.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A relaxation time constant was zero, negative, or non-finite.
    #[error("relaxation time {name} must be positive and finite (got {value:e})")]
    InvalidRelaxation { name: &'static str, value: f64 },

    /// The simulation time step was zero, negative, or non-finite.
    #[error("time step must be positive and finite (got {0:e})")]
    InvalidTimeStep(f64),

    /// A gyromagnetic ratio or field strength was non-finite.
    #[error("{name} must be finite (got {value:e})")]
    InvalidFieldParam { name: &'static str, value: f64 },

    /// A sequence timing parameter was zero, negative, or non-finite.
    #[error("{name} must be positive and finite (got {value:e})")]
    InvalidDuration { name: &'static str, value: f64 },

    /// A spin-echo sequence was configured with zero repetitions.
    #[error("repetition count must be non-zero")]
    ZeroRepetitions,

    /// The echo time does not fall within a single repetition.
    #[error("echo time {te:e} s does not fall within the repetition time {tr:e} s")]
    EchoOutsideRepetition { te: f64, tr: f64 },

    /// An unrecognized reference-frame name.
    #[error("unknown reference frame {0:?} (expected \"lab\" or \"rot\")")]
    UnknownFrame(String),

    /// Could not read a configuration file.
    #[error("couldn't read config file {0:?}: {1}")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    /// Could not parse a configuration file.
    #[error("couldn't parse config file {0:?}: {1}")]
    ConfigParse(PathBuf, #[source] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
