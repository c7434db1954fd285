//! Harness error definitions.
//!
//! Errors only arise before the run loop starts (missing inputs, malformed UART tokens,
//! unknown configuration) or from writing the run's outputs (trace files, UART echo).
//! Nothing the DUT does is an error: its outputs are data that feeds the end-condition
//! detector and the verdict.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Which input a missing or unreadable file was supplied for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Boot image (`--boot`).
    Boot,
    /// ROM image (`--rom`).
    Rom,
    /// UART input word file (`--uart-in`).
    UartIn,
    /// Scripted DUT model description (`--model`).
    Model,
    /// Harness configuration file (`--config`).
    Config,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Boot => "BOOT",
            Self::Rom => "ROM",
            Self::UartIn => "UART",
            Self::Model => "model",
            Self::Config => "configuration",
        };
        f.write_str(name)
    }
}

/// Errors reported by the harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A required input file does not exist.
    #[error("{kind} file does not exist: {}", path.display())]
    MissingFile {
        /// Input the file was supplied for.
        kind: InputKind,
        /// Path as given on the command line.
        path: PathBuf,
    },

    /// An input file exists but could not be read.
    #[error("could not read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A UART input token is not a decimal integer.
    #[error("malformed UART token #{index} in {}: {token:?}", path.display())]
    MalformedUartToken {
        /// UART input file.
        path: PathBuf,
        /// Zero-based token position in the file.
        index: usize,
        /// Offending text.
        token: String,
    },

    /// The requested core preset is not known.
    #[error("unknown core configuration: {0}")]
    UnknownCore(String),

    /// A JSON model or configuration file failed to parse.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// File being parsed.
        path: PathBuf,
        /// Parse error with line/column.
        #[source]
        source: serde_json::Error,
    },

    /// Writing a trace file or the UART output stream failed.
    #[error("writing run output failed: {0}")]
    Output(#[from] io::Error),
}

impl HarnessError {
    /// Process exit code for this error; every configuration error aborts with 1.
    pub const fn exit_code(&self) -> i32 {
        1
    }
}
