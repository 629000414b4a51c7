use thiserror::Error;

#[derive(Error, Debug)]
pub enum SandboxError {
    /// The execution environment could not be set up (temp file, spawn).
    #[error("sandbox initialization failed: {0}")]
    Initialization(String),

    /// I/O failure while driving an already-running guest process.
    #[error("sandbox execution error: {0}")]
    Execution(String),

    /// The guest exceeded its wall-clock budget and was killed.
    #[error("wall-clock limit of {0} ms exceeded")]
    Timeout(u64),
}
