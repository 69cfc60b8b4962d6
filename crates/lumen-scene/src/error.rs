use thiserror::Error;

/// Failure of a render job.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render job was cancelled")]
    Cancelled,

    #[error("{mode} requires a bake target, but none was set")]
    MissingBakeTarget { mode: String },

    #[error("renderer failed: {0}")]
    Renderer(String),

    #[error("render worker panicked")]
    WorkerPanicked,

    #[error("failed to spawn render worker: {0}")]
    Spawn(#[from] std::io::Error),
}
