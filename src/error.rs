use std::{error, ffi, fmt, io};

/// Everything that can go wrong between reading a line and reaping the last
/// child. Parse-time variants abort the invocation before any process is
/// spawned; `FileOpen`, `ExecNotFound` and `ExecFailed` are reported by the
/// failing child on its own stderr and never reach the parent as errors.
#[derive(Debug)]
pub enum PipelineError {
    /// More segments/arguments than the configured limit, or the line is too
    /// long.
    BoundsExceeded { what: &'static str, limit: usize },
    /// A redirection operator with no path, or a redirection on a segment
    /// position where it cannot apply.
    MalformedRedirection(String),
    /// A segment with no tokens left once redirections are stripped.
    EmptyCommand,
    /// An argument with an interior NUL byte cannot be passed to exec.
    BadArgument(ffi::NulError),
    /// Pipe or process creation failed at the OS level.
    ResourceExhausted(nix::Error),
    /// A redirection target could not be opened (child-side).
    FileOpen { path: String, source: io::Error },
    /// The target program does not exist on PATH (child-side).
    ExecNotFound(String),
    /// exec failed for a reason other than ENOENT (child-side).
    ExecFailed { program: String, errno: nix::Error },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::BoundsExceeded { what, limit } => {
                write!(f, "too many {} (limit {})", what, limit)
            }
            PipelineError::MalformedRedirection(reason) => {
                write!(f, "malformed redirection: {}", reason)
            }
            PipelineError::EmptyCommand => write!(f, "empty command"),
            PipelineError::BadArgument(e) => write!(f, "bad argument: {}", e),
            PipelineError::ResourceExhausted(e) => write!(f, "resource exhausted: {}", e),
            PipelineError::FileOpen { path, source } => write!(f, "{}: {}", path, source),
            PipelineError::ExecNotFound(program) => write!(f, "command not found: {}", program),
            PipelineError::ExecFailed { program, errno } => write!(f, "{}: {}", program, errno),
        }
    }
}

impl error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            PipelineError::BadArgument(e) => Some(e),
            PipelineError::ResourceExhausted(e) => Some(e),
            PipelineError::FileOpen { source, .. } => Some(source),
            PipelineError::ExecFailed { errno, .. } => Some(errno),
            _ => None,
        }
    }
}

impl From<ffi::NulError> for PipelineError {
    fn from(e: ffi::NulError) -> PipelineError {
        PipelineError::BadArgument(e)
    }
}

impl From<nix::Error> for PipelineError {
    fn from(e: nix::Error) -> PipelineError {
        PipelineError::ResourceExhausted(e)
    }
}
