//! Channel allocation: one pipe per adjacent segment pair.

use std::os::fd::OwnedFd;

use nix::unistd;

use crate::error::PipelineError;

/// An anonymous unidirectional byte stream between two sequential segments.
/// `write` is fed by segment i, `read` feeds segment i+1. Both ends close on
/// drop, which is what lets the parent release its copies by dropping the
/// whole vector after the last fork.
#[derive(Debug)]
pub struct Channel {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

/// Allocate `count` channels up front, before any fork, so every child can
/// see every channel it might need to inherit. If pipe creation fails
/// mid-loop, the pairs already allocated are closed (vector drop) before the
/// error propagates.
pub fn allocate(count: usize) -> Result<Vec<Channel>, PipelineError> {
    let mut channels = Vec::with_capacity(count);
    for _ in 0..count {
        let (read, write) = unistd::pipe()?;
        channels.push(Channel { read, write });
    }
    Ok(channels)
}
