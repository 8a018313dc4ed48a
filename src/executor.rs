//! Pipeline execution: fork one process per segment, wire the pipes, close
//! the parent's copies, wait for everything.

use std::ffi::CString;
use std::fs;
use std::io;
use std::os::fd::{AsRawFd, IntoRawFd};
use std::time::Instant;

use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};

use crate::config::Limits;
use crate::error::PipelineError;
use crate::meta::PipelineResult;
use crate::parse::{self, Segment};
use crate::pipe::{self, Channel};

/// Run one command line as a pipeline and collect every child's exit status.
///
/// Phases: parse the line into segments, allocate all channels, fork one
/// unit per segment, close the parent's channel copies, then one targeted
/// wait per recorded PID. Parse and allocation errors return before anything
/// is spawned; a fork failure mid-pipeline aborts the invocation after
/// reaping the units already running.
pub fn run_pipeline(line: &str, limits: &Limits) -> Result<PipelineResult, PipelineError> {
    let start = Instant::now();

    if line.len() > limits.max_line_len {
        return Err(PipelineError::BoundsExceeded {
            what: "command line bytes",
            limit: limits.max_line_len,
        });
    }

    let segments = parse::parse_pipeline(line, limits)?;
    let argvs = c_argvs(&segments)?;
    let channels = pipe::allocate(segments.len() - 1)?;

    let mut pids: Vec<Pid> = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Parent { child }) => {
                debug!("segment {} ({}) running as pid {}", i, segment.argv[0], child);
                pids.push(child);
            }
            Ok(ForkResult::Child) => {
                exec_unit(segment, &argvs[i], i, segments.len(), &channels);
            }
            Err(errno) => {
                // Abort the invocation, not the shell. Channels must close
                // before the reap or a spawned unit could block forever
                // waiting for end-of-stream on a pipe we still hold.
                drop(channels);
                wait_all(&pids);
                return Err(PipelineError::ResourceExhausted(errno));
            }
        }
    }

    // The parent holds both ends of every channel; every one of them has
    // been inherited by now, so close them all before waiting. A reader
    // cannot see end-of-stream while we keep a write end open.
    drop(channels);

    let pipestatus = wait_all(&pids);
    Ok(PipelineResult::new(
        pipestatus,
        start.elapsed().as_millis() as u64,
    ))
}

/// Convert every segment's argv to C strings up front, so an interior NUL
/// fails the parse phase instead of a child.
fn c_argvs(segments: &[Segment]) -> Result<Vec<Vec<CString>>, PipelineError> {
    segments
        .iter()
        .map(|segment| {
            segment
                .argv
                .iter()
                .map(|arg| CString::new(arg.as_str()))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(PipelineError::from)
}

/// One targeted wait per spawned PID, statuses in segment order.
fn wait_all(pids: &[Pid]) -> Vec<i32> {
    let mut statuses = Vec::with_capacity(pids.len());
    for (i, &pid) in pids.iter().enumerate() {
        statuses.push(wait_unit(pid, i));
    }
    statuses
}

fn wait_unit(pid: Pid, index: usize) -> i32 {
    match waitpid(pid, None) {
        Ok(WaitStatus::Exited(_, code)) => {
            debug!("segment {} (pid {}) exited with {}", index, pid, code);
            code
        }
        Ok(WaitStatus::Signaled(_, signal, _)) => {
            warn!("segment {} (pid {}) killed by {:?}", index, pid, signal);
            128 + signal as i32
        }
        Ok(status) => {
            warn!("segment {} (pid {}) reported {:?}", index, pid, status);
            -1
        }
        Err(errno) => {
            warn!("wait for segment {} (pid {}) failed: {}", index, pid, errno);
            -1
        }
    }
}

/// Child side: bind stdin/stdout, close every inherited channel descriptor,
/// exec the target. Never returns; every failure path reports on the child's
/// own stderr and `_exit`s so siblings and the parent are unaffected.
fn exec_unit(
    segment: &Segment,
    argv: &[CString],
    index: usize,
    count: usize,
    channels: &[Channel],
) -> ! {
    // stdin: redirection file on the first segment, else the previous
    // channel's read end, else inherited.
    if let Some(path) = &segment.stdin_path {
        match fs::File::open(path) {
            Ok(file) => bind_stream(file.into_raw_fd(), libc::STDIN_FILENO),
            Err(e) => fail_unit(
                PipelineError::FileOpen {
                    path: path.clone(),
                    source: e,
                },
                1,
            ),
        }
    } else if index > 0 {
        bind_stream(channels[index - 1].read.as_raw_fd(), libc::STDIN_FILENO);
    }

    // stdout: redirection file on the last segment, else the next channel's
    // write end, else inherited.
    if let Some(path) = &segment.stdout_path {
        let opened = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path);
        match opened {
            Ok(file) => bind_stream(file.into_raw_fd(), libc::STDOUT_FILENO),
            Err(e) => fail_unit(
                PipelineError::FileOpen {
                    path: path.clone(),
                    source: e,
                },
                1,
            ),
        }
    } else if index + 1 < count {
        bind_stream(channels[index].write.as_raw_fd(), libc::STDOUT_FILENO);
    }

    // Close every channel end this child inherited, bound or not; the dup2
    // copies on fd 0/1 survive. One write end left open here would keep a
    // downstream reader from ever seeing end-of-stream.
    for channel in channels {
        unsafe {
            libc::close(channel.read.as_raw_fd());
            libc::close(channel.write.as_raw_fd());
        }
    }

    match unistd::execvp(&argv[0], argv) {
        Err(Errno::ENOENT) => fail_unit(PipelineError::ExecNotFound(segment.argv[0].clone()), 127),
        Err(errno) => fail_unit(
            PipelineError::ExecFailed {
                program: segment.argv[0].clone(),
                errno,
            },
            126,
        ),
        Ok(_) => unreachable!(),
    }
}

/// dup2 `fd` onto a standard stream and close the original if distinct.
fn bind_stream(fd: i32, stream: i32) {
    if unsafe { libc::dup2(fd, stream) } < 0 {
        let e = io::Error::last_os_error();
        eprintln!("pipeshell: dup2: {}", e);
        unsafe { libc::_exit(126) }
    }
    if fd != stream {
        unsafe {
            libc::close(fd);
        }
    }
}

fn fail_unit(err: PipelineError, status: i32) -> ! {
    eprintln!("pipeshell: {}", err);
    unsafe { libc::_exit(status) }
}

#[cfg(test)]
mod tests {
    //! Only the pre-spawn paths run here; process behavior is covered by the
    //! integration tests driving the binary.

    use super::*;

    #[test]
    fn test_malformed_redirection_spawns_nothing() {
        let err = run_pipeline("cat <", &Limits::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedRedirection(_)));
    }

    #[test]
    fn test_segment_bound_spawns_nothing() {
        let limits = Limits {
            max_segments: 2,
            ..Limits::default()
        };
        let err = run_pipeline("a | b | c", &limits).unwrap_err();
        assert!(matches!(err, PipelineError::BoundsExceeded { .. }));
    }

    #[test]
    fn test_overlong_line_rejected() {
        let limits = Limits {
            max_line_len: 16,
            ..Limits::default()
        };
        let err = run_pipeline("echo aaaaaaaaaaaaaaaaaaaaaaaa", &limits).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::BoundsExceeded { limit: 16, .. }
        ));
    }

    #[test]
    fn test_nul_in_argument_rejected() {
        let line = "echo a\u{0}b";
        let err = run_pipeline(line, &Limits::default()).unwrap_err();
        assert!(matches!(err, PipelineError::BadArgument(_)));
    }
}
