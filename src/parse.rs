//! Line parsing: segment splitting, argument tokenization, redirection
//! scanning. Everything here produces owned strings; nothing downstream
//! borrows from the input line.

use crate::config::Limits;
use crate::error::PipelineError;

const PIPE_DELIMS: &[char] = &['|'];
const SPACE_DELIMS: &[char] = &[' ', '\t'];

/// One program invocation within a pipeline: the argument vector (first
/// token is the program name) plus the redirection targets scanned out of
/// it. The argv never contains redirection syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub argv: Vec<String>,
    pub stdin_path: Option<String>,
    pub stdout_path: Option<String>,
}

/// Split `input` on any run of `delims`, discarding empty pieces. The shared
/// splitting stage: called once with the pipe delimiter and once per segment
/// with whitespace. Producing more than `limit` tokens is an error, not a
/// truncation.
pub fn split_tokens(
    input: &str,
    delims: &[char],
    limit: usize,
    what: &'static str,
) -> Result<Vec<String>, PipelineError> {
    let mut tokens = Vec::new();
    for piece in input.split(|c| delims.contains(&c)) {
        if piece.is_empty() {
            continue;
        }
        if tokens.len() == limit {
            return Err(PipelineError::BoundsExceeded { what, limit });
        }
        tokens.push(piece.to_string());
    }
    Ok(tokens)
}

/// Scan a segment's tokens left to right, pulling out `<`/`>` targets and
/// leaving a clean argv. The first occurrence of each operator wins; later
/// duplicates are stripped and their paths ignored. An operator as the last
/// token has no path to consume and fails the parse.
fn scan_redirections(tokens: Vec<String>) -> Result<Segment, PipelineError> {
    let mut argv = Vec::with_capacity(tokens.len());
    let mut stdin_path = None;
    let mut stdout_path = None;

    let mut tokens = tokens.into_iter();
    while let Some(token) = tokens.next() {
        match token.as_str() {
            "<" => {
                let path = tokens.next().ok_or_else(|| {
                    PipelineError::MalformedRedirection("'<' with no input file".to_string())
                })?;
                if stdin_path.is_none() {
                    stdin_path = Some(path);
                }
            }
            ">" => {
                let path = tokens.next().ok_or_else(|| {
                    PipelineError::MalformedRedirection("'>' with no output file".to_string())
                })?;
                if stdout_path.is_none() {
                    stdout_path = Some(path);
                }
            }
            _ => argv.push(token),
        }
    }

    if argv.is_empty() {
        return Err(PipelineError::EmptyCommand);
    }
    Ok(Segment {
        argv,
        stdin_path,
        stdout_path,
    })
}

/// Parse one command line into pipeline segments.
///
/// Redirection placement is checked here: input redirection is only valid on
/// the first segment, output redirection only on the last. Anywhere else it
/// would silently fight the pipe binding, so it fails the parse instead.
pub fn parse_pipeline(line: &str, limits: &Limits) -> Result<Vec<Segment>, PipelineError> {
    let raw_segments = split_tokens(line, PIPE_DELIMS, limits.max_segments, "pipeline segments")?;
    if raw_segments.is_empty() {
        return Err(PipelineError::EmptyCommand);
    }

    let last = raw_segments.len() - 1;
    let mut segments = Vec::with_capacity(raw_segments.len());
    for (i, raw) in raw_segments.iter().enumerate() {
        let tokens = split_tokens(raw, SPACE_DELIMS, limits.max_args, "arguments")?;
        let segment = scan_redirections(tokens)?;
        if i > 0 && segment.stdin_path.is_some() {
            return Err(PipelineError::MalformedRedirection(
                "input redirection is only valid on the first segment".to_string(),
            ));
        }
        if i < last && segment.stdout_path.is_some() {
            return Err(PipelineError::MalformedRedirection(
                "output redirection is only valid on the last segment".to_string(),
            ));
        }
        segments.push(segment);
    }
    Ok(segments)
}
