//! Copy text to the system clipboard through an external helper program.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// Helper programs tried in order, with their arguments.
const CLIPBOARD_PROGRAMS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip.exe", &[]),
];

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("no clipboard program found (tried pbcopy, wl-copy, xclip, xsel, clip.exe)")]
    NoProgram,

    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },
}

/// Locate the first clipboard program available on `PATH`.
pub fn find_program() -> Option<(PathBuf, &'static [&'static str])> {
    CLIPBOARD_PROGRAMS
        .iter()
        .find_map(|(name, args)| which::which(name).ok().map(|path| (path, *args)))
}

/// Pipe `text` into the clipboard program.
pub fn copy(text: &str) -> Result<(), ClipboardError> {
    let (program, args) = find_program().ok_or(ClipboardError::NoProgram)?;
    copy_with(&program, args, text)
}

fn copy_with(program: &PathBuf, args: &[&str], text: &str) -> Result<(), ClipboardError> {
    let name = program.display().to_string();
    debug!(program = %name, "Copying to clipboard");

    let io_error = |source| ClipboardError::Io {
        program: name.clone(),
        source,
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(io_error)?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(source) = stdin.write_all(text.as_bytes()) {
            drop(stdin);
            // Reap the helper before reporting the failed write
            let _ = child.kill();
            let _ = child.wait();
            return Err(io_error(source));
        }
    }

    let status = child.wait().map_err(io_error)?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::Failed {
            program: name,
            status: status.to_string(),
        })
    }
}
