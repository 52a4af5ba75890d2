use colored::Colorize;
use std::path::PathBuf;
use std::{fmt, io};

/// Errors that can occur while loading an environment file
#[derive(Debug)]
pub enum EnvError {
    /// A file that looked like JSON could not be parsed
    Parse { path: PathBuf },
    /// The file could not be read for a reason other than not existing
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvError::Parse { path } => {
                writeln!(f, "could not parse environment file, expected json")?;
                writeln!(f, "\tFile: {}", path.display().to_string().magenta().bold())
            }
            EnvError::Io { path, source } => {
                writeln!(
                    f,
                    "{}: could not read environment file",
                    path.display().to_string().magenta().bold()
                )?;
                writeln!(f, "\tCause: {}", source)
            }
        }
    }
}

impl std::error::Error for EnvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnvError::Parse { .. } => None,
            EnvError::Io { source, .. } => Some(source),
        }
    }
}
