//! Colored diagnostic output.
//!
//! Uses `termcolor` for cross-platform colored terminal output.
//! Respects `NO_COLOR` environment variable and `--color` flag.

use sbcc_engine::{Error, Span};
use std::io::Write;
use std::path::Path;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled writer for diagnostics on stderr.
pub struct StyledOutput {
    stderr: StandardStream,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stderr: StandardStream::stderr(choice),
        }
    }

    /// `error: <location>: <message>` with the prefix in red bold.
    pub fn error_line(&mut self, location: Option<String>, message: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Red)).set_bold(true);
        let _ = self.stderr.set_color(&spec);
        let _ = write!(self.stderr, "error");
        let _ = self.stderr.reset();
        let _ = write!(self.stderr, ": ");
        if let Some(location) = location {
            let _ = write!(self.stderr, "{}: ", location);
        }
        let _ = writeln!(self.stderr, "{}", message);
    }

    /// Every diagnostic of a failed compilation, then a summary line.
    pub fn diagnostics(&mut self, path: &Path, err: &Error) {
        for (span, message) in err.diagnostics() {
            self.error_line(span.map(|s| location(path, &s)), &message);
        }
        if matches!(err, Error::Lex(_) | Error::Parse(_) | Error::Check(_)) {
            self.error_line(None, &format!("could not compile {}: {}", path.display(), err));
        }
    }
}

fn location(path: &Path, span: &Span) -> String {
    format!("{}:{}:{}", path.display(), span.line, span.column)
}
