//! Terminal styling for propagation output
//!
//! Semantic styles via the [`Stylize`] trait. Color support detection is
//! delegated to `owo-colors`, so `NO_COLOR`, `CLICOLOR`, `CLICOLOR_FORCE` and
//! TTY detection are all respected.
//!
//! | Method       | Color  | Stream | Used for                         |
//! |--------------|--------|--------|----------------------------------|
//! | `.accent()`  | Cyan   | stdout | Chapter names, PR numbers        |
//! | `.success()` | Green  | stdout | Published chapters               |
//! | `.error()`   | Red    | stderr | Fatal errors                     |
//! | `.warn()`    | Yellow | stderr | Conflicts, halted runs           |
//! | `.muted()`   | Dim    | stdout | Skipped chapters, hints          |
//! | `.emphasis()`| Bold   | stdout | Phase headers                    |

use indicatif::ProgressStyle;
use std::fmt::{self, Display};
use std::sync::OnceLock;

pub use owo_colors::Stream;
use owo_colors::{OwoColorize, Style};

const ACCENT: Style = Style::new().cyan();
const SUCCESS: Style = Style::new().green();
const ERROR: Style = Style::new().red();
const WARN: Style = Style::new().yellow();
const MUTED: Style = Style::new().dimmed();
const EMPHASIS: Style = Style::new().bold();

/// A value with a semantic style attached
#[derive(Clone, Debug)]
pub struct Styled<T> {
    value: T,
    style: Style,
    stream: Stream,
}

impl<T> Styled<T> {
    const fn new(value: T, style: Style, stream: Stream) -> Self {
        Self {
            value,
            style,
            stream,
        }
    }

    /// Detect color support against stdout instead of the style's default
    #[must_use]
    pub const fn for_stdout(mut self) -> Self {
        self.stream = Stream::Stdout;
        self
    }

    /// Detect color support against stderr instead of the style's default
    #[must_use]
    pub const fn for_stderr(mut self) -> Self {
        self.stream = Stream::Stderr;
        self
    }
}

impl<T: Display> Display for Styled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.value
                .if_supports_color(self.stream, |v| v.style(self.style))
        )
    }
}

/// Extension trait for semantic terminal styling
///
/// Implemented for every [`Display`] type; methods borrow the value.
pub trait Stylize: Display {
    /// Cyan, for chapter names and PR numbers
    fn accent(&self) -> Styled<&Self> {
        Styled::new(self, ACCENT, Stream::Stdout)
    }

    /// Green, for published chapters
    fn success(&self) -> Styled<&Self> {
        Styled::new(self, SUCCESS, Stream::Stdout)
    }

    /// Red, rendered for stderr
    fn error(&self) -> Styled<&Self> {
        Styled::new(self, ERROR, Stream::Stderr)
    }

    /// Yellow, rendered for stderr
    fn warn(&self) -> Styled<&Self> {
        Styled::new(self, WARN, Stream::Stderr)
    }

    /// Dim, for secondary information
    fn muted(&self) -> Styled<&Self> {
        Styled::new(self, MUTED, Stream::Stdout)
    }

    /// Bold, for headers
    fn emphasis(&self) -> Styled<&Self> {
        Styled::new(self, EMPHASIS, Stream::Stdout)
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Chapter published
pub const CHECK: &str = "✓";

/// Chapter conflicted or failed
pub const CROSS: &str = "✗";

/// Chapter left alone
pub const DASH: &str = "-";

/// Chapter never reached
pub const BULLET: &str = "○";

/// Green checkmark
#[inline]
pub const fn check() -> Styled<&'static str> {
    Styled::new(CHECK, SUCCESS, Stream::Stdout)
}

/// Red cross, rendered for stdout since it marks a step line
#[inline]
pub const fn cross() -> Styled<&'static str> {
    Styled::new(CROSS, ERROR, Stream::Stdout)
}

/// Dimmed dash
#[inline]
pub const fn dash() -> Styled<&'static str> {
    Styled::new(DASH, MUTED, Stream::Stdout)
}

/// Dimmed bullet
#[inline]
pub const fn bullet() -> Styled<&'static str> {
    Styled::new(BULLET, MUTED, Stream::Stdout)
}

const fn to_hyperlink_stream(stream: Stream) -> supports_hyperlinks::Stream {
    match stream {
        Stream::Stdout => supports_hyperlinks::Stream::Stdout,
        Stream::Stderr => supports_hyperlinks::Stream::Stderr,
    }
}

/// Clickable OSC 8 link showing the URL itself
///
/// Plain URL text when the terminal has no hyperlink support.
pub fn hyperlink_url(stream: Stream, url: &str) -> String {
    if supports_hyperlinks::on(to_hyperlink_stream(stream)) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}

/// Spinner shown while a chapter is being worked on
pub fn spinner_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("hardcoded spinner template is valid")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        })
        .clone()
}
