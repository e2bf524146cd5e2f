//! Loop state visible outside the orchestrator: the shutdown flag and the
//! per-frame status line.

use std::fmt;

// ---------------------------------------------------------------------------
// ShutdownFlag
// ---------------------------------------------------------------------------

/// Set once, when the operator asks the loop to end cleanly.
///
/// Distinguishes a clean shutdown (exit code 0) from any other way the loop
/// can end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownFlag(bool);

impl ShutdownFlag {
    /// Raise the flag.  Returns `true` only on the first call.
    pub fn set(&mut self) -> bool {
        !std::mem::replace(&mut self.0, true)
    }

    pub fn is_set(&self) -> bool {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// What the operator sees after each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub fps: f64,
    pub example_count: usize,
    pub class_name: String,
}

impl Status {
    /// The status as the SVG document drawn by the preview overlay.
    ///
    /// ```
    /// use teachable_machine::machine::Status;
    ///
    /// let status = Status { fps: 12.0, example_count: 3, class_name: "Red".into() };
    /// assert!(status.to_svg().contains(">fps 12.0; #examples: 3; Class     Red<"));
    /// ```
    pub fn to_svg(&self) -> String {
        format!(
            "<svg height='320' width='200'><text x='25' y='25' fill='white'>{}</text></svg>",
            escape_xml(&self.to_string())
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fps {:.1}; #examples: {}; Class {:>7}",
            self.fps, self.example_count, self.class_name
        )
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
