//! Resynchronization after a fault.
//!
//! The parser tells the [`Recovery`] controller what it expects next; when a
//! fault is reported the controller picks where parsing resumes. Every
//! recovery point is at or after the offset it starts from, so the parse
//! always makes forward progress.

#[cfg(test)]
#[path = "./recovery_tests.rs"]
mod tests;

/// Arrays and inline tables nested deeper than this are skipped.
pub(crate) const MAX_NESTING: u32 = 128;

/// What the parser expects at the cursor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum State {
    ReadyForKey,
    ExpectEquals,
    ExpectValue,
    ReadyForHeader,
}

/// Which boundary a fault skips to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Scope {
    /// The end of the current line.
    Line,
    /// Past the next `]` or `]]` on the current line.
    Header,
    /// The next `,`, `]` or `}` at the current nesting depth.
    Nested,
}

/// Offset at which parsing resumes after a fault at or before `from`.
pub(crate) fn recovery_point(bytes: &[u8], from: usize, scope: Scope) -> usize {
    let len = bytes.len();
    let mut i = from.min(len);
    match scope {
        Scope::Line => {
            while i < len && bytes[i] != b'\n' {
                i += 1;
            }
            if i < len && i > from && bytes[i - 1] == b'\r' {
                i - 1
            } else {
                i
            }
        }
        Scope::Header => {
            while i < len && bytes[i] != b'\n' {
                match bytes[i] {
                    b']' => {
                        i += 1;
                        if bytes.get(i) == Some(&b']') {
                            i += 1;
                        }
                        return i;
                    }
                    b'"' | b'\'' => i = skip_quoted(bytes, i),
                    _ => i += 1,
                }
            }
            if i < len && i > from && bytes[i - 1] == b'\r' {
                i - 1
            } else {
                i
            }
        }
        Scope::Nested => {
            let mut depth = 0u32;
            while i < len {
                match bytes[i] {
                    b'[' | b'{' => depth += 1,
                    b']' | b'}' => {
                        if depth == 0 {
                            return i;
                        }
                        depth -= 1;
                    }
                    b',' if depth == 0 => return i,
                    b'"' | b'\'' => {
                        i = skip_quoted(bytes, i);
                        continue;
                    }
                    b'#' => {
                        while i < len && bytes[i] != b'\n' {
                            i += 1;
                        }
                        continue;
                    }
                    _ => {}
                }
                i += 1;
            }
            len
        }
    }
}

/// Offset just past the string starting at `start`. Single-line strings stop
/// at the end of their line when unterminated; multi-line strings at EOF.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let len = bytes.len();
    let delim = bytes[start];
    let basic = delim == b'"';
    if bytes.get(start + 1) == Some(&delim) && bytes.get(start + 2) == Some(&delim) {
        let mut i = start + 3;
        while i < len {
            if basic && bytes[i] == b'\\' {
                i += 2;
                continue;
            }
            if bytes[i..].starts_with(&[delim, delim, delim]) {
                return i + 3;
            }
            i += 1;
        }
        return len;
    }
    let mut i = start + 1;
    while i < len && bytes[i] != b'\n' {
        if basic && bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == delim {
            return i + 1;
        }
        i += 1;
    }
    i.min(len)
}

/// The recovery state machine.
pub(crate) struct Recovery {
    state: State,
    depth: u32,
}

impl Recovery {
    pub(crate) fn new() -> Self {
        Recovery {
            state: State::ReadyForKey,
            depth: 0,
        }
    }

    pub(crate) fn state(&self) -> State {
        self.state
    }

    pub(crate) fn enter(&mut self, state: State) {
        self.state = state;
    }

    /// Enters an array or inline table. Returns `false`, without entering,
    /// once [`MAX_NESTING`] is reached.
    pub(crate) fn open(&mut self) -> bool {
        if self.depth >= MAX_NESTING {
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn depth(&self) -> u32 {
        self.depth
    }

    /// Where a fault in the current state skips to.
    pub(crate) fn scope(&self) -> Scope {
        if self.depth > 0 {
            Scope::Nested
        } else if self.state == State::ReadyForHeader {
            Scope::Header
        } else {
            Scope::Line
        }
    }

    /// Returns the offset to resume from and falls back to `ReadyForKey`.
    pub(crate) fn resync(&mut self, bytes: &[u8], from: usize) -> usize {
        let scope = self.scope();
        let to = recovery_point(bytes, from, scope);
        tracing::trace!(state = ?self.state, ?scope, from, to, "resynchronized");
        self.state = State::ReadyForKey;
        to
    }
}
