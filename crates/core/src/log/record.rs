//! Record assembly over the raw client log stream.
//!
//! The client log is an append-only text stream. A *record* is one
//! self-delimited block: a header line carrying a recognizable boundary
//! token, followed by a JSON payload that may span further lines. The
//! assembler is pure (lines and byte offsets in, records out) so the
//! follower stays a thin I/O loop.
//!
//! A record completes as soon as its JSON payload balances, or when the
//! next boundary line arrives, whichever comes first. Header-only records
//! (no payload) complete at the next boundary. Incomplete trailing data
//! stays buffered, which is what makes partial client writes harmless.

/// Tokens that open a new record.
pub const BOUNDARY_TOKENS: &[&str] = &["[UnityCrossThreadLogger]", "[Client GRE]"];

/// One self-delimited unit of the followed log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Byte offset of the record's first byte in the stream.
    pub offset: u64,
    /// Byte offset of the first byte after the record; the cursor value
    /// to persist once the record has been consumed.
    pub next_offset: u64,
    /// Full record text, header line included.
    pub text: String,
}

/// Returns true when a line starts a new record.
pub fn is_boundary(line: &str) -> bool {
    BOUNDARY_TOKENS.iter().any(|token| line.starts_with(token))
}

/// Incremental, offset-accurate record assembler.
#[derive(Debug, Default)]
pub struct RecordAssembler {
    pending: Option<Pending>,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one complete line (terminator stripped) with its byte offset
    /// and the offset of the byte after its terminator. Returns records
    /// completed by this line, in stream order.
    pub fn push_line(&mut self, offset: u64, line: &str, next_offset: u64) -> Vec<RawRecord> {
        let mut completed = Vec::new();

        if is_boundary(line) {
            // A new header closes whatever came before it, balanced or not.
            if let Some(pending) = self.pending.take() {
                completed.push(pending.into_record());
            }
            let mut pending = Pending::new(offset, line, next_offset);
            if pending.balance.complete {
                completed.push(pending.into_record());
            } else {
                self.pending = Some(pending);
            }
        } else if let Some(pending) = self.pending.as_mut() {
            pending.append(line, next_offset);
            if pending.balance.complete {
                if let Some(pending) = self.pending.take() {
                    completed.push(pending.into_record());
                }
            }
        }
        // Lines before the first boundary are preamble; dropped.

        completed
    }

    /// Discard buffered state (stream truncation / rotation).
    pub fn reset(&mut self) {
        self.pending = None;
    }

    /// Offset of the record currently being assembled, if any.
    pub fn pending_offset(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.offset)
    }
}

#[derive(Debug)]
struct Pending {
    offset: u64,
    end_offset: u64,
    text: String,
    balance: JsonBalance,
}

impl Pending {
    fn new(offset: u64, line: &str, next_offset: u64) -> Self {
        let mut balance = JsonBalance::default();
        balance.feed(line);
        Self {
            offset,
            end_offset: next_offset,
            text: line.to_string(),
            balance,
        }
    }

    fn append(&mut self, line: &str, next_offset: u64) {
        self.text.push('\n');
        self.text.push_str(line);
        self.end_offset = next_offset;
        self.balance.feed(line);
    }

    fn into_record(self) -> RawRecord {
        RawRecord {
            offset: self.offset,
            next_offset: self.end_offset,
            text: self.text,
        }
    }
}

/// Tracks whether a record's JSON payload has closed.
///
/// The payload starts at the first `{` after the header prefix; bracket
/// characters inside JSON strings are ignored. Header text before the
/// payload (the boundary token itself contains `[`/`]`) is skipped
/// because counting only begins once the first `{` is seen.
#[derive(Debug, Default)]
struct JsonBalance {
    started: bool,
    complete: bool,
    depth: u32,
    in_string: bool,
    escaped: bool,
}

impl JsonBalance {
    fn feed(&mut self, text: &str) {
        for c in text.chars() {
            if self.complete {
                return;
            }
            if !self.started {
                if c == '{' {
                    self.started = true;
                    self.depth = 1;
                }
                continue;
            }
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == '"' {
                    self.in_string = false;
                }
                continue;
            }
            match c {
                '"' => self.in_string = true,
                '{' | '[' => self.depth += 1,
                '}' | ']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        self.complete = true;
                    }
                }
                _ => {}
            }
        }
    }
}
