/// Lexical position while walking statement text. Placeholders only count in `Normal`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
}

/// Returns the end index and digits of an ASCII digit run starting at `start`.
pub(super) fn scan_digits(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == start {
        None
    } else {
        std::str::from_utf8(&bytes[start..idx])
            .ok()
            .map(|digits| (idx, digits))
    }
}

pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

impl State {
    /// Advance past the byte at `idx`, returning the next state and how many extra bytes
    /// were consumed (escaped quotes and two-byte comment markers).
    pub(super) fn step(self, bytes: &[u8], idx: usize) -> (State, usize) {
        let b = bytes[idx];
        match self {
            State::Normal => match b {
                b'\'' => (State::SingleQuoted, 0),
                b'"' => (State::DoubleQuoted, 0),
                _ if is_line_comment_start(bytes, idx) => (State::LineComment, 1),
                _ if is_block_comment_start(bytes, idx) => (State::BlockComment(1), 1),
                _ => (State::Normal, 0),
            },
            State::SingleQuoted => match b {
                b'\'' if bytes.get(idx + 1) == Some(&b'\'') => (State::SingleQuoted, 1),
                b'\'' => (State::Normal, 0),
                _ => (State::SingleQuoted, 0),
            },
            State::DoubleQuoted => match b {
                b'"' if bytes.get(idx + 1) == Some(&b'"') => (State::DoubleQuoted, 1),
                b'"' => (State::Normal, 0),
                _ => (State::DoubleQuoted, 0),
            },
            State::LineComment => {
                if b == b'\n' {
                    (State::Normal, 0)
                } else {
                    (State::LineComment, 0)
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    (State::BlockComment(depth + 1), 1)
                } else if is_block_comment_end(bytes, idx) {
                    if depth == 1 {
                        (State::Normal, 1)
                    } else {
                        (State::BlockComment(depth - 1), 1)
                    }
                } else {
                    (State::BlockComment(depth), 0)
                }
            }
        }
    }
}
