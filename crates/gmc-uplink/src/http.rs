use heapless::Vec;

/// Incremental HTTP status-line scanner.
///
/// Reads response bytes line by line: CR is ignored, LF terminates a line.
/// The first line starting with the literal `HTTP/` yields the status code as
/// the integer following the first space. Anything else keeps scanning; the
/// caller's deadline decides when to give up (reported as code 0).
pub struct StatusLineParser {
    line: Vec<u8, 128>,
}

impl StatusLineParser {
    pub fn new() -> Self {
        Self { line: Vec::new() }
    }

    /// Feed a chunk. Returns `Some(code)` once the status line is complete.
    pub fn feed(&mut self, chunk: &[u8]) -> Option<u16> {
        for &byte in chunk {
            match byte {
                b'\r' => {}
                b'\n' => {
                    if self.line.starts_with(b"HTTP/") {
                        return Some(parse_code(&self.line));
                    }
                    self.line.clear();
                }
                // Oversize lines lose their tail; the prefix and the code
                // token sit well inside the buffer.
                _ => {
                    let _ = self.line.push(byte);
                }
            }
        }
        None
    }
}

impl Default for StatusLineParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_code(line: &[u8]) -> u16 {
    let mut tokens = line.split(|&b| b == b' ');
    tokens.next(); // the HTTP/x.y token
    let code_token = match tokens.next() {
        Some(t) => t,
        None => return 0,
    };

    let mut code: u16 = 0;
    let mut seen_digit = false;
    for &b in code_token {
        if b.is_ascii_digit() {
            seen_digit = true;
            code = code.saturating_mul(10).saturating_add((b - b'0') as u16);
        } else {
            break;
        }
    }
    if seen_digit {
        code
    } else {
        0
    }
}
