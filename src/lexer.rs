//! Lexical analysis of one input line into argument tokens.
//!
//! Quoting and escaping are resolved here; the resulting tokens are plain
//! strings that carry no trace of how they were quoted.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Unquoted,
    SingleQuoted,
    DoubleQuoted,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
    // Set once anything (even an empty quoted span) starts a token,
    // so that `''` still yields a zero-length token.
    in_word: bool,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Unquoted,
            buffer: String::new(),
            in_word: false,
        }
    }

    /// Runs the machine over the whole input in a single forward pass.
    ///
    /// An unterminated quote is not an error: the token is closed with
    /// whatever was accumulated when the input ran out.
    fn make_tokens(&mut self) -> Vec<String> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Unquoted => self.handle_unquoted(ch, &mut out),
                LexingState::SingleQuoted => self.handle_single_quote(ch),
                LexingState::DoubleQuoted => self.handle_double_quote(ch),
            }
        }

        if self.state != LexingState::Unquoted {
            log::debug!("unterminated quote ({:?}), closing token", self.state);
        }
        self.finish_word(&mut out);

        out
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn push(&mut self, ch: char) {
        self.buffer.push(ch);
        self.in_word = true;
    }

    fn open(&mut self, state: LexingState) {
        self.state = state;
        self.in_word = true;
    }

    fn finish_word(&mut self, out: &mut Vec<String>) {
        if self.in_word {
            out.push(std::mem::take(&mut self.buffer));
            self.in_word = false;
        }
    }

    fn handle_unquoted(&mut self, ch: char, out: &mut Vec<String>) {
        match ch {
            ' ' | '\t' => self.finish_word(out),
            '\'' => self.open(LexingState::SingleQuoted),
            '"' => self.open(LexingState::DoubleQuoted),
            // A trailing backslash has nothing to escape and is dropped.
            '\\' => {
                if let Some(next) = self.read_char() {
                    self.push(next);
                }
            }
            c => self.push(c),
        }
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::Unquoted,
            c => self.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::Unquoted,
            '\\' => match self.peek_char() {
                Some(c @ ('"' | '\\' | '$')) => {
                    self.read_char();
                    self.push(c);
                }
                _ => self.push('\\'),
            },
            c => self.push(c),
        }
    }
}

/// Splits `line` into argument tokens, honouring quotes and backslash escapes.
///
/// Empty or whitespace-only input yields no tokens.
pub fn split_into_tokens(line: &str) -> Vec<String> {
    let mut lexer = LexingFSM::new(line);
    let tokens = lexer.make_tokens();
    log::debug!("tokens: {:?}", tokens);
    tokens
}
