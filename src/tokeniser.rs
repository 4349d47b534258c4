/// Splits material definition source into tokens: runs of non-whitespace
/// characters, with `{` and `}` always standing alone and double-quoted
/// strings yielding their contents. Line (`//`) and block (`/* */`)
/// comments are skipped.
pub struct DefTokeniser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> DefTokeniser<'a> {
    pub fn new(src: &'a str) -> DefTokeniser<'a> {
        DefTokeniser { src, pos: 0 }
    }

    fn skip_whitespace_and_comments(&mut self) {
        let bytes = self.src.as_bytes();
        loop {
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos + 1 < bytes.len() && bytes[self.pos] == b'/' {
                match bytes[self.pos + 1] {
                    b'/' => {
                        while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                            self.pos += 1;
                        }
                        continue;
                    }
                    b'*' => {
                        self.pos += 2;
                        while self.pos + 1 < bytes.len()
                            && !(bytes[self.pos] == b'*' && bytes[self.pos + 1] == b'/')
                        {
                            self.pos += 1;
                        }
                        // An unterminated block comment swallows the rest.
                        self.pos = (self.pos + 2).min(bytes.len());
                        continue;
                    }
                    _ => {}
                }
            }
            break;
        }
    }
}

impl<'a> Iterator for DefTokeniser<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.skip_whitespace_and_comments();

        let bytes = self.src.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }

        match bytes[self.pos] {
            b'{' | b'}' => {
                let token = &self.src[self.pos..self.pos + 1];
                self.pos += 1;
                Some(token)
            }
            b'"' => {
                let start = self.pos + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end] != b'"' {
                    end += 1;
                }
                // Unterminated strings take everything to end of input.
                self.pos = (end + 1).min(bytes.len());
                Some(&self.src[start..end])
            }
            _ => {
                let start = self.pos;
                let mut end = start;
                while end < bytes.len()
                    && !bytes[end].is_ascii_whitespace()
                    && bytes[end] != b'{'
                    && bytes[end] != b'}'
                    && bytes[end] != b'"'
                {
                    end += 1;
                }
                self.pos = end;
                Some(&self.src[start..end])
            }
        }
    }
}
