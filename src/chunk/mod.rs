//! Character-budget chunking of loaded contents

use crate::domain::{LoadedContent, SplitPolicy};

/// Split loaded contents into consecutive pieces of at most `max_chars`
/// characters.
///
/// Contents are taken in the order given. Joining the output always
/// reproduces the concatenation of the input texts exactly; no separators are
/// added. Empty input yields no chunks. A `max_chars` of 0 is treated as 1.
pub fn assemble(contents: &[LoadedContent], max_chars: usize, policy: SplitPolicy) -> Vec<String> {
    let max_chars = max_chars.max(1);
    match policy {
        SplitPolicy::CharSlice => {
            let mut chunker = Slicer::new(max_chars);
            for content in contents {
                chunker.push_sliced(&content.text);
            }
            chunker.finish()
        }
        SplitPolicy::FileBoundary => {
            let mut chunker = Slicer::new(max_chars);
            for content in contents {
                let len = content.text.chars().count();
                if len == 0 {
                    continue;
                }
                if len > max_chars {
                    // Oversized file: close the open chunk, slice the file on its own
                    chunker.seal();
                    chunker.push_sliced(&content.text);
                    chunker.seal();
                } else {
                    if chunker.current_len + len > max_chars {
                        chunker.seal();
                    }
                    chunker.push_whole(&content.text, len);
                }
            }
            chunker.finish()
        }
    }
}

struct Slicer {
    max_chars: usize,
    chunks: Vec<String>,
    current: String,
    current_len: usize,
}

impl Slicer {
    fn new(max_chars: usize) -> Self {
        Self { max_chars, chunks: Vec::new(), current: String::new(), current_len: 0 }
    }

    /// Append text, cutting wherever the budget runs out.
    fn push_sliced(&mut self, text: &str) {
        let mut rest = text;
        while !rest.is_empty() {
            let room = self.max_chars - self.current_len;
            let cut = rest.char_indices().nth(room).map(|(idx, _)| idx).unwrap_or(rest.len());
            let (head, tail) = rest.split_at(cut);
            self.current_len += head.chars().count();
            self.current.push_str(head);
            rest = tail;
            if self.current_len == self.max_chars {
                self.seal();
            }
        }
    }

    fn push_whole(&mut self, text: &str, len: usize) {
        self.current.push_str(text);
        self.current_len += len;
    }

    fn seal(&mut self) {
        if self.current.is_empty() {
            return;
        }
        self.chunks.push(std::mem::take(&mut self.current));
        self.current_len = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.seal();
        self.chunks
    }
}
