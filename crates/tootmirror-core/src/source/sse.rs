//! Minimal server-sent events reader
//!
//! Handles the subset the Mastodon streaming API uses: `event:` and `data:`
//! fields, multi-line data, and `:` comment lines used as heartbeats.

use std::io::{self, BufRead};

/// One frame read from an event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// A dispatched event
    Message { event: Option<String>, data: String },
    /// A comment line, sent by servers as a keep-alive
    Comment(String),
}

/// Iterator over the frames of an event stream
#[derive(Debug)]
pub struct SseReader<R> {
    reader: R,
    finished: bool,
}

impl<R: BufRead> SseReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for SseReader<R> {
    type Item = io::Result<SseFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut event: Option<String> = None;
        let mut data: Vec<String> = Vec::new();
        let mut line = String::new();

        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    // A partial event at end of stream is discarded
                    self.finished = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }

            let line = line.trim_end_matches(['\r', '\n']);

            if line.is_empty() {
                if event.is_none() && data.is_empty() {
                    continue;
                }
                return Some(Ok(SseFrame::Message {
                    event,
                    data: data.join("\n"),
                }));
            }

            if let Some(comment) = line.strip_prefix(':') {
                if event.is_none() && data.is_empty() {
                    return Some(Ok(SseFrame::Comment(comment.trim().to_string())));
                }
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            match field {
                "event" => event = Some(value.to_string()),
                "data" => data.push(value.to_string()),
                _ => {}
            }
        }
    }
}
