use serde::{Deserialize, Serialize};

/// Text selection as byte offsets into the code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorState {
    pub selection_start: usize,
    pub selection_end: usize,
}

impl CursorState {
    pub fn at(position: usize) -> Self {
        Self {
            selection_start: position,
            selection_end: position,
        }
    }

    pub fn new(selection_start: usize, selection_end: usize) -> Self {
        Self {
            selection_start,
            selection_end,
        }
    }

    /// Keeps the selection inside `text` and on character boundaries.
    pub fn clamped(self, text: &str) -> Self {
        Self {
            selection_start: clamp_offset(text, self.selection_start),
            selection_end: clamp_offset(text, self.selection_end),
        }
    }

    /// Moves the selection across an edit from `old` to `new`: offsets before the changed
    /// region stay, offsets after it move by the length delta, offsets inside it land at the
    /// end of the replacement.
    pub fn shifted(self, old: &str, new: &str) -> Self {
        let region = EditRegion::between(old, new);
        Self {
            selection_start: region.map(self.selection_start),
            selection_end: region.map(self.selection_end),
        }
        .clamped(new)
    }
}

fn clamp_offset(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// The byte range that differs between two texts, found by trimming their common prefix and
/// suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EditRegion {
    start: usize,
    old_end: usize,
    new_end: usize,
}

impl EditRegion {
    fn between(old: &str, new: &str) -> Self {
        let prefix: usize = old
            .chars()
            .zip(new.chars())
            .take_while(|(a, b)| a == b)
            .map(|(c, _)| c.len_utf8())
            .sum();
        let suffix: usize = old[prefix..]
            .chars()
            .rev()
            .zip(new[prefix..].chars().rev())
            .take_while(|(a, b)| a == b)
            .map(|(c, _)| c.len_utf8())
            .sum();

        Self {
            start: prefix,
            old_end: old.len() - suffix,
            new_end: new.len() - suffix,
        }
    }

    fn map(&self, offset: usize) -> usize {
        if offset <= self.start {
            offset
        } else if offset >= self.old_end {
            offset - self.old_end + self.new_end
        } else {
            self.new_end
        }
    }
}
