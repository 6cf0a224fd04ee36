/// Tracks the current element index of every open array, innermost last.
///
/// A counter starts at -1 when its array opens and is advanced as each
/// element begins, so the first element reads 0.
#[derive(Debug, Default, Clone)]
pub struct ArrayIndexStack {
    counters: Vec<i64>,
}

impl ArrayIndexStack {
    pub fn new() -> Self {
        ArrayIndexStack::default()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Number of arrays currently open
    pub fn depth(&self) -> usize {
        self.counters.len()
    }

    pub fn push(&mut self) {
        self.counters.push(-1);
    }

    pub fn pop(&mut self) -> Option<i64> {
        self.counters.pop()
    }

    pub fn top(&self) -> Option<i64> {
        self.counters.last().copied()
    }

    /// Advance the innermost counter; no-op when no array is open
    pub fn advance(&mut self) {
        if let Some(top) = self.counters.last_mut() {
            *top += 1;
        }
    }
}
