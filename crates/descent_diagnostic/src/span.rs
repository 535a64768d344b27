/// A half-open byte range into a source string.
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn empty(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    #[must_use]
    pub fn union(self, other: Span) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::Span;

    #[test]
    fn union_covers_both() {
        assert_eq!(Span::new(4, 5).union(Span::new(0, 1)), Span::new(0, 5));
        assert_eq!(Span::new(2, 9).union(Span::new(3, 4)), Span::new(2, 9));
    }

    #[test]
    fn empty_span() {
        assert!(Span::empty(3).is_empty());
        assert_eq!(Span::new(5, 2).len(), 0);
    }
}
