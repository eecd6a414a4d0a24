/// Byte range into the message text, always on char boundaries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// The covered part of `text`, empty if the span does not fit.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::Span;

    #[test]
    fn slices_covered_text() {
        let span = Span { start: 1, end: 3 };
        assert_eq!(span.slice("abcd"), "bc");
        assert_eq!(Span { start: 3, end: 3 }.slice("abcd"), "");
    }

    #[test]
    fn out_of_range_slices_are_empty() {
        assert_eq!(Span { start: 2, end: 9 }.slice("abc"), "");
        // Inside the two-byte 'é'.
        assert_eq!(Span { start: 0, end: 1 }.slice("é"), "");
    }
}
