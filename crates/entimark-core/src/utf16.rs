use crate::span::Span;

/// Maps UTF-16 code-unit offsets onto byte offsets of a `str`.
///
/// Messaging platforms address entities in UTF-16 code units, so a character
/// outside the BMP occupies two units. Positions that land between the two
/// halves of a surrogate pair are rounded to a char boundary with [`floor`]
/// or [`ceil`].
///
/// [`floor`]: Utf16Map::floor
/// [`ceil`]: Utf16Map::ceil
#[derive(Clone, Debug)]
pub struct Utf16Map {
    // Parallel tables: code-unit and byte offset of every char start, plus
    // one trailing entry for the end of the text.
    units: Vec<usize>,
    bytes: Vec<usize>,
}

impl Utf16Map {
    pub fn new(text: &str) -> Self {
        let mut units = Vec::with_capacity(text.len() + 1);
        let mut bytes = Vec::with_capacity(text.len() + 1);
        let mut unit = 0usize;
        for (byte, ch) in text.char_indices() {
            units.push(unit);
            bytes.push(byte);
            unit += ch.len_utf16();
        }
        units.push(unit);
        bytes.push(text.len());
        Self { units, bytes }
    }

    pub fn len_utf16(&self) -> usize {
        self.units.last().copied().unwrap_or(0)
    }

    /// Byte offset of the char boundary at or before `unit`.
    pub fn floor(&self, unit: usize) -> usize {
        let unit = unit.min(self.len_utf16());
        let index = match self.units.binary_search(&unit) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        self.bytes[index]
    }

    /// Byte offset of the char boundary at or after `unit`.
    pub fn ceil(&self, unit: usize) -> usize {
        let unit = unit.min(self.len_utf16());
        let index = match self.units.binary_search(&unit) {
            Ok(index) | Err(index) => index,
        };
        self.bytes[index.min(self.bytes.len() - 1)]
    }

    /// Byte span covering every char touched by `start..end` code units.
    pub fn span(&self, start: usize, end: usize) -> Span {
        let start = self.floor(start);
        let end = self.ceil(end).max(start);
        Span { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::Utf16Map;
    use crate::span::Span;

    #[test]
    fn ascii_offsets_are_identity() {
        let map = Utf16Map::new("hello");
        assert_eq!(map.len_utf16(), 5);
        assert_eq!(map.floor(3), 3);
        assert_eq!(map.ceil(3), 3);
        assert_eq!(map.span(1, 4), Span { start: 1, end: 4 });
    }

    #[test]
    fn astral_chars_take_two_units() {
        // "a🦀b": 'a' = 1 unit/1 byte, crab = 2 units/4 bytes, 'b' = 1 unit/1 byte.
        let map = Utf16Map::new("a🦀b");
        assert_eq!(map.len_utf16(), 4);
        assert_eq!(map.floor(1), 1);
        assert_eq!(map.floor(3), 5);
        assert_eq!(map.span(1, 3), Span { start: 1, end: 5 });
    }

    #[test]
    fn split_surrogate_pairs_widen() {
        let map = Utf16Map::new("a🦀b");
        assert_eq!(map.floor(2), 1);
        assert_eq!(map.ceil(2), 5);
        assert_eq!(map.span(2, 3), Span { start: 1, end: 5 });
    }

    #[test]
    fn multibyte_bmp_chars_take_one_unit() {
        let map = Utf16Map::new("héllo");
        assert_eq!(map.len_utf16(), 5);
        assert_eq!(map.floor(2), 3);
    }

    #[test]
    fn positions_past_the_end_clamp() {
        let map = Utf16Map::new("ab");
        assert_eq!(map.ceil(10), 2);
        assert_eq!(map.floor(10), 2);
        let empty = Utf16Map::new("");
        assert_eq!(empty.len_utf16(), 0);
        assert_eq!(empty.span(0, 3), Span { start: 0, end: 0 });
    }
}
