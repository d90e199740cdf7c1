/// Inclusive byte span selected by a single-range `Range: bytes=` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// Not a form we honour; the whole file is served instead.
    Invalid,
    /// Well formed but outside the file; answered with 416.
    Unsatisfiable,
}

impl ByteRange {
    pub fn parse(header: &str, size: u64) -> Result<Self, RangeError> {
        let range_set = header
            .trim()
            .strip_prefix("bytes=")
            .ok_or(RangeError::Invalid)?
            .trim();
        if range_set.contains(',') {
            return Err(RangeError::Invalid);
        }
        let (first, last) = range_set.split_once('-').ok_or(RangeError::Invalid)?;
        let (first, last) = (first.trim(), last.trim());

        if first.is_empty() {
            // "-N": the final N bytes.
            let count: u64 = last.parse().map_err(|_| RangeError::Invalid)?;
            if count == 0 || size == 0 {
                return Err(RangeError::Unsatisfiable);
            }
            return Ok(Self {
                start: size.saturating_sub(count),
                end: size - 1,
            });
        }

        let start: u64 = first.parse().map_err(|_| RangeError::Invalid)?;
        let end = if last.is_empty() {
            None
        } else {
            let end: u64 = last.parse().map_err(|_| RangeError::Invalid)?;
            if end < start {
                return Err(RangeError::Invalid);
            }
            Some(end)
        };
        if start >= size {
            return Err(RangeError::Unsatisfiable);
        }
        Ok(Self {
            start,
            end: end.map_or(size - 1, |end| end.min(size - 1)),
        })
    }

    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}
