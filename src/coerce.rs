// Best-effort numeric coercion of raw table fields

/// Parse the leading numeric portion of `raw` as an `f64`.
///
/// Leading whitespace, including a byte-order mark, is skipped and anything after the longest valid
/// decimal prefix is ignored, so `"12kg"` yields `12.0`. An exponent only
/// counts when digits follow it. The literal `Infinity` (optionally signed)
/// is accepted. Returns `None` when no numeric prefix exists, which covers
/// empty and whitespace-only strings. No thousands separators are handled.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let s = raw.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// A column coerced to numbers, one entry per source row in row order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumericSeries {
    pub values: Vec<Option<f64>>,
    pub invalid_count: usize,
}

impl NumericSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has_invalid(&self) -> bool {
        self.invalid_count > 0
    }
}

/// Coerce every raw value, keeping failed entries in place as `None`.
pub fn coerce_column<'a, I>(raw_values: I) -> NumericSeries
where
    I: IntoIterator<Item = &'a str>,
{
    let values: Vec<Option<f64>> = raw_values.into_iter().map(coerce_numeric).collect();
    let invalid_count = values.iter().filter(|v| v.is_none()).count();
    NumericSeries {
        values,
        invalid_count,
    }
}
