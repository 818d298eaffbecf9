use super::FULL_SCALE_VOLUME;

/// Size of the change made by a bare `+` or `-`, as a percentage of full scale
pub const DEFAULT_RELATIVE_VOLUME: f64 = 4.0;

/// How a number relates to the current volume
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    /// Replace the current volume
    Absolute,
    /// Add to the current volume
    Increase,
    /// Subtract from the current volume
    Decrease,
}

/// A volume change as written on the command line.
///
/// A number containing a `+` (anywhere) is an increase, otherwise one containing a `-` is a
/// decrease, otherwise it is absolute. A number containing a radix (`.`) is a percentage of
/// [`FULL_SCALE_VOLUME`]; otherwise it is in raw device units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ParsedNumber {
    /// Always non-negative; the sign lives in `direction`
    pub magnitude: f64,
    pub direction: Direction,
    pub is_percentage: bool,
}

impl ParsedNumber {
    /// Parses `token`. This never fails: anything that isn't a number has a magnitude of `0`.
    ///
    /// `percentage` seeds `is_percentage`; a token without a radix keeps the seeded value rather
    /// than resetting it, so a percentage interpretation carries over from earlier tokens.
    pub fn parse(token: &str, percentage: bool) -> ParsedNumber {
        let direction = if token.contains('+') {
            Direction::Increase
        } else if token.contains('-') {
            Direction::Decrease
        } else {
            Direction::Absolute
        };

        ParsedNumber {
            magnitude: leading_number(token).abs(),
            direction,
            is_percentage: percentage || token.contains('.'),
        }
    }

    /// The default step used by a bare `+` or `-`
    pub fn step(direction: Direction) -> ParsedNumber {
        ParsedNumber {
            magnitude: DEFAULT_RELATIVE_VOLUME,
            direction,
            is_percentage: true,
        }
    }

    /// Magnitude converted to device units
    pub fn amount(&self) -> f64 {
        if self.is_percentage {
            self.magnitude / 100.0 * FULL_SCALE_VOLUME as f64
        } else {
            self.magnitude
        }
    }

    /// The volume that results from applying this change to `current`, clamped to
    /// `0..=max_volume`.
    pub fn target(&self, current: u32, max_volume: f64) -> u32 {
        let v = match self.direction {
            Direction::Absolute => self.amount(),
            Direction::Increase => current as f64 + self.amount(),
            Direction::Decrease => current as f64 - self.amount(),
        };

        // NaN falls through both arms and saturates to 0 in the cast
        if v < 0.0 {
            0
        } else if v > max_volume {
            max_volume as u32
        } else {
            v as u32
        }
    }
}

/// Parses the longest prefix of `s` that forms a floating point number, the way C's `strtod`
/// does: leading whitespace is skipped, trailing garbage is ignored, and no number at all is `0`.
pub fn leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let len = numeric_prefix_len(s.as_bytes());
    s[..len].parse::<f64>().unwrap_or(0.0)
}

fn numeric_prefix_len(b: &[u8]) -> usize {
    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    // "inf", "infinity" and "nan", in any case
    for word in ["infinity", "inf", "nan"] {
        let end = i + word.len();
        if b.len() >= end && b[i..end].eq_ignore_ascii_case(word.as_bytes()) {
            return end;
        }
    }

    let int_digits = count_digits(&b[i..]);
    i += int_digits;

    let mut frac_digits = 0;
    if b.get(i) == Some(&b'.') {
        frac_digits = count_digits(&b[i + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    // an exponent only counts if it has digits
    if matches!(b.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(b.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = count_digits(&b[j..]);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    i
}

fn count_digits(b: &[u8]) -> usize {
    b.iter().take_while(|c| c.is_ascii_digit()).count()
}
