//! Formatting helpers for positional wire fields.

/// Render a float at a fixed total width by trading fractional digits
/// against the length of the integer part.
///
/// The leading character count is the sign (0 or 1 characters) plus the
/// integer digits; the remaining width (minus the decimal point) is spent on
/// fractional digits. When the integer part alone meets or exceeds the
/// target width, the output falls back to a single fractional digit and
/// overflows the width.
///
/// The ADS-C report grammar is whitespace-delimited but column-aligned, so
/// coordinates are rendered through this helper with a width of 8.
///
/// # Examples
///
/// ```
/// use hoppie_codec::util::fixed_width_float_str;
///
/// assert_eq!(fixed_width_float_str(1.0, 8), "1.000000");
/// assert_eq!(fixed_width_float_str(-1.0, 8), "-1.00000");
/// assert_eq!(fixed_width_float_str(10.0, 8), "10.00000");
/// assert_eq!(fixed_width_float_str(1000.0, 3), "1000.0");
/// ```
#[must_use]
pub fn fixed_width_float_str(value: f64, width: usize) -> String {
    let sign_chars = usize::from(value < 0.0);
    let int_digits = {
        let mut magnitude = value.abs().trunc() as u64;
        let mut digits = 1;
        while magnitude >= 10 {
            magnitude /= 10;
            digits += 1;
        }
        digits
    };
    let leading = sign_chars + int_digits;
    let frac = if leading + 1 >= width { 1 } else { width - leading - 1 };
    format!("{value:.frac$}")
}
