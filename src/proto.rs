//! Parameter parsing shared by both protocol front ends.

/// Extracts the numeric argument from a command line such as `RETR 2`.
///
/// The four-letter keyword and its single separator are skipped and the
/// remainder is read as an unsigned decimal integer. Any non-digit content
/// (or overflow) yields 0, which callers treat uniformly as an invalid
/// parameter. A literal `0` is therefore indistinguishable from a parse
/// failure; message indices start at 1, so no valid argument is lost.
pub fn numeric_parameter(line: &str) -> usize {
    let Some(param) = line.get(5..).filter(|p| !p.is_empty()) else {
        return 0;
    };

    let mut result: usize = 0;
    for byte in param.bytes() {
        if !byte.is_ascii_digit() {
            return 0;
        }
        result = match result
            .checked_mul(10)
            .and_then(|r| r.checked_add(usize::from(byte - b'0')))
        {
            Some(r) => r,
            None => return 0,
        };
    }
    result
}

/// Returns the address between the first `<` and the first `>` of `line`.
///
/// Callers have already validated the surrounding `FROM:`/`TO:` wrapper;
/// this only slices out the enclosed substring. `None` when either bracket
/// is missing or they appear out of order.
pub fn angle_address(line: &str) -> Option<&str> {
    let open = line.find('<')?;
    let close = line.find('>')?;
    if close < open {
        return None;
    }
    Some(&line[open + 1..close])
}
