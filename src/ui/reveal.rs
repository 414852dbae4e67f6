//! Character-at-a-time text reveal, for the GUI and the terminal.

use std::io::Write;
use std::thread::sleep;
use std::time::Duration;

/// Characters of `text` visible after `elapsed`, one more per `delay`.
/// Always cuts on a char boundary.
pub fn visible_prefix(text: &str, elapsed: Duration, delay: Duration) -> &str {
    let shown = if delay.is_zero() {
        usize::MAX
    } else {
        (elapsed.as_secs_f64() / delay.as_secs_f64()).floor() as usize
    };
    match text.char_indices().nth(shown) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Total time to reveal `text` completely.
pub fn reveal_duration(text: &str, delay: Duration) -> Duration {
    delay * text.chars().count() as u32
}

/// Writes `text` to `out` one character at a time, flushing after each.
pub fn reveal<W: Write>(out: &mut W, text: &str, delay: Duration) -> std::io::Result<()> {
    for ch in text.chars() {
        write!(out, "{}", ch)?;
        out.flush()?;
        if !delay.is_zero() {
            sleep(delay);
        }
    }
    Ok(())
}

/// Reveals each line, then ends it with a newline.
pub fn reveal_lines<W: Write>(out: &mut W, lines: &[String], delay: Duration) -> std::io::Result<()> {
    for line in lines {
        reveal(out, line, delay)?;
        writeln!(out)?;
    }
    Ok(())
}
