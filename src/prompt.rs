use std::io::{self, BufRead, Write};

/// Asks a yes/no question, defaulting to no on an empty answer, end of input
/// or an answer that is not valid UTF-8
pub fn confirm<R, W>(question: &str, input: &mut R, output: &mut W) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{} [y/N] ", question)?;
    output.flush()?;
    let mut answer = Vec::new();
    if input.read_until(b'\n', &mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }
    let answer = match std::str::from_utf8(&answer) {
        Ok(answer) => answer.trim(),
        Err(_) => return Ok(false),
    };
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
