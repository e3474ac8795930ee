//! Line-oriented setup questions.
//!
//! Each helper re-asks until the answer is valid. End of input is an
//! error so the caller can give up cleanly.

use std::io::{self, BufRead, Write};

/// Print `question` and read one trimmed line.
pub fn read_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(line.trim().to_string())
}

/// Ask a yes/no question. Accepts `yes`, `y`, `no` and `n` in any case.
pub fn ask_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<bool> {
    loop {
        match read_answer(input, output, question)?.to_lowercase().as_str() {
            "yes" | "y" => return Ok(true),
            "no" | "n" => return Ok(false),
            _ => writeln!(output, "Please answer 'yes' or 'no'.")?,
        }
    }
}

/// Ask for a non-empty line.
pub fn ask_name<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<String> {
    loop {
        let answer = read_answer(input, output, question)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        writeln!(output, "Name cannot be empty.")?;
    }
}

/// Ask for a non-negative integer.
pub fn ask_count<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<usize> {
    loop {
        match read_answer(input, output, question)?.parse::<usize>() {
            Ok(n) => return Ok(n),
            Err(_) => writeln!(output, "Please enter a valid non-negative integer.")?,
        }
    }
}

/// Ask for a positive integer.
pub fn ask_positive<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<u32> {
    loop {
        match read_answer(input, output, question)?.parse::<u32>() {
            Ok(n) if n > 0 => return Ok(n),
            _ => writeln!(output, "Please enter a valid positive integer.")?,
        }
    }
}
