//! Interactive configuration: ask on a line-oriented terminal until the
//! answer is valid.

use sms_lab_abstract::SimConfigOverride;
use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// Smallest mean latency accepted from a prompt, in seconds.
pub const MIN_MEAN_PROCESSING_TIME: f64 = 0.01;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, message: &str) -> io::Result<String> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    pub fn positive_integer(&mut self, message: &str) -> io::Result<u64> {
        loop {
            match self.ask(message)?.parse::<i64>() {
                Ok(value) if value > 0 => return Ok(value as u64),
                Ok(_) => self.say("Value must be greater than 0.")?,
                Err(_) => self.say("Please enter a valid positive integer.")?,
            }
        }
    }

    /// A float `v` with `min <= v`, and `v < max` when `max` is given.
    pub fn float_in(&mut self, message: &str, min: f64, max: Option<f64>) -> io::Result<f64> {
        loop {
            let value = match self.ask(message)?.parse::<f64>() {
                Ok(value) if value.is_finite() => value,
                _ => {
                    self.say("Please enter a valid number.")?;
                    continue;
                }
            };
            match max {
                Some(max) if (min..max).contains(&value) => return Ok(value),
                Some(max) => self.say(format!("Value must be between {min} and {max}."))?,
                None if value >= min => return Ok(value),
                None => self.say(format!("Value must be greater than or equal to {min}."))?,
            }
        }
    }

    /// Empty input keeps `default`; so does anything that is not a positive integer.
    pub fn message_count(&mut self, message: &str, default: u64) -> io::Result<u64> {
        let answer = self.ask(message)?;
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse::<i64>() {
            Ok(value) if value > 0 => Ok(value as u64),
            _ => {
                self.say(format!(
                    "Invalid input, the number of messages are set to default {default}."
                ))?;
                Ok(default)
            }
        }
    }

    pub fn yes_no(&mut self, message: &str) -> io::Result<bool> {
        loop {
            match self.ask(message)?.to_lowercase().as_str() {
                "yes" => return Ok(true),
                "no" => return Ok(false),
                _ => self.say("Please enter 'yes' or 'no'.")?,
            }
        }
    }

    /// Ask for every setting that `known` leaves unset. The latency spread
    /// and payload length are never asked for.
    pub fn fill_missing(
        &mut self,
        known: &SimConfigOverride,
        default_messages: u64,
    ) -> io::Result<SimConfigOverride> {
        let mut filled = known.clone();
        if filled.message_count.is_none() {
            filled.message_count = Some(self.message_count(
                &format!(
                    "Enter the number of messages (or press Enter for default {default_messages}): "
                ),
                default_messages,
            )?);
        }
        if filled.sender_count.is_none() {
            let senders = self.positive_integer("Enter the number of sender threads: ")?;
            filled.sender_count = Some(senders as usize);
        }
        if filled.mean_processing_time.is_none() {
            filled.mean_processing_time = Some(self.float_in(
                "Enter the mean processing time (seconds): ",
                MIN_MEAN_PROCESSING_TIME,
                None,
            )?);
        }
        if filled.error_rate.is_none() {
            filled.error_rate = Some(self.float_in(
                "Enter the error rate (0.0 to 1.0): ",
                0.0,
                Some(1.0),
            )?);
        }
        if filled.report_interval.is_none() {
            let secs = self.positive_integer("Enter the progress update interval (seconds): ")?;
            filled.report_interval = Some(secs as f64);
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(p: &Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(p.output.clone()).unwrap()
    }

    #[test]
    fn test_positive_integer_valid() {
        let mut p = prompter("5\n");
        assert_eq!(p.positive_integer("n: ").unwrap(), 5);
    }

    #[test]
    fn test_positive_integer_retries_on_zero_and_text() {
        let mut p = prompter("0\nabc\n-3\n7\n");
        assert_eq!(p.positive_integer("n: ").unwrap(), 7);
        let out = output(&p);
        assert_eq!(out.matches("Value must be greater than 0.").count(), 2);
        assert!(out.contains("Please enter a valid positive integer."));
    }

    #[test]
    fn test_float_in_accepts_int_literal() {
        let mut p = prompter("2\n");
        assert_eq!(p.float_in("f: ", 1.0, Some(3.0)).unwrap(), 2.0);
    }

    #[test]
    fn test_float_in_retries_until_in_range() {
        let mut p = prompter("abc\n0.5\n3.0\n-1.0\n1.5\n");
        assert_eq!(p.float_in("f: ", 1.0, Some(2.0)).unwrap(), 1.5);
        let out = output(&p);
        assert!(out.contains("Please enter a valid number."));
        assert_eq!(out.matches("Value must be between 1 and 2.").count(), 3);
    }

    #[test]
    fn test_float_in_upper_bound_is_exclusive() {
        let mut p = prompter("1.0\n0.999\n");
        assert_eq!(p.float_in("rate: ", 0.0, Some(1.0)).unwrap(), 0.999);
    }

    #[test]
    fn test_float_in_without_max() {
        let mut p = prompter("0.001\n0.01\n");
        assert_eq!(p.float_in("mean: ", 0.01, None).unwrap(), 0.01);
        assert!(output(&p).contains("Value must be greater than or equal to 0.01."));
    }

    #[test]
    fn test_message_count_defaults() {
        assert_eq!(prompter("\n").message_count("m: ", 1000).unwrap(), 1000);
        assert_eq!(prompter("250\n").message_count("m: ", 1000).unwrap(), 250);

        let mut p = prompter("-4\n");
        assert_eq!(p.message_count("m: ", 1000).unwrap(), 1000);
        assert!(output(&p).contains("set to default 1000"));
    }

    #[test]
    fn test_yes_no() {
        let mut p = prompter("maybe\nYES\n");
        assert!(p.yes_no("again? ").unwrap());
        assert!(output(&p).contains("Please enter 'yes' or 'no'."));
        assert!(!prompter("no\n").yes_no("again? ").unwrap());
    }

    #[test]
    fn test_eof_is_an_error() {
        let err = prompter("").positive_integer("n: ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_fill_missing_only_asks_for_unset_values() {
        let known = SimConfigOverride {
            sender_count: Some(3),
            error_rate: Some(0.2),
            ..Default::default()
        };
        // messages, mean, interval
        let mut p = prompter("\n0.25\n2\n");
        let filled = p.fill_missing(&known, 1000).unwrap();

        assert_eq!(filled.message_count, Some(1000));
        assert_eq!(filled.sender_count, Some(3));
        assert_eq!(filled.mean_processing_time, Some(0.25));
        assert_eq!(filled.error_rate, Some(0.2));
        assert_eq!(filled.report_interval, Some(2.0));
        assert!(!output(&p).contains("sender threads"));
    }
}
