use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fmt,
    io::{self, Write},
};

use crate::output::{OutputFmt, OutputJson};

pub trait Printer {
    /// Prints command results: plain text or a JSON document.
    fn out<T: fmt::Display + Serialize>(&mut self, data: T) -> Result<()>;

    /// Prints a human notice. Silent in JSON mode.
    fn log<T: fmt::Display>(&mut self, data: T) -> Result<()>;

    fn is_json(&self) -> bool;
}

pub struct WriterPrinter<W: Write> {
    writer: W,
    output: OutputFmt,
}

pub type StdoutPrinter = WriterPrinter<io::Stdout>;

impl StdoutPrinter {
    pub fn stdout(output: OutputFmt) -> Self {
        Self::new(io::stdout(), output)
    }
}

impl<W: Write> WriterPrinter<W> {
    pub fn new(writer: W, output: OutputFmt) -> Self {
        Self { writer, output }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Printer for WriterPrinter<W> {
    fn out<T: fmt::Display + Serialize>(&mut self, data: T) -> Result<()> {
        match self.output {
            OutputFmt::Plain => {
                write!(self.writer, "{}", data).context("cannot write output")?;
            }
            OutputFmt::Json => {
                serde_json::to_writer(&mut self.writer, &OutputJson::new(data))
                    .context("cannot write json to writer")?;
                writeln!(self.writer).context("cannot write output")?;
            }
        };

        Ok(())
    }

    fn log<T: fmt::Display>(&mut self, data: T) -> Result<()> {
        if let OutputFmt::Plain = self.output {
            writeln!(self.writer, "{}", data).context("cannot write output")?;
        }

        Ok(())
    }

    fn is_json(&self) -> bool {
        self.output == OutputFmt::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_print_plain_or_json() {
        let mut printer = WriterPrinter::new(Vec::new(), OutputFmt::Plain);
        printer.out("hello\n").unwrap();
        printer.log("notice").unwrap();
        assert_eq!("hello\nnotice\n", String::from_utf8(printer.into_inner()).unwrap());

        let mut printer = WriterPrinter::new(Vec::new(), OutputFmt::Json);
        printer.out("hello").unwrap();
        printer.log("notice").unwrap();
        assert!(printer.is_json());
        assert_eq!(
            "{\"response\":\"hello\"}\n",
            String::from_utf8(printer.into_inner()).unwrap()
        );
    }
}
