use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Result;
use prost::Message;
use prost_reflect::DynamicMessage;

use crate::format::OutputFormat;

pub struct MessageWriter {
    dest: Box<dyn Write>,
    format: OutputFormat,
}

impl MessageWriter {
    pub fn new(output: Option<&Path>, format: OutputFormat) -> Result<Self> {
        let dest: Box<dyn Write> = match output {
            Some(path) => Box::new(BufWriter::new(fs::File::create(path)?)),
            None => Box::new(BufWriter::new(io::stdout().lock())),
        };
        Ok(Self { dest, format })
    }

    pub fn write(&mut self, message: &DynamicMessage) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.dest, message)?;
                writeln!(self.dest)?;
            }
            OutputFormat::Debug => writeln!(self.dest, "{message:#?}")?,
            OutputFormat::Hex => writeln!(self.dest, "{}", hex::encode(message.encode_to_vec()))?,
        }
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        self.dest.flush()?;
        Ok(())
    }
}
