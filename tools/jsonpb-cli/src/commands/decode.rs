use std::{
    fs,
    io::{self, BufRead, BufReader, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Args;
use jsonpb::JsonPbReader;
use tracing::info;

use crate::{
    format::{InputFormat, OutputFormat},
    options::OptionArgs,
    writer::MessageWriter,
};

#[derive(Args)]
pub struct DecodeArgs {
    /// Input file (stdin if not specified)
    input: Option<PathBuf>,

    /// Serialized FileDescriptorSet (e.g. `protoc --include_imports --descriptor_set_out`)
    #[arg(short, long)]
    descriptor_set: PathBuf,

    /// Fully-qualified message type name
    #[arg(short, long)]
    message: String,

    /// Input format
    #[arg(short, long, value_enum, default_value_t = InputFormat::Json)]
    input_format: InputFormat,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    options: OptionArgs,
}

impl DecodeArgs {
    pub fn run(self) -> Result<()> {
        let schema_data = fs::read(&self.descriptor_set)
            .with_context(|| format!("reading {}", self.descriptor_set.display()))?;
        let schema_name = self.descriptor_set.display().to_string();
        let pool = jsonpb::protobuf::load_descriptor_pool(&schema_name, &schema_data)?;
        let reader = JsonPbReader::builder(pool)
            .with_options(self.options.to_options())
            .build();

        let mut writer = MessageWriter::new(self.output.as_deref(), self.format)?;
        let input = self.open_input()?;

        match self.input_format {
            InputFormat::Json => {
                let mut json = String::new();
                BufReader::new(input).read_to_string(&mut json)?;
                let message = reader.decode_str(&self.message, &json)?;
                writer.write(&message)?;
            }
            InputFormat::Jsonl => {
                let count = reader.for_each_message(input, &self.message, |_, message| {
                    writer.write(&message).map_err(Into::into)
                })?;
                info!(count, message_type = %self.message, "decoded messages");
            }
        }

        writer.finish()
    }

    fn open_input(&self) -> Result<Box<dyn BufRead>> {
        Ok(match &self.input {
            Some(path) => Box::new(BufReader::new(
                fs::File::open(path).with_context(|| format!("opening {}", path.display()))?,
            )),
            None => Box::new(io::stdin().lock()),
        })
    }
}
