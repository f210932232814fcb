use std::{fs, path::PathBuf};

use anyhow::Result;
use clap::Args;
use jsonpb::{JsonPbReader, core::DecodeOptions, protobuf::format_property_defs};

use crate::options::NamingArgs;

#[derive(Args)]
pub struct SchemaArgs {
    /// Serialized FileDescriptorSet
    descriptor_set: PathBuf,

    /// Fully-qualified message type name
    #[arg(short, long)]
    message: String,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    naming: NamingArgs,
}

impl SchemaArgs {
    pub fn run(self) -> Result<()> {
        let schema_data = fs::read(&self.descriptor_set)?;
        let schema_name = self.descriptor_set.display().to_string();
        let pool = jsonpb::protobuf::load_descriptor_pool(&schema_name, &schema_data)?;
        let reader = JsonPbReader::builder(pool)
            .with_options(DecodeOptions::default().with_naming(self.naming.policy()))
            .build();
        let text = format_property_defs(&reader.describe(&self.message)?)?;

        match self.output {
            Some(path) => fs::write(path, text)?,
            None => print!("{text}"),
        }
        Ok(())
    }
}
