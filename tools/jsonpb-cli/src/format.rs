use clap::ValueEnum;

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum InputFormat {
    /// One JSON document (optionally wrapped in a single-element array)
    Json,
    /// One JSON document per line
    Jsonl,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Canonical protobuf JSON, one message per line
    Json,
    /// Rust debug representation
    Debug,
    /// Hex-encoded protobuf wire bytes, one message per line
    Hex,
}
