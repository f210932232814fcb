mod error;
mod reader;

pub use error::ReaderError;
pub use jsonpb_core as core;
pub use jsonpb_protobuf as protobuf;
pub use reader::{JsonPbReader, JsonPbReaderBuilder};
