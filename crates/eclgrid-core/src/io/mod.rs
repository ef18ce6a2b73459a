pub mod eclfile;
pub mod fortio;

pub use eclfile::{EclData, EclFile, EclFileError, EclKeyword, EclOutput, EclType};
pub use fortio::{
    ElementType, ElementWidth, Endianness, FortioError, RecordOptions, RecordStream, TailPolicy,
};
