pub mod api;
pub mod boxes;
pub mod cursor;
pub mod error;
pub mod heif;
pub mod json_api;
pub mod known_boxes;
pub mod parser;
pub mod registry;
pub mod util;

pub use api::{ByteRange, HeifFile};
pub use boxes::{BoxBody, BoxFlags, BoxHeader, BoxKey, BoxSize, FourCC, FullBoxHeader, HeifBox};
pub use cursor::{ByteCursor, Endian};
pub use error::{ParseError, Result};
pub use json_api::{JsonBox, analyze_file, box_tree_json};
pub use parser::{
    DecodeContext, MAX_DEPTH, ParseOptions, parse_boxes, parse_boxes_with, parse_children,
    read_box_header, read_full_box_header,
};
pub use registry::{BoxDecoder, Registry, default_registry};
