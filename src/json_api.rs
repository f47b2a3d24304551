use crate::{
    boxes::{BoxBody, HeifBox},
    known_boxes::KnownBox,
    parser::parse_boxes,
};
use serde::Serialize;
use std::path::Path;

/// A JSON-serializable representation of a single box.
///
/// This is designed for use in UIs and for JSON output in tools like
/// `heifdump`.
#[derive(Serialize)]
pub struct JsonBox {
    pub offset: u64,
    pub size: u64,
    pub header_size: u64,
    pub payload_offset: Option<u64>,
    pub payload_size: Option<u64>,

    pub typ: String,
    pub uuid: Option<String>,
    pub version: Option<u8>,
    pub flags: Option<u32>,
    pub kind: String,
    pub full_name: String,
    pub decoded: Option<serde_json::Value>,
    pub children: Option<Vec<JsonBox>>,
}

/// Read a file and return its box tree ready for serialization.
pub fn analyze_file(path: impl AsRef<Path>, decode: bool) -> anyhow::Result<Vec<JsonBox>> {
    let buf = std::fs::read(&path)?;
    let boxes = parse_boxes(&buf)?;
    box_tree_json(&boxes, decode)
}

pub fn box_tree_json(boxes: &[HeifBox], decode: bool) -> anyhow::Result<Vec<JsonBox>> {
    boxes.iter().map(|b| build_json_for_box(b, decode)).collect()
}

/// "container", "full", "leaf" or "unknown".
pub fn kind_label(b: &HeifBox) -> &'static str {
    let known = KnownBox::from(b.typ());
    if !b.children().is_empty() || (known.is_container() && !b.body.is_opaque()) {
        "container"
    } else if b.body.full_header().is_some() {
        "full"
    } else if b.body.is_opaque() {
        "unknown"
    } else {
        "leaf"
    }
}

fn build_json_for_box(b: &HeifBox, decode: bool) -> anyhow::Result<JsonBox> {
    let hdr = &b.header;
    let uuid_str = hdr.uuid.map(hex::encode);
    let full = b.body.full_header();

    let children = if b.children().is_empty() {
        None
    } else {
        Some(box_tree_json(b.children(), decode)?)
    };
    let payload = children.is_none().then(|| {
        let off = hdr.payload_start();
        (off, b.size() - hdr.header_size)
    });

    let decoded = match &b.body {
        BoxBody::Opaque { .. } => None,
        body if decode => Some(serde_json::to_value(body)?),
        _ => None,
    };

    Ok(JsonBox {
        offset: hdr.start,
        size: b.size(),
        header_size: hdr.header_size,
        payload_offset: payload.map(|p| p.0),
        payload_size: payload.map(|p| p.1),

        typ: hdr.typ.to_string(),
        uuid: uuid_str,
        version: full.map(|f| f.version),
        flags: full.map(|f| f.flags.bits()),
        kind: kind_label(b).to_string(),
        full_name: KnownBox::from(hdr.typ).full_name().to_string(),
        decoded,
        children,
    })
}
