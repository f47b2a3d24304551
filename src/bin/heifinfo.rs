use clap::Parser;
use heifbox::{
    BoxBody, ByteRange, HeifFile,
    heif::iinf::{ItemContent, ItemInfoEntry},
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Simple HEIF image info")]
struct Args {
    /// HEIF/HEIC/AVIF file path
    path: String,

    /// Output as JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ItemSummary {
    id: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    item_type: Option<String>, // e.g. "hvc1", "Exif", "mime"

    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,

    protected: bool,
    primary: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rotation: Option<u16>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    extents: Vec<ByteRange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    location_error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageInfo {
    file: String,
    is_heif: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    major_brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minor_version: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    compatible_brands: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    handler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_item: Option<u32>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    items: Vec<ItemSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    exif: Option<ByteRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exif_error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let path = PathBuf::from(&args.path);

    let buf = std::fs::read(&path)?;
    let file = HeifFile::parse(&buf)?;
    let info = summarize(&file, path.display().to_string());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print_human(&info);
    }

    Ok(())
}

fn summarize(file: &HeifFile, name: String) -> ImageInfo {
    let ftyp = file.file_type();
    let primary_item = file.primary_item_id();

    let (exif, exif_error) = match file.exif_location() {
        Ok(loc) => (loc, None),
        Err(e) => (None, Some(e.to_string())),
    };

    ImageInfo {
        file: name,
        is_heif: file.is_heif(),
        major_brand: ftyp.map(|f| f.major_brand().to_string()),
        minor_version: ftyp.map(|f| f.minor_version()),
        compatible_brands: ftyp
            .map(|f| f.compatible_brands().iter().map(|b| b.to_string()).collect())
            .unwrap_or_default(),
        handler: file
            .meta()
            .and_then(|m| m.handler())
            .map(|h| h.handler_type.to_string()),
        primary_item,
        items: file
            .item_infos()
            .map(|e| summarize_item(file, e, primary_item))
            .collect(),
        exif,
        exif_error,
    }
}

fn summarize_item(file: &HeifFile, entry: &ItemInfoEntry, primary: Option<u32>) -> ItemSummary {
    let mut s = ItemSummary {
        id: entry.item_id,
        item_type: entry.item_type.map(|t| t.to_string()),
        name: entry.item_name.clone(),
        content_type: match &entry.content {
            ItemContent::Mime { content_type, .. } => Some(content_type.clone()),
            ItemContent::Uri { uri_type } => Some(uri_type.clone()),
            ItemContent::None => None,
        },
        protected: entry.is_protected(),
        primary: primary == Some(entry.item_id),
        width: None,
        height: None,
        rotation: None,
        extents: Vec::new(),
        location_error: None,
    };

    for (_essential, prop) in file.properties_for(entry.item_id) {
        match &prop.body {
            BoxBody::ImageSpatialExtents(ispe) => {
                s.width = Some(ispe.width);
                s.height = Some(ispe.height);
            }
            BoxBody::ImageRotation(irot) => s.rotation = Some(irot.angle),
            _ => {}
        }
    }

    // Items without an iloc entry (e.g. derived grids with no data) are fine
    if file.item_location(entry.item_id).is_some() {
        match file.item_ranges(entry.item_id) {
            Ok(r) => s.extents = r,
            Err(e) => s.location_error = Some(e.to_string()),
        }
    }
    s
}

// ---- human-readable output -----------------------------------------

fn print_human(info: &ImageInfo) {
    println!("File: {}", info.file);
    println!("HEIF: {}", if info.is_heif { "yes" } else { "no" });
    if let Some(major) = &info.major_brand {
        println!("Major brand: {}", major);
    }
    if let Some(minor) = info.minor_version {
        println!("Minor version: {}", minor);
    }
    if !info.compatible_brands.is_empty() {
        println!("Compatible brands: {}", info.compatible_brands.join(", "));
    }
    if let Some(h) = &info.handler {
        println!("Handler: {}", h);
    }
    if let Some(p) = info.primary_item {
        println!("Primary item: {}", p);
    }

    if info.items.is_empty() {
        println!("Items: (none)");
    } else {
        println!("Items:");
        for it in &info.items {
            let marker = if it.primary { " (primary)" } else { "" };
            println!(
                "  Item {}{}: {}",
                it.id,
                marker,
                it.item_type.as_deref().unwrap_or("?")
            );
            if !it.name.is_empty() {
                println!("    name: {}", it.name);
            }
            if let Some(ct) = &it.content_type {
                println!("    content type: {}", ct);
            }
            if it.protected {
                println!("    protected");
            }
            if let (Some(w), Some(h)) = (it.width, it.height) {
                println!("    size: {}x{}", w, h);
            }
            if let Some(r) = it.rotation {
                println!("    rotation: {} deg", r);
            }
            for e in &it.extents {
                println!("    extent: offset={:#x} len={}", e.offset, e.length);
            }
            if let Some(err) = &it.location_error {
                println!("    location: {}", err);
            }
        }
    }

    match (&info.exif, &info.exif_error) {
        (Some(loc), _) => println!("Exif: offset={:#x} len={}", loc.offset, loc.length),
        (None, Some(err)) => println!("Exif: {}", err),
        (None, None) => println!("Exif: (none)"),
    }
}
