use clap::{ArgAction, Parser};
use heifbox::{
    FourCC, HeifBox,
    json_api::{box_tree_json, kind_label},
    parse_boxes,
    util::{hex_dump, read_slice},
};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(version, about = "HEIF/ISOBMFF box explorer")]
struct Args {
    /// HEIF/HEIC file path
    path: String,

    /// Print only the boxes at a dotted path, e.g. meta.iprp.ipco or meta.iinf.infe[1]
    #[arg(long)]
    filter: Option<String>,

    /// Hex-dump the payload of every box with this type (e.g. iloc), or uuid:<hex prefix>
    #[arg(long)]
    raw: Option<String>,

    /// Stop descending below this depth in the text tree
    #[arg(long, default_value_t = 32)]
    max_depth: usize,

    /// Show the decoded record next to each leaf box
    #[arg(long, action = ArgAction::SetTrue)]
    decode: bool,

    /// Bytes to dump per box with --raw (0 dumps the whole payload)
    #[arg(long, default_value_t = 0)]
    bytes: usize,

    /// Print the tree as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let buf = std::fs::read(&args.path)?;
    let top = parse_boxes(&buf)?;

    let targets: Vec<&HeifBox> = if let Some(path) = &args.filter {
        select_by_path(&top, path)
    } else {
        top.iter().collect()
    };

    // JSON goes out alone so it stays machine-readable
    if args.json {
        let owned: Vec<HeifBox> = targets.into_iter().cloned().collect();
        let json_boxes = box_tree_json(&owned, args.decode)?;
        println!("{}", serde_json::to_string_pretty(&json_boxes)?);
        return Ok(());
    }

    for b in targets {
        print_box(b, 0, args.max_depth, args.decode)?;
    }

    // --raw searches the whole tree, not just the filtered part
    if let Some(sel) = &args.raw {
        dump_raw(&buf, &top, sel, args.bytes)?;
    }

    Ok(())
}

// ---------- text tree ----------

fn print_box(b: &HeifBox, depth: usize, max_depth: usize, decode: bool) -> anyhow::Result<()> {
    let indent = "  ".repeat(depth);
    let hdr = &b.header;
    let offset = format!("{:#x}", hdr.start);

    match b.body.full_header() {
        Some(full) => println!(
            "{indent}{:>6} {:>10} {} (ver={}, flags=0x{:06x}) [{}]",
            offset,
            b.size(),
            display_type(b),
            full.version,
            full.flags.bits(),
            kind_label(b)
        ),
        None => println!(
            "{indent}{:>6} {:>10} {} [{}]",
            offset,
            b.size(),
            display_type(b),
            kind_label(b)
        ),
    }

    if decode && b.children().is_empty() && !b.body.is_opaque() {
        println!("{indent}        -> {}", serde_json::to_string(&b.body)?);
    }

    if depth < max_depth {
        for c in b.children() {
            print_box(c, depth + 1, max_depth, decode)?;
        }
    }
    Ok(())
}

fn display_type(b: &HeifBox) -> String {
    match b.header.uuid {
        Some(u) => format!("uuid:{}", hex::encode(u)),
        None => b.typ().to_string(),
    }
}

// ---------- --raw ----------

fn dump_raw(buf: &[u8], boxes: &[HeifBox], sel: &str, limit: usize) -> anyhow::Result<()> {
    let mut hits = Vec::new();
    for b in boxes {
        b.walk(&mut |node: &HeifBox, _: usize| {
            if raw_selects(sel, node) {
                let payload_len = node.size() - node.header.header_size;
                hits.push((node.header.payload_start(), payload_len, display_type(node)));
            }
        });
    }

    for (n, (offset, payload_len, label)) in hits.into_iter().enumerate() {
        let shown = match limit as u64 {
            0 => payload_len,
            l => l.min(payload_len),
        };
        println!("\n#{n} {label}: payload at {offset:#x}, showing {shown} of {payload_len} bytes");
        print!("{}", hex_dump(read_slice(buf, offset, shown)?, offset));
    }
    Ok(())
}

fn raw_selects(sel: &str, b: &HeifBox) -> bool {
    match (b.header.uuid, sel.strip_prefix("uuid:")) {
        (Some(u), Some(prefix)) => hex::encode(u).starts_with(&prefix.to_ascii_lowercase()),
        (None, None) => FourCC::from_str(sel).is_ok_and(|cc| cc == b.typ()),
        _ => false,
    }
}

// ---------- --filter: dotted path with optional [n] per step ----------

fn select_by_path<'a>(roots: &'a [HeifBox], path: &str) -> Vec<&'a HeifBox> {
    let mut level: Vec<&'a HeifBox> = roots.iter().collect();
    let mut steps = path.split('.').peekable();

    while let Some(step) = steps.next() {
        let Some((typ, nth)) = parse_step(step) else {
            return Vec::new();
        };
        let hits = level.into_iter().filter(|b| b.typ() == typ);
        let picked: Vec<&'a HeifBox> = match nth {
            Some(n) => hits.skip(n).take(1).collect(),
            None => hits.collect(),
        };
        if steps.peek().is_none() || picked.is_empty() {
            return picked;
        }
        level = picked.into_iter().flat_map(|b| b.children()).collect();
    }
    Vec::new()
}

/// `ipco` or `ipco[1]`.
fn parse_step(step: &str) -> Option<(FourCC, Option<usize>)> {
    let (name, nth) = match step.split_once('[') {
        Some((name, rest)) => (name, Some(rest.strip_suffix(']')?.parse().ok()?)),
        None => (step, None),
    };
    Some((FourCC::from_str(name).ok()?, nth))
}
