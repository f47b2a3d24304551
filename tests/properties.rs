mod common;

use common::{bx, full_bx, ispe};
use heifbox::heif::colr::ColourInformation;
use heifbox::heif::iprp::ItemPropertyAssociationBox;
use heifbox::{BoxBody, FourCC, HeifBox, ParseError, parse_boxes};

fn parse_one(data: &[u8]) -> HeifBox {
    let mut boxes = parse_boxes(data).expect("parse failed");
    boxes.remove(0)
}

fn ipma(b: &HeifBox) -> &ItemPropertyAssociationBox {
    match &b.body {
        BoxBody::PropertyAssociation(a) => a,
        other => panic!("expected ipma, got {other:?}"),
    }
}

#[test]
fn ipma_narrow_association() {
    let mut p = 1u32.to_be_bytes().to_vec();
    p.extend_from_slice(&1u16.to_be_bytes());
    p.extend_from_slice(&[1, 0x85]);
    let b = parse_one(&full_bx(b"ipma", 0, 0, &p));

    let entry = ipma(&b).find(1).unwrap();
    assert_eq!(entry.associations.len(), 1);
    assert!(entry.associations[0].essential);
    assert_eq!(entry.associations[0].property_index, 5);
}

#[test]
fn ipma_wide_association() {
    let mut p = 1u32.to_be_bytes().to_vec();
    p.extend_from_slice(&1u16.to_be_bytes());
    p.push(2);
    p.extend_from_slice(&0x8005u16.to_be_bytes());
    p.extend_from_slice(&0x0123u16.to_be_bytes());
    let b = parse_one(&full_bx(b"ipma", 0, 1, &p));

    let assoc = &ipma(&b).find(1).unwrap().associations;
    assert!(assoc[0].essential);
    assert_eq!(assoc[0].property_index, 5);
    assert!(!assoc[1].essential);
    assert_eq!(assoc[1].property_index, 0x0123);
}

#[test]
fn ipma_v1_has_32_bit_item_ids() {
    let mut p = 2u32.to_be_bytes().to_vec();
    p.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    p.extend_from_slice(&[1, 0x02]);
    p.extend_from_slice(&7u32.to_be_bytes());
    p.push(0);
    let b = parse_one(&full_bx(b"ipma", 1, 0, &p));

    let a = ipma(&b);
    assert_eq!(a.entries.len(), 2);
    assert_eq!(a.find(0x0001_0000).unwrap().associations[0].property_index, 2);
    assert!(a.find(7).unwrap().associations.is_empty());
    assert!(a.find(1).is_none());
}

#[test]
fn ipma_short_payload_fails() {
    let mut p = 3u32.to_be_bytes().to_vec();
    p.extend_from_slice(&1u16.to_be_bytes());
    p.extend_from_slice(&[1, 0x01]);
    assert!(matches!(
        parse_boxes(&full_bx(b"ipma", 0, 0, &p)),
        Err(ParseError::OutOfRange { .. })
    ));
}

#[test]
fn colr_nclx() {
    let mut p = b"nclx".to_vec();
    p.extend_from_slice(&1u16.to_be_bytes());
    p.extend_from_slice(&13u16.to_be_bytes());
    p.extend_from_slice(&6u16.to_be_bytes());
    p.push(0x80);
    let b = parse_one(&bx(b"colr", &p));
    let BoxBody::ColourInformation(c) = &b.body else {
        panic!("expected colr");
    };
    assert_eq!(c.colour_type, "nclx");
    assert_eq!(
        c.info,
        ColourInformation::Nclx {
            colour_primaries: 1,
            transfer_characteristics: 13,
            matrix_coefficients: 6,
            full_range: true,
        }
    );
}

#[test]
fn colr_icc_profile_is_kept() {
    let profile = [0xde, 0xad, 0xbe, 0xef, 0x01];
    let mut p = b"prof".to_vec();
    p.extend_from_slice(&profile);
    let b = parse_one(&bx(b"colr", &p));
    let BoxBody::ColourInformation(c) = &b.body else {
        panic!("expected colr");
    };
    assert_eq!(
        c.info,
        ColourInformation::Icc {
            restricted: false,
            profile: profile.to_vec(),
        }
    );
}

#[test]
fn colr_unknown_type_is_skipped() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut p = b"abcd".to_vec();
    p.extend_from_slice(&[9u8; 11]);
    let mut data = bx(b"colr", &p);
    data.extend_from_slice(&ispe(1, 1));

    let boxes = parse_boxes(&data).unwrap();
    assert_eq!(boxes.len(), 2);
    let BoxBody::ColourInformation(c) = &boxes[0].body else {
        panic!("expected colr");
    };
    assert_eq!(c.info, ColourInformation::Unknown { skipped: 11 });
    assert!(matches!(boxes[1].body, BoxBody::ImageSpatialExtents(_)));
}

#[test]
fn pixi_channels() {
    let b = parse_one(&full_bx(b"pixi", 0, 0, &[3, 8, 8, 8]));
    let BoxBody::PixelInformation(p) = &b.body else {
        panic!("expected pixi");
    };
    assert_eq!(p.num_channels(), 3);
    assert_eq!(p.bits_per_channel, vec![8, 8, 8]);
}

#[test]
fn pixi_without_channels_is_invalid() {
    assert!(matches!(
        parse_boxes(&full_bx(b"pixi", 0, 0, &[0])),
        Err(ParseError::InvalidField {
            field: "num_channels",
            value: 0,
            ..
        })
    ));
}

#[test]
fn irot_ignores_reserved_bits() {
    for (raw, angle) in [(0u8, 0u16), (1, 90), (2, 180), (0xff, 270)] {
        let b = parse_one(&bx(b"irot", &[raw]));
        match b.body {
            BoxBody::ImageRotation(r) => assert_eq!(r.angle, angle, "raw={raw:#x}"),
            other => panic!("expected irot, got {other:?}"),
        }
    }
}

#[test]
fn ispe_dimensions() {
    let b = parse_one(&ispe(4032, 3024));
    let BoxBody::ImageSpatialExtents(s) = &b.body else {
        panic!("expected ispe");
    };
    assert_eq!((s.width, s.height), (4032, 3024));
}

#[test]
fn iprp_resolves_item_properties() {
    let ipco = bx(b"ipco", &[ispe(64, 48), bx(b"irot", &[1]), bx(b"hvcC", &[0; 23])].concat());
    let mut ipma_p = 1u32.to_be_bytes().to_vec();
    ipma_p.extend_from_slice(&1u16.to_be_bytes());
    ipma_p.extend_from_slice(&[4, 0x83, 0x01, 0x02, 0x09]);
    let data = bx(b"iprp", &[ipco, full_bx(b"ipma", 0, 0, &ipma_p)].concat());

    let b = parse_one(&data);
    let BoxBody::ItemProperties(iprp) = &b.body else {
        panic!("expected iprp");
    };
    let container = iprp.property_container().unwrap();
    assert_eq!(container.properties.len(), 3);
    assert!(container.get(0).is_none());
    assert_eq!(container.get(2).unwrap().typ(), FourCC(*b"irot"));

    // index 9 is dangling and dropped
    let props = iprp.properties_for(1);
    let types: Vec<(bool, FourCC)> = props.iter().map(|(e, p)| (*e, p.typ())).collect();
    assert_eq!(
        types,
        vec![
            (true, FourCC(*b"hvcC")),
            (false, FourCC(*b"ispe")),
            (false, FourCC(*b"irot")),
        ]
    );
    assert!(iprp.properties_for(2).is_empty());
}

#[test]
fn iref_groups_references_by_type() {
    let mut thmb = 2u16.to_be_bytes().to_vec();
    thmb.extend_from_slice(&1u16.to_be_bytes());
    thmb.extend_from_slice(&1u16.to_be_bytes());
    let mut cdsc = 3u16.to_be_bytes().to_vec();
    cdsc.extend_from_slice(&2u16.to_be_bytes());
    cdsc.extend_from_slice(&1u16.to_be_bytes());
    cdsc.extend_from_slice(&2u16.to_be_bytes());
    let data = full_bx(b"iref", 0, 0, &[bx(b"thmb", &thmb), bx(b"cdsc", &cdsc)].concat());

    let b = parse_one(&data);
    let BoxBody::ItemReference(iref) = &b.body else {
        panic!("expected iref");
    };
    let all: Vec<_> = iref.references().collect();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].reference_type, FourCC(*b"thmb"));
    assert_eq!(all[0].from_item_id, 2);
    assert_eq!(all[0].to_item_ids, vec![1]);
    assert_eq!(all[1].to_item_ids, vec![1, 2]);

    assert_eq!(iref.references_from(3).count(), 1);
    assert_eq!(iref.references_to(1, FourCC(*b"cdsc")).count(), 1);
    assert_eq!(iref.references_to(2, FourCC(*b"thmb")).count(), 0);
}

#[test]
fn iref_v1_has_32_bit_ids() {
    let mut auxl = 0x0001_0000u32.to_be_bytes().to_vec();
    auxl.extend_from_slice(&1u16.to_be_bytes());
    auxl.extend_from_slice(&5u32.to_be_bytes());
    let b = parse_one(&full_bx(b"iref", 1, 0, &bx(b"auxl", &auxl)));
    let BoxBody::ItemReference(iref) = &b.body else {
        panic!("expected iref");
    };
    let r = iref.references().next().unwrap();
    assert_eq!(r.from_item_id, 0x0001_0000);
    assert_eq!(r.to_item_ids, vec![5]);
}

#[test]
fn ipro_holds_protection_schemes() {
    let mut p = 1u16.to_be_bytes().to_vec();
    p.extend_from_slice(&bx(b"sinf", &bx(b"frma", b"hvc1")));
    let b = parse_one(&full_bx(b"ipro", 0, 0, &p));
    let BoxBody::ItemProtection(ipro) = &b.body else {
        panic!("expected ipro");
    };
    assert_eq!(ipro.protection_count, 1);
    assert_eq!(ipro.schemes.len(), 1);
    assert_eq!(ipro.schemes[0].typ(), FourCC(*b"sinf"));
}
