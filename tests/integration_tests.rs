//! Integration tests for stegkit
//!
//! Every carrier kind goes through the full pipeline: frame, optional
//! envelope, embed, container serialization, reload and extract.

use std::io::Cursor;
use std::process::Command;

use hound::{SampleFormat, WavSpec, WavWriter};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;

use stegkit::bits::to_bits;
use stegkit::carrier::emoji::{encode_symbols, TWO_BIT_ALPHABET};
use stegkit::carrier::text::{ZERO_WIDTH_ONE, ZERO_WIDTH_ZERO};
use stegkit::carrier::{BitsPerSymbol, PacketField, TextScheme};
use stegkit::config::NetworkConfig;
use stegkit::{decode, encode, Bundle, Carrier, CarrierKind, StegConfig, StegoError};

fn rgba_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7) as u8, (y * 5) as u8, ((x + y) * 3) as u8, 200])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn wav_bytes(sample_count: usize, bits_per_sample: u16) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..sample_count {
            let sample = ((i % 50) as i32 - 25) * 3;
            if bits_per_sample == 8 {
                writer.write_sample(sample as i8).unwrap();
            } else {
                writer.write_sample((sample * 100) as i16).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn prose(words: usize) -> String {
    let lorem = ["lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing"];
    (0..words).map(|i| lorem[i % lorem.len()]).collect::<Vec<_>>().join(" ")
}

fn lines(count: usize) -> String {
    (0..count).map(|i| format!("line number {}", i)).collect::<Vec<_>>().join("\n")
}

/// Every kind, loaded from container bytes where applicable.
fn carriers() -> Vec<Carrier> {
    let config = StegConfig::default();
    let mut whitespace = config.clone();
    whitespace.text.scheme = TextScheme::TrailingWhitespace;

    vec![
        Carrier::from_bytes(CarrierKind::Image, &rgba_png(32, 32), &config).unwrap(),
        Carrier::from_bytes(CarrierKind::Audio, &wav_bytes(4000, 16), &config).unwrap(),
        Carrier::from_bytes(CarrierKind::Audio, &wav_bytes(4000, 8), &config).unwrap(),
        Carrier::from_bytes(CarrierKind::Text, prose(200).as_bytes(), &config).unwrap(),
        Carrier::from_bytes(CarrierKind::Text, lines(1200).as_bytes(), &whitespace).unwrap(),
        Carrier::fresh(CarrierKind::Emoji, &config).unwrap(),
        Carrier::fresh(CarrierKind::Network, &config).unwrap(),
    ]
}

/// Configuration needed to reload `carrier` from its container bytes.
fn config_for(carrier: &Carrier) -> StegConfig {
    let mut config = StegConfig::default();
    if let Carrier::Text(text) = carrier {
        config.text.scheme = text.scheme();
    }
    config
}

/// Round trip through the serialized container for every carrier.
fn roundtrip(carrier: &Carrier, payload: &[u8], password: Option<&str>, config: &StegConfig) -> Vec<u8> {
    let stego = encode(carrier, payload, password).unwrap();
    let bytes = stego.to_bytes().unwrap();
    let reloaded = Carrier::from_bytes(carrier.kind(), &bytes, config).unwrap();
    decode(&reloaded, password).unwrap()
}

/// Test plain and password round trips for every carrier kind
#[test]
fn test_roundtrip_all_carriers() {
    let payload = b"The quick brown fox jumps over the lazy dog";

    for carrier in carriers() {
        let config = &config_for(&carrier);
        assert_eq!(roundtrip(&carrier, payload, None, config), payload, "{}", carrier.kind());
        assert_eq!(
            roundtrip(&carrier, payload, Some("correct horse"), config),
            payload,
            "{} with password",
            carrier.kind()
        );
    }
}

/// Test that a payload of exactly `capacity` bytes fits and one more does not
#[test]
fn test_capacity_boundary() {
    for carrier in carriers() {
        if carrier.kind() == CarrierKind::Emoji || carrier.kind() == CarrierKind::Network {
            continue;
        }
        let capacity = carrier.capacity();
        assert!(capacity > 0);

        let stego = encode(&carrier, &vec![0xC3; capacity], None).unwrap();
        assert_eq!(decode(&stego, None).unwrap().len(), capacity);

        let result = encode(&carrier, &vec![0xC3; capacity + 1], None);
        assert!(
            matches!(result, Err(StegoError::PayloadTooLarge { .. })),
            "{} accepted capacity + 1",
            carrier.kind()
        );
    }
}

/// Test the generated carriers against their configured budgets
#[test]
fn test_capacity_boundary_generated_carriers() {
    let mut config = StegConfig::default();
    config.emoji.max_symbols = 200;
    config.network = NetworkConfig {
        max_packets: 30,
        ..NetworkConfig::default()
    };

    for kind in [CarrierKind::Emoji, CarrierKind::Network] {
        let carrier = Carrier::fresh(kind, &config).unwrap();
        let capacity = carrier.capacity();

        assert!(encode(&carrier, &vec![1; capacity], None).is_ok());
        assert!(matches!(
            encode(&carrier, &vec![1; capacity + 1], None),
            Err(StegoError::PayloadTooLarge { .. })
        ));
    }
}

/// Test that a wrong password is reported, not silently garbled
#[test]
fn test_wrong_password() {
    let config = StegConfig::default();
    let carrier = Carrier::from_bytes(CarrierKind::Image, &rgba_png(32, 32), &config).unwrap();

    let stego = encode(&carrier, b"top secret", Some("right")).unwrap();
    let result = decode(&stego, Some("wrong"));

    assert!(matches!(result, Err(StegoError::DecryptionFailed)));
}

/// Test that a carrier without hidden data reports a missing frame
#[test]
fn test_frame_not_found() {
    for carrier in carriers() {
        let result = decode(&carrier, None);
        assert!(
            matches!(result, Err(StegoError::FrameNotFound)),
            "{}: {:?}",
            carrier.kind(),
            result
        );
    }
}

/// Test that capacity is a pure function of the carrier
#[test]
fn test_capacity_deterministic() {
    let config = StegConfig::default();
    let png = rgba_png(40, 24);

    let a = Carrier::from_bytes(CarrierKind::Image, &png, &config).unwrap();
    let b = Carrier::from_bytes(CarrierKind::Image, &png, &config).unwrap();

    assert_eq!(a.capacity(), a.capacity());
    assert_eq!(a.capacity(), b.capacity());
    assert_eq!(a.capacity_report(), b.capacity_report());
    // 40 * 24 pixels * 3 bits / 8 - 20 header
    assert_eq!(a.capacity(), 340);
}

/// Test the 64x64 RGBA image scenario end to end, alpha included
#[test]
fn test_rgba_image_hello() {
    let config = StegConfig::default();
    let png = rgba_png(64, 64);
    let carrier = Carrier::from_bytes(CarrierKind::Image, &png, &config).unwrap();
    assert_eq!(carrier.capacity(), 1536 - 20);

    let stego = encode(&carrier, b"Hello Stego Test!", None).unwrap();
    let reloaded = Carrier::from_bytes(CarrierKind::Image, &stego.to_bytes().unwrap(), &config).unwrap();
    assert_eq!(decode(&reloaded, None).unwrap(), b"Hello Stego Test!");

    let (Carrier::Image(before), Carrier::Image(after)) = (&carrier, &reloaded) else {
        panic!("expected image carriers");
    };
    assert!(after.has_alpha());
    let alpha_before: Vec<u8> = before.pixels().chunks(4).map(|p| p[3]).collect();
    let alpha_after: Vec<u8> = after.pixels().chunks(4).map(|p| p[3]).collect();
    assert_eq!(alpha_before, alpha_after);
}

/// Test that an empty payload round trips as an empty payload
#[test]
fn test_empty_payload() {
    for carrier in carriers() {
        let config = config_for(&carrier);
        assert!(roundtrip(&carrier, b"", None, &config).is_empty(), "{}", carrier.kind());
        assert!(roundtrip(&carrier, b"", Some("pw"), &config).is_empty(), "{} with password", carrier.kind());
    }
}

/// Test the documented emoji encoding of 0xA3
#[test]
fn test_emoji_symbols_for_a3() {
    let symbols = encode_symbols(&to_bits(&[0xA3]), BitsPerSymbol::Two);
    let expected: String = [2, 2, 0, 3].iter().map(|&i| TWO_BIT_ALPHABET[i]).collect();

    assert_eq!(symbols.chars().count(), 4);
    assert_eq!(symbols, expected);
}

/// Test that the 3-bit emoji alphabet round trips through prose
#[test]
fn test_emoji_three_bits_in_prose() {
    let mut config = StegConfig::default();
    config.emoji.bits_per_symbol = BitsPerSymbol::Three;

    let cover = Carrier::from_bytes(CarrierKind::Emoji, "Party tonight!".as_bytes(), &config).unwrap();
    let stego = encode(&cover, b"8pm", None).unwrap();

    let text = String::from_utf8(stego.to_bytes().unwrap()).unwrap();
    assert!(text.starts_with("Party tonight!"));

    let reloaded = Carrier::from_bytes(CarrierKind::Emoji, text.as_bytes(), &config).unwrap();
    assert_eq!(decode(&reloaded, None).unwrap(), b"8pm");
}

/// Test the TCP ISN field through a pcap file
#[test]
fn test_network_tcp_isn_roundtrip() {
    let mut config = StegConfig::default();
    config.network.field = PacketField::TcpIsn;

    let carrier = Carrier::fresh(CarrierKind::Network, &config).unwrap();
    let payload = b"exfiltrate nothing".to_vec();
    assert_eq!(roundtrip(&carrier, &payload, Some("pw"), &config), payload);
}

/// Test that the visible text is unchanged by zero-width embedding
#[test]
fn test_zero_width_text_looks_unchanged() {
    let config = StegConfig::default();
    let cover = prose(100);
    let carrier = Carrier::from_bytes(CarrierKind::Text, cover.as_bytes(), &config).unwrap();

    let stego = encode(&carrier, b"hidden", None).unwrap();
    let text = String::from_utf8(stego.to_bytes().unwrap()).unwrap();

    let visible: String = text
        .chars()
        .filter(|&c| c != ZERO_WIDTH_ZERO && c != ZERO_WIDTH_ONE)
        .collect();
    assert_eq!(visible, cover);
}

/// Test that emoji ZWJ sequences in the cover survive and do not disturb extraction
#[test]
fn test_zero_width_text_with_zwj_emoji() {
    let config = StegConfig::default();
    let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
    let cover = format!("{} {} {}", prose(30), family, prose(30));
    let carrier = Carrier::from_bytes(CarrierKind::Text, cover.as_bytes(), &config).unwrap();

    let stego = encode(&carrier, b"hi", None).unwrap();
    let text = String::from_utf8(stego.to_bytes().unwrap()).unwrap();
    assert!(text.starts_with(&cover));

    let quoted = format!("\u{1F468}\u{200D}\u{1F469} forwarded: {}", text);
    let reloaded = Carrier::from_bytes(CarrierKind::Text, quoted.as_bytes(), &config).unwrap();
    assert_eq!(decode(&reloaded, None).unwrap(), b"hi");
}

/// Test that JPEG covers are refused
#[test]
fn test_jpeg_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("photo.jpg");
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    jpeg.extend_from_slice(&[0u8; 64]);
    std::fs::write(&path, &jpeg).unwrap();

    assert_eq!(CarrierKind::from_path(&path), Some(CarrierKind::Image));
    let result = Carrier::from_file(CarrierKind::Image, &path, &StegConfig::default());
    assert!(matches!(result, Err(StegoError::UnsupportedCarrierFormat(_))));
}

/// Test a bundle of several files carried through an image
#[test]
fn test_bundle_through_image() {
    let config = StegConfig::default();
    let carrier = Carrier::from_bytes(CarrierKind::Image, &rgba_png(64, 64), &config).unwrap();

    let mut bundle = Bundle::new();
    bundle.add("notes.txt", b"first file".to_vec()).unwrap();
    bundle.add("keys/id.pub", vec![0xAB; 40]).unwrap();
    let packed = bundle.to_bytes().unwrap();

    let stego = encode(&carrier, &packed, Some("bundle-pw")).unwrap();
    let recovered = Bundle::from_bytes(&decode(&stego, Some("bundle-pw")).unwrap()).unwrap();

    assert_eq!(recovered, bundle);
}

/// Test file save and load through the filesystem
#[test]
fn test_save_and_load_file() {
    let dir = TempDir::new().unwrap();
    let config = StegConfig::default();
    let cover = dir.path().join("cover.wav");
    std::fs::write(&cover, wav_bytes(3000, 16)).unwrap();

    let carrier = Carrier::from_file(CarrierKind::Audio, &cover, &config).unwrap();
    let stego = encode(&carrier, b"on disk", None).unwrap();
    let out = dir.path().join("stego.wav");
    stego.save(&out).unwrap();

    let loaded = Carrier::from_file(CarrierKind::Audio, &out, &config).unwrap();
    assert_eq!(decode(&loaded, None).unwrap(), b"on disk");
}

fn stegkit(dir: &TempDir) -> Command {
    let config = dir.path().join("config.toml");
    if !config.exists() {
        std::fs::write(&config, "").unwrap();
    }
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stegkit"));
    cmd.arg("--config").arg(config);
    cmd
}

/// Test the CLI encode and decode commands on an image
#[test]
fn test_cli_image_roundtrip() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("cover.png");
    let stego = dir.path().join("stego.png");
    let recovered = dir.path().join("recovered.bin");
    std::fs::write(&cover, rgba_png(32, 32)).unwrap();

    let status = stegkit(&dir)
        .args(["encode", "--message", "cli secret", "--password", "pw"])
        .arg("--carrier")
        .arg(&cover)
        .arg("--output")
        .arg(&stego)
        .status()
        .unwrap();
    assert!(status.success());

    let status = stegkit(&dir)
        .args(["decode", "--password", "pw"])
        .arg("--carrier")
        .arg(&stego)
        .arg("--output")
        .arg(&recovered)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(std::fs::read(&recovered).unwrap(), b"cli secret");
}

/// Test CLI bundling of several files into a generated capture
#[test]
fn test_cli_bundle_unpack() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.bin");
    std::fs::write(&a, b"alpha").unwrap();
    std::fs::write(&b, [1u8, 2, 3]).unwrap();
    let capture = dir.path().join("out.pcap");
    let unpacked = dir.path().join("unpacked");

    let status = stegkit(&dir)
        .args(["encode", "--kind", "network", "--file"])
        .arg(&a)
        .arg(&b)
        .arg("--output")
        .arg(&capture)
        .status()
        .unwrap();
    assert!(status.success());

    let status = stegkit(&dir)
        .arg("decode")
        .arg("--carrier")
        .arg(&capture)
        .arg("--unpack")
        .arg(&unpacked)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(std::fs::read(unpacked.join("a.txt")).unwrap(), b"alpha");
    assert_eq!(std::fs::read(unpacked.join("b.bin")).unwrap(), [1, 2, 3]);
}

/// Test that an oversized payload fails the CLI and writes nothing
#[test]
fn test_cli_payload_too_large() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("tiny.png");
    let out = dir.path().join("out.png");
    std::fs::write(&cover, rgba_png(4, 4)).unwrap();

    let status = stegkit(&dir)
        .args(["encode", "--message", "far too long for sixteen pixels"])
        .arg("--carrier")
        .arg(&cover)
        .arg("--output")
        .arg(&out)
        .status()
        .unwrap();

    assert!(!status.success());
    assert!(!out.exists());
}

/// Test the JSON capacity report
#[test]
fn test_cli_capacity_json() {
    let dir = TempDir::new().unwrap();
    let cover = dir.path().join("cover.png");
    std::fs::write(&cover, rgba_png(64, 64)).unwrap();

    let output = stegkit(&dir)
        .args(["capacity", "--json", "--carrier"])
        .arg(&cover)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["kind"], "image");
    assert_eq!(report["capacity_bytes"], 1516);
    assert_eq!(report["encrypted_capacity_bytes"], 1472);
}
