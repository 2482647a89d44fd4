use crate::utils::counter::Counter;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};

/// Decodes `data` strictly. Malformed input is an error instead of being replaced.
pub fn decode_to_string(encoding: &'static Encoding, data: &[u8]) -> Result<String, anyhow::Error> {
    match encoding.decode_without_bom_handling_and_without_replacement(data) {
        Some(s) => Ok(s.into_owned()),
        None => Err(anyhow::anyhow!("Failed to decode {}", encoding.name())),
    }
}

/// Encodes `data` into `encoding`.
///
/// Characters which cannot be represented are an error when `check` is set.
/// Otherwise they are replaced with numeric character references and a warning is counted.
/// UTF-16 output starts with a byte order mark.
pub fn encode_string(
    encoding: &'static Encoding,
    data: &str,
    check: bool,
    counter: &Counter,
) -> Result<Vec<u8>, anyhow::Error> {
    if encoding == UTF_16LE || encoding == UTF_16BE {
        let le = encoding == UTF_16LE;
        let mut out = Vec::with_capacity(data.len() * 2 + 2);
        for unit in std::iter::once(0xFEFF).chain(data.encode_utf16()) {
            if le {
                out.extend_from_slice(&unit.to_le_bytes());
            } else {
                out.extend_from_slice(&unit.to_be_bytes());
            }
        }
        return Ok(out);
    }
    if encoding.output_encoding() != encoding {
        return Err(anyhow::anyhow!(
            "Encoding {} can not be used as output",
            encoding.name()
        ));
    }
    let result = encoding.encode(data);
    if result.2 {
        if check {
            return Err(anyhow::anyhow!(
                "Some characters could not be encoded in {}",
                encoding.name()
            ));
        }
        tracing::warn!(
            "Some characters could not be encoded in {} and were replaced",
            encoding.name()
        );
        counter.inc_warning();
    }
    Ok(result.0.into_owned())
}

#[test]
fn test_decode_to_string() {
    assert_eq!(
        decode_to_string(
            encoding_rs::UTF_8,
            &[228, 184, 173, 230, 150, 135, 230, 181, 139, 232, 175, 149]
        )
        .unwrap(),
        "中文测试".to_string()
    );
    assert_eq!(
        decode_to_string(
            encoding_rs::SHIFT_JIS,
            &[
                130, 171, 130, 225, 130, 215, 130, 194, 130, 187, 130, 211, 130, 198
            ]
        )
        .unwrap(),
        "きゃべつそふと".to_string()
    );
    assert_eq!(
        decode_to_string(encoding_rs::WINDOWS_1252, &[0x63, 0x61, 0x66, 0xE9]).unwrap(),
        "café".to_string()
    );
    assert!(decode_to_string(encoding_rs::UTF_8, &[0x63, 0x61, 0x66, 0xE9]).is_err());
}

#[test]
fn test_encode_string() {
    let counter = Counter::new();
    assert_eq!(
        encode_string(encoding_rs::GBK, "中文", true, &counter).unwrap(),
        vec![214, 208, 206, 196]
    );
    assert_eq!(
        encode_string(encoding_rs::WINDOWS_1252, "café", true, &counter).unwrap(),
        vec![0x63, 0x61, 0x66, 0xE9]
    );
    assert_eq!(
        encode_string(UTF_16LE, "ab", true, &counter).unwrap(),
        vec![0xFF, 0xFE, 0x61, 0x00, 0x62, 0x00]
    );
    assert_eq!(
        encode_string(UTF_16BE, "ab", true, &counter).unwrap(),
        vec![0xFE, 0xFF, 0x00, 0x61, 0x00, 0x62]
    );
    assert_eq!(counter.warnings(), 0);
}

#[test]
fn test_encode_unmappable() {
    let counter = Counter::new();
    assert!(encode_string(encoding_rs::WINDOWS_1252, "中", true, &counter).is_err());
    assert_eq!(
        encode_string(encoding_rs::WINDOWS_1252, "a中", false, &counter).unwrap(),
        b"a&#20013;".to_vec()
    );
    assert_eq!(counter.warnings(), 1);
}
