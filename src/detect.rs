//! Character encoding detection from a file's leading bytes.
use crate::utils::files::read_head;
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use std::path::Path;

/// Number of leading bytes inspected per file.
pub const SAMPLE_LEN: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection {
    pub encoding: &'static Encoding,
    /// Length of the byte order mark, 0 if none.
    pub bom_len: usize,
}

/// Guesses the encoding of `sample`.
///
/// `complete` must be true when `sample` holds the whole file, so that a multibyte
/// sequence cut off at the end of a partial sample does not rule out UTF-8.
pub fn detect_encoding(sample: &[u8], complete: bool) -> Detection {
    if let Some((encoding, bom_len)) = Encoding::for_bom(sample) {
        return Detection { encoding, bom_len };
    }
    if sample.is_ascii() {
        return Detection {
            encoding: UTF_8,
            bom_len: 0,
        };
    }
    let mut detector = EncodingDetector::new();
    detector.feed(sample, complete);
    Detection {
        encoding: detector.guess(None, true),
        bom_len: 0,
    }
}

/// Reads the first [SAMPLE_LEN] bytes of `path` and guesses their encoding.
pub fn detect_file<F: AsRef<Path> + ?Sized>(path: &F) -> std::io::Result<Detection> {
    let (sample, complete) = read_head(path, SAMPLE_LEN)?;
    Ok(detect_encoding(&sample, complete))
}

#[cfg(test)]
pub(crate) const FRENCH_TEXT: &str = "Le cœur a ses raisons que la raison ne connaît point. \
    Là-bas, près de la fenêtre, l'élève étudiait très sérieusement ses leçons de français. \
    Été comme hiver, il préférait le café crème à la crêpe déjà froide. \
    « Où êtes-vous allés ? » demanda la maîtresse d'école, étonnée et très agacée.\n";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom() {
        let d = detect_encoding(b"\xEF\xBB\xBFhello", true);
        assert_eq!(d.encoding, UTF_8);
        assert_eq!(d.bom_len, 3);
        let d = detect_encoding(b"\xFF\xFEh\x00i\x00", true);
        assert_eq!(d.encoding, encoding_rs::UTF_16LE);
        assert_eq!(d.bom_len, 2);
        let d = detect_encoding(b"\xFE\xFF\x00h\x00i", true);
        assert_eq!(d.encoding, encoding_rs::UTF_16BE);
        assert_eq!(d.bom_len, 2);
    }

    #[test]
    fn test_ascii_is_utf8() {
        let d = detect_encoding(b"1\n00:00:01,000 --> 00:00:02,000\nHello\n", true);
        assert_eq!(d.encoding, UTF_8);
        assert_eq!(d.bom_len, 0);
        assert_eq!(detect_encoding(b"", true).encoding, UTF_8);
    }

    #[test]
    fn test_utf8() {
        let d = detect_encoding(FRENCH_TEXT.as_bytes(), true);
        assert_eq!(d.encoding, UTF_8);
    }

    #[test]
    fn test_latin1() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(FRENCH_TEXT);
        let d = detect_encoding(&bytes, true);
        assert_eq!(d.encoding, encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_truncated_utf8_sample() {
        // "é" split across the sample boundary
        let mut sample = FRENCH_TEXT.as_bytes().to_vec();
        sample.push(0xC3);
        assert_eq!(detect_encoding(&sample, false).encoding, UTF_8);
    }

    #[test]
    fn test_detect_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let mut data = FRENCH_TEXT.repeat(20).into_bytes();
        assert!(data.len() > SAMPLE_LEN);
        data.extend_from_slice(&[0xE9]);
        std::fs::write(&path, &data).unwrap();
        // Only the head is inspected, the trailing invalid byte is never seen.
        assert_eq!(detect_file(&path).unwrap().encoding, UTF_8);
    }
}
