use anyhow::{anyhow, Context, Result};

const UTF16LE_BOM: [u8; 2] = [0xff, 0xfe];
const UTF16BE_BOM: [u8; 2] = [0xfe, 0xff];
const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];

/// Decodes registry exports and pattern sources. UTF-16 requires a BOM;
/// anything without one is read as UTF-8.
pub fn decode_text_bytes(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&UTF16LE_BOM) {
        return decode_utf16(rest, u16::from_le_bytes).context("invalid UTF-16LE text");
    }
    if let Some(rest) = bytes.strip_prefix(&UTF16BE_BOM) {
        return decode_utf16(rest, u16::from_be_bytes).context("invalid UTF-16BE text");
    }
    let rest = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(rest.to_vec()).context("invalid UTF-8 text")
}

/// Encodes text the way regedit writes `.reg` files: UTF-16LE with a BOM.
pub fn encode_registry_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + text.len() * 2);
    out.extend_from_slice(&UTF16LE_BOM);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(anyhow!("odd byte length {}", bytes.len()));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|err| anyhow!(err))
}
