//! DNS wire-format name codec.
//!
//! A wire name is a sequence of `(length, label bytes)` pairs terminated by a
//! zero length byte. Labels come out in wire order, so the root-most label is
//! last: `\x03sub\x07example\x03eth\x00` decodes to `["sub", "example", "eth"]`.

use crate::base::gatewayerror::GatewayError;

/// Decode a DNS wire-format name into its labels.
///
/// Bytes after the terminator are ignored.
pub fn decode_labels(buf: &[u8]) -> Result<Vec<String>, GatewayError> {
    let mut labels = Vec::new();
    let mut pos = 0;
    loop {
        let len = *buf.get(pos).ok_or(GatewayError::MalformedName("missing terminator"))? as usize;
        pos += 1;
        if len == 0 {
            return Ok(labels);
        }
        let label = buf
            .get(pos..pos + len)
            .ok_or(GatewayError::MalformedName("label overruns buffer"))?;
        labels.push(String::from_utf8_lossy(label).into_owned());
        pos += len;
    }
}

/// Encode labels into DNS wire format.
///
/// Empty labels and labels longer than 255 bytes cannot be represented.
pub fn encode_labels<S: AsRef<str>>(labels: &[S]) -> Result<Vec<u8>, GatewayError> {
    let mut out = Vec::with_capacity(labels.iter().map(|l| l.as_ref().len() + 1).sum::<usize>() + 1);
    for label in labels {
        let bytes = label.as_ref().as_bytes();
        if bytes.is_empty() {
            return Err(GatewayError::MalformedName("empty label"));
        }
        let len = u8::try_from(bytes.len()).map_err(|_| GatewayError::MalformedName("label too long"))?;
        out.push(len);
        out.extend_from_slice(bytes);
    }
    out.push(0);
    Ok(out)
}

/// Encode a dotted name (`"sub.example.eth"`) into DNS wire format.
pub fn encode_name(name: &str) -> Result<Vec<u8>, GatewayError> {
    if name.is_empty() {
        return Ok(vec![0]);
    }
    let labels: Vec<&str> = name.split('.').collect();
    encode_labels(&labels)
}
