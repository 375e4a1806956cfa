//! Session payload codec
//!
//! Payloads are zlib-compressed at the maximum level before storage.
//! Both directions fall back to passing the bytes through unchanged:
//! an encoder failure stores the raw payload, and a decoder failure
//! (data stored uncompressed by a fallback path) returns the input
//! as-is. A decode must never corrupt data, only pass it through.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compress a payload for storage
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len()), Compression::best());
    if encoder.write_all(data).is_err() {
        return data.to_vec();
    }
    match encoder.finish() {
        Ok(compressed) => compressed,
        Err(_) => data.to_vec(),
    }
}

/// Decompress a stored payload
pub fn decode(data: &[u8]) -> Vec<u8> {
    let mut decoder = ZlibDecoder::new(data);
    let mut inflated = Vec::new();
    match decoder.read_to_end(&mut inflated) {
        Ok(_) => inflated,
        Err(_) => data.to_vec(),
    }
}
