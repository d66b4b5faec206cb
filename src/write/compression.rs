use crate::compression::{create_codec, Compression};
use crate::error::Result;

/// Compresses a page body as a single blob. Returns the input unchanged when
/// `compression` is `Uncompressed`.
pub fn compress(compression: Compression, uncompressed: Vec<u8>) -> Result<Vec<u8>> {
    let codec = create_codec(&compression)?;
    if let Some(mut codec) = codec {
        let mut compressed = Vec::with_capacity(uncompressed.len());
        codec.compress(&uncompressed, &mut compressed)?;
        Ok(compressed)
    } else {
        Ok(uncompressed)
    }
}
