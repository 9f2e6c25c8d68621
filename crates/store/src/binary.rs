use crate::config::ByteOrder;
use crate::error::StoreError;

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Decode a packed `f32` buffer into `dimensions`-length vectors, in encounter order.
pub fn decode_embeddings(
    bytes: &[u8],
    dimensions: usize,
    byte_order: ByteOrder,
) -> Result<Vec<Vec<f32>>, StoreError> {
    if dimensions == 0 {
        return Err(StoreError::InvalidDimensions);
    }
    if bytes.len() % F32_BYTES != 0 {
        return Err(StoreError::TruncatedFloat { len: bytes.len() });
    }
    let floats = bytes.len() / F32_BYTES;
    if floats % dimensions != 0 {
        return Err(StoreError::PartialVector { floats, dimensions });
    }

    let little = byte_order.is_little();
    let stride = dimensions * F32_BYTES;
    let vectors = bytes
        .chunks_exact(stride)
        .map(|chunk| {
            chunk
                .chunks_exact(F32_BYTES)
                .map(|b| {
                    let raw = [b[0], b[1], b[2], b[3]];
                    if little {
                        f32::from_le_bytes(raw)
                    } else {
                        f32::from_be_bytes(raw)
                    }
                })
                .collect()
        })
        .collect();

    Ok(vectors)
}

/// Inverse of [`decode_embeddings`]: concatenate vectors as packed `f32`s.
pub fn encode_embeddings<V: AsRef<[f32]>>(vectors: &[V], byte_order: ByteOrder) -> Vec<u8> {
    let little = byte_order.is_little();
    let total: usize = vectors.iter().map(|v| v.as_ref().len()).sum();
    let mut out = Vec::with_capacity(total * F32_BYTES);
    for v in vectors {
        for &x in v.as_ref() {
            if little {
                out.extend_from_slice(&x.to_le_bytes());
            } else {
                out.extend_from_slice(&x.to_be_bytes());
            }
        }
    }
    out
}
