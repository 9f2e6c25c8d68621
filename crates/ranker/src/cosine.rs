use crate::RankError;

/// Chunk size for the auto-vectorized accumulation loops.
const SIMD_CHUNK_SIZE: usize = 32;

/// Cosine similarity of two equal-length vectors.
///
/// Returns `0.0` when either vector has zero magnitude, and also when the
/// inputs contain NaN or infinities. Finite results are clamped to `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, RankError> {
    if a.len() != b.len() {
        return Err(RankError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
            url: None,
        });
    }
    Ok(cosine_with_norm(a, norm(a), b))
}

/// Euclidean norm, accumulated in `f64`.
#[inline]
pub(crate) fn norm(v: &[f32]) -> f64 {
    let mut sum = 0.0f64;
    let mut chunks = v.chunks_exact(SIMD_CHUNK_SIZE);
    for chunk in &mut chunks {
        sum += sum_squares(chunk);
    }
    sum += sum_squares(chunks.remainder());
    sum.sqrt()
}

/// Cosine against a query whose norm has already been computed. Lengths must
/// match; callers check.
#[inline]
pub(crate) fn cosine_with_norm(query: &[f32], query_norm: f64, doc: &[f32]) -> f32 {
    debug_assert_eq!(query.len(), doc.len());

    let mut dot = 0.0f64;
    let mut doc_sq = 0.0f64;

    let mut q_chunks = query.chunks_exact(SIMD_CHUNK_SIZE);
    let mut d_chunks = doc.chunks_exact(SIMD_CHUNK_SIZE);
    for (q, d) in (&mut q_chunks).zip(&mut d_chunks) {
        dot += dot_chunk(q, d);
        doc_sq += sum_squares(d);
    }
    let (q_rest, d_rest) = (q_chunks.remainder(), d_chunks.remainder());
    dot += dot_chunk(q_rest, d_rest);
    doc_sq += sum_squares(d_rest);

    let doc_norm = doc_sq.sqrt();
    if query_norm == 0.0 || doc_norm == 0.0 {
        return 0.0;
    }

    let sim = dot / (query_norm * doc_norm);
    if sim.is_finite() {
        sim.clamp(-1.0, 1.0) as f32
    } else {
        0.0
    }
}

#[inline(always)]
fn dot_chunk(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}

#[inline(always)]
fn sum_squares(a: &[f32]) -> f64 {
    a.iter().map(|&x| f64::from(x) * f64::from(x)).sum()
}
