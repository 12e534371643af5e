use ndarray::ArrayView1;

/// Euclidean (L2) distance.
pub fn euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Bray-Curtis dissimilarity `sum|a - b| / sum|a + b|`.
///
/// With a zero denominator the rows are identical only if the numerator is
/// zero too; rows that cancel out (`5` against `-5`) are maximally dissimilar.
pub fn bray_curtis(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    let mut num = 0.0;
    let mut den = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        num += (x - y).abs();
        den += (x + y).abs();
    }
    if den == 0.0 {
        if num == 0.0 {
            0.0
        } else {
            1.0
        }
    } else {
        num / den
    }
}

/// Cosine similarity. Two zero vectors count as identical (1.0), a zero vector
/// against a non-zero one as unrelated (0.0).
pub fn cosine_similarity(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    let dot = a.dot(&b);
    let na = a.dot(&a).sqrt();
    let nb = b.dot(&b).sqrt();
    match (na == 0.0, nb == 0.0) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        _ => (dot / (na * nb)).clamp(-1.0, 1.0),
    }
}

/// Jaccard similarity of the sets of non-zero features.
pub fn jaccard_similarity(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    let mut intersection = 0usize;
    let mut union = 0usize;
    for (x, y) in a.iter().zip(b.iter()) {
        let (in_a, in_b) = (*x != 0.0, *y != 0.0);
        if in_a && in_b {
            intersection += 1;
        }
        if in_a || in_b {
            union += 1;
        }
    }
    if union == 0 {
        1.0
    } else {
        intersection as f64 / union as f64
    }
}
