//! Sample buffer generators for empty-tile detection tests.

/// A band-interleaved buffer with every sample set to `value`.
pub fn filled<T: Copy>(width: usize, height: usize, bands: usize, value: T) -> Vec<T> {
    vec![value; width * height * bands]
}

/// A filled buffer with a single sample changed at pixel (x, y), band 0.
pub fn with_spot<T: Copy>(
    width: usize,
    height: usize,
    bands: usize,
    fill: T,
    spot: T,
    x: usize,
    y: usize,
) -> Vec<T> {
    let mut samples = filled(width, height, bands, fill);
    samples[(y * width + x) * bands] = spot;
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_spot() {
        let samples = with_spot(4, 2, 3, 0u8, 9, 1, 1);
        assert_eq!(samples.len(), 24);
        assert_eq!(samples[15], 9);
        assert_eq!(samples.iter().filter(|s| **s != 0).count(), 1);
    }
}
