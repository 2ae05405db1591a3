/// Split `items` into contiguous batches of at most `batch_size`, keeping order.
///
/// A `batch_size` of 0 is treated as 1.
pub fn create_batches<T: Clone>(items: &[T], batch_size: usize) -> Vec<Vec<T>> {
    items
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}
