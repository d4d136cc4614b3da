//! Splitting of request entries into API-sized chunks

/// Maximum number of entries SQS accepts in a single batch request
pub const MAX_BATCH_ENTRIES: usize = 10;

/// Splits `items` into consecutive chunks of at most `max_size` entries
///
/// Every chunk but the last holds exactly `max_size` entries. A `max_size` of
/// zero is treated as one.
#[must_use]
pub fn chunk<T>(items: &[T], max_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(max_size.max(1))
}
