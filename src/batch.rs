//! Batch partitioning of device identifiers.

use crate::config::{SERIAL_NUMBER_PREFIX, SERIAL_NUMBER_WIDTH};
use crate::error_handling::ConfigError;
use crate::models::DeviceId;

/// An ordered group of identifiers fetched in one logical request.
///
/// `index` is the zero-based position of the batch within its run and is what
/// failed-batch records refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub index: usize,
    pub ids: Vec<DeviceId>,
}

impl Batch {
    pub fn new(index: usize, ids: Vec<DeviceId>) -> Self {
        Self { index, ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Splits `ids` into contiguous batches of `size`, the last one possibly shorter.
///
/// Order is preserved and every identifier lands in exactly one batch. An empty
/// input yields no batches.
///
/// # Errors
///
/// Returns `ConfigError::InvalidBatchSize` if `size` is 0.
pub fn partition(ids: &[DeviceId], size: usize) -> Result<Vec<Batch>, ConfigError> {
    if size == 0 {
        return Err(ConfigError::InvalidBatchSize(size));
    }
    Ok(ids
        .chunks(size)
        .enumerate()
        .map(|(index, chunk)| Batch::new(index, chunk.to_vec()))
        .collect())
}

/// Generates `count` serial numbers: `SN-000`, `SN-001`, ...
///
/// Indices wider than three digits are not truncated (`SN-1000`).
pub fn generate_device_ids(count: usize) -> Vec<DeviceId> {
    (0..count)
        .map(|i| {
            DeviceId::new(format!(
                "{SERIAL_NUMBER_PREFIX}{i:0width$}",
                width = SERIAL_NUMBER_WIDTH
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<DeviceId> {
        generate_device_ids(n)
    }

    #[test]
    fn test_generate_device_ids_format() {
        let generated = generate_device_ids(3);
        let as_str: Vec<&str> = generated.iter().map(DeviceId::as_str).collect();
        assert_eq!(as_str, vec!["SN-000", "SN-001", "SN-002"]);
        assert_eq!(generate_device_ids(1001)[1000].as_str(), "SN-1000");
        assert!(generate_device_ids(0).is_empty());
    }

    #[test]
    fn test_partition_concatenation_preserves_input() {
        for total in [1usize, 9, 10, 11, 25, 100, 101] {
            for size in [1usize, 3, 10, 50] {
                let input = ids(total);
                let batches = partition(&input, size).unwrap();

                let rejoined: Vec<DeviceId> =
                    batches.iter().flat_map(|b| b.ids.iter().cloned()).collect();
                assert_eq!(rejoined, input, "total={total} size={size}");

                let (last, full) = batches.split_last().unwrap();
                assert!(full.iter().all(|b| b.len() == size));
                assert!(!last.is_empty() && last.len() <= size);
            }
        }
    }

    #[test]
    fn test_partition_indices_are_sequential() {
        let batches = partition(&ids(25), 10).unwrap();
        let indices: Vec<usize> = batches.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(batches[2].len(), 5);
        assert_eq!(batches[1].ids[0].as_str(), "SN-010");
    }

    #[test]
    fn test_partition_empty_input() {
        assert!(partition(&[], 10).unwrap().is_empty());
    }

    #[test]
    fn test_partition_zero_size_is_rejected() {
        assert_eq!(
            partition(&ids(5), 0),
            Err(ConfigError::InvalidBatchSize(0))
        );
    }

    #[test]
    fn test_partition_is_idempotent() {
        let input = ids(37);
        assert_eq!(partition(&input, 10), partition(&input, 10));
    }
}
