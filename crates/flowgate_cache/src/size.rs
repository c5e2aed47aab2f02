//! Byte-size estimates for cached values.

/// Approximate in-memory size of a cached value, used for the byte budget.
///
/// Estimates cover the payload only, not allocator or map overhead.
pub trait SizeEstimate {
    /// Estimated size in bytes.
    fn estimated_bytes(&self) -> usize;
}

impl SizeEstimate for [f32] {
    fn estimated_bytes(&self) -> usize {
        std::mem::size_of_val(self)
    }
}

impl SizeEstimate for [f64] {
    fn estimated_bytes(&self) -> usize {
        std::mem::size_of_val(self)
    }
}

impl SizeEstimate for Vec<f32> {
    fn estimated_bytes(&self) -> usize {
        self.as_slice().estimated_bytes()
    }
}

impl SizeEstimate for Vec<f64> {
    fn estimated_bytes(&self) -> usize {
        self.as_slice().estimated_bytes()
    }
}

impl SizeEstimate for str {
    fn estimated_bytes(&self) -> usize {
        self.len()
    }
}

impl SizeEstimate for String {
    fn estimated_bytes(&self) -> usize {
        self.len()
    }
}

// Serialised length
impl SizeEstimate for serde_json::Value {
    fn estimated_bytes(&self) -> usize {
        self.to_string().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_sizes() {
        assert_eq!(vec![0.0_f32; 384].estimated_bytes(), 1536);
        assert_eq!(vec![0.0_f64; 3].estimated_bytes(), 24);
        assert_eq!(Vec::<f32>::new().estimated_bytes(), 0);
    }

    #[test]
    fn test_json_size_is_serialised_length() {
        let value = serde_json::json!({"a": [1, 2]});
        assert_eq!(value.estimated_bytes(), r#"{"a":[1,2]}"#.len());
    }
}
