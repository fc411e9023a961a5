use rand::{Rng, distr::Alphanumeric};

/// Random string of `length` ASCII letters and digits.
pub fn make_random_hash(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_has_requested_length_and_charset() {
        let hash = make_random_hash(32);
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(make_random_hash(0), "");
    }
}
