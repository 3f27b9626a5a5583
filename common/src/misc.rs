use rand::{distributions::Alphanumeric, Rng};

pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::random_string;

    #[test]
    fn random_string_length() {
        let a = random_string(16);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|x| x.is_ascii_alphanumeric()));
    }
}
