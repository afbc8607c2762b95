use rand::RngCore;

const STATE_BYTES: usize = 5;

/// Random anti-forgery state: CSPRNG bytes, hex-encoded.
pub fn random_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn state_is_hex_of_minimum_length() {
        let state = random_state();
        assert!(state.len() >= 10);
        assert!(state.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn states_do_not_collide() {
        let states: HashSet<String> = (0..10_000).map(|_| random_state()).collect();
        assert_eq!(states.len(), 10_000);
    }
}
