use rand::Rng;

// Opaque unique-ID provider: "<kind>_<32 hex chars>". 128 bits of
// randomness, so collisions are not a practical concern.
pub fn hex_id(kind: &str) -> String {
    let mut rng = rand::thread_rng();
    let mut id = String::with_capacity(kind.len() + 33);
    id.push_str(kind);
    id.push('_');
    for _ in 0..16 {
        id.push_str(&format!("{:02x}", rng.gen::<u8>()));
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn carries_kind_prefix() {
        let id = hex_id("prog");
        assert!(id.starts_with("prog_"));
    }

    #[test]
    fn has_expected_length() {
        assert_eq!(hex_id("prog").len(), "prog_".len() + 32);
    }

    #[test]
    fn suffix_is_lowercase_hex() {
        let id = hex_id("prog");
        let suffix = id.strip_prefix("prog_").unwrap();
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn ids_do_not_collide_in_practice() {
        let ids: HashSet<String> = (0..1000).map(|_| hex_id("prog")).collect();
        assert_eq!(ids.len(), 1000);
    }
}
