//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Deterministic UUIDv5 for `name` within `namespace`
pub fn name_based(namespace: &Uuid, name: &str) -> Uuid {
    Uuid::new_v5(namespace, name.as_bytes())
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_v4_and_unique() {
        let a = generate();
        let b = generate();
        assert_eq!(a.get_version_num(), 4);
        assert_ne!(a, b);
    }

    #[test]
    fn test_name_based_is_deterministic() {
        let ns = Uuid::from_u128(0x1234);
        let a = name_based(&ns, "studio");
        assert_eq!(a.get_version_num(), 5);
        assert_eq!(a, name_based(&ns, "studio"));
        assert_ne!(a, name_based(&ns, "other"));
    }

    #[test]
    fn test_parse_round_trips_display() {
        let id = generate();
        assert_eq!(parse(&id.to_string()).unwrap(), id);
        assert!(parse("not-a-uuid").is_err());
    }
}
