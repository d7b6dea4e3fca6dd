//! Statement fingerprint.
//!
//! SQL_ID style digest: MD5 of the statement text followed by a NUL byte,
//! keeping the last 8 bytes and printing them as 13 base-32 characters.
//! No normalization is done, so two statements share a fingerprint only
//! if they are byte-for-byte identical (or collide, which we accept).
use std::fmt;

const ALPHABET: &[u8; 32] = b"0123456789abcdfghjkmnpqrstuvwxyz";
const LENGTH: usize = 13;

/// Statement fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    value: u64,
}

impl Fingerprint {
    /// Fingerprint a statement.
    pub fn new(statement: &str) -> Self {
        let mut context = md5::Context::new();
        context.consume(statement.as_bytes());
        context.consume([0u8]);
        let digest = context.compute().0;

        let low = u32::from_le_bytes([digest[8], digest[9], digest[10], digest[11]]) as u64;
        let high = u32::from_le_bytes([digest[12], digest[13], digest[14], digest[15]]) as u64;

        Self {
            value: (high << 32) | low,
        }
    }

    /// Numeric value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Short printable identifier.
    pub fn id(&self) -> String {
        let mut id = [0u8; LENGTH];
        for (i, c) in id.iter_mut().rev().enumerate() {
            let index = ((self.value >> (5 * i)) & 31) as usize;
            *c = ALPHABET[index];
        }
        id.iter().map(|c| *c as char).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deterministic() {
        let query = "SELECT * FROM employees WHERE department_id = :dept";
        assert_eq!(Fingerprint::new(query), Fingerprint::new(query));
        assert_eq!(Fingerprint::new(query).id(), Fingerprint::new(query).id());
    }

    #[test]
    fn test_id_shape() {
        let id = Fingerprint::new("SELECT 1 FROM DUAL").id();
        assert_eq!(id.len(), LENGTH);
        assert!(id.bytes().all(|c| ALPHABET.contains(&c)));
    }

    #[test]
    fn test_no_normalization() {
        let a = Fingerprint::new("SELECT 1 FROM DUAL");
        let b = Fingerprint::new("select 1 from dual");
        let c = Fingerprint::new("SELECT 1  FROM DUAL");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_value_matches_id() {
        let fingerprint = Fingerprint::new("SELECT SYSDATE FROM DUAL");
        let decoded = fingerprint.id().bytes().fold(0u128, |acc, c| {
            let index = ALPHABET.iter().position(|a| *a == c).unwrap() as u128;
            (acc << 5) | index
        });
        assert_eq!(decoded, fingerprint.value() as u128);
    }
}
