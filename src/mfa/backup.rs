//! Single-use backup-code generation.
//!
//! Codes substitute for a TOTP code when the authenticator device is
//! unavailable. Generation is stateless; matching and consumption are the
//! store's atomic `ConsumeBackupCode` transition.

use rand::{rngs::OsRng, RngCore};

/// Codes issued per provisioning.
pub const BACKUP_CODE_COUNT: usize = 8;

const CODE_BYTES: usize = 8;
const GROUP_SIZE: usize = 4;

/// Generate a fresh set of backup codes.
///
/// Each code is 16 lowercase hex characters (64 bits from the OS RNG) in
/// four dash-separated groups, e.g. `ab12-cd34-ef56-7890`. Collisions are
/// negligible at this entropy, but duplicates are regenerated anyway so the
/// set is always exactly [`BACKUP_CODE_COUNT`] distinct codes.
#[must_use]
pub fn generate_backup_codes() -> Vec<String> {
    let mut rng = OsRng;
    let mut codes: Vec<String> = Vec::with_capacity(BACKUP_CODE_COUNT);
    while codes.len() < BACKUP_CODE_COUNT {
        let code = generate_code(&mut rng);
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}

fn generate_code<R: RngCore + ?Sized>(rng: &mut R) -> String {
    let mut raw = [0u8; CODE_BYTES];
    rng.fill_bytes(&mut raw);

    let mut code = String::with_capacity(CODE_BYTES * 2 + CODE_BYTES * 2 / GROUP_SIZE);
    for (index, byte) in raw.iter().enumerate() {
        if index > 0 && (index * 2) % GROUP_SIZE == 0 {
            code.push('-');
        }
        code.push_str(&format!("{byte:02x}"));
    }
    code
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_well_formed(code: &str) -> bool {
        let groups: Vec<&str> = code.split('-').collect();
        groups.len() == 4
            && groups.iter().all(|group| {
                group.len() == GROUP_SIZE
                    && group
                        .bytes()
                        .all(|byte| byte.is_ascii_hexdigit() && !byte.is_ascii_uppercase())
            })
    }

    #[test]
    fn generates_exactly_eight_codes() {
        assert_eq!(generate_backup_codes().len(), BACKUP_CODE_COUNT);
    }

    #[test]
    fn codes_are_grouped_hex() {
        for code in generate_backup_codes() {
            assert!(is_well_formed(&code), "malformed code: {code}");
        }
    }

    #[test]
    fn codes_are_pairwise_distinct() {
        let codes = generate_backup_codes();
        let unique: HashSet<&String> = codes.iter().collect();
        assert_eq!(unique.len(), BACKUP_CODE_COUNT);
    }

    #[test]
    fn batches_do_not_repeat() {
        let first = generate_backup_codes();
        let second = generate_backup_codes();
        assert_ne!(first, second);
    }
}
