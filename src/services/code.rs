use rand::RngCore;

/// Random bytes per ticket code.
const CODE_BYTES: usize = 4;

/// Length of a rendered code: two hex digits per byte plus separators.
pub const CODE_LEN: usize = CODE_BYTES * 3 - 1;

/// Generates a scanner-readable code such as `"3F A0 7C 12"`.
pub fn generate_code() -> String {
    let mut bytes = [0u8; CODE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format_code(&bytes)
}

fn format_code(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_code() {
        assert_eq!(format_code(&[0x3f, 0xa0, 0x07, 0x12]), "3F A0 07 12");
    }

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..32 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            for (i, c) in code.chars().enumerate() {
                if i % 3 == 2 {
                    assert_eq!(c, ' ');
                } else {
                    assert!(c.is_ascii_hexdigit() && !c.is_ascii_lowercase());
                }
            }
        }
    }
}
