use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The payload the payment provider signs: `orderId|referenceId`.
fn signing_payload(order_id: &str, reference_id: &str) -> String {
    format!("{order_id}|{reference_id}")
}

/// Compute the hex-encoded HMAC-SHA256 confirmation signature for an
/// order/reference pair under the shared secret.
pub fn compute_signature(secret: &[u8], order_id: &str, reference_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(signing_payload(order_id, reference_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a supplied confirmation signature.
///
/// Uses constant-time comparison to prevent timing attacks. A supplied
/// signature that is not valid hex decodes to a fixed-length zero buffer so
/// rejection does not short-circuit.
pub fn verify_signature(
    secret: &[u8],
    order_id: &str,
    reference_id: &str,
    supplied_signature: &str,
) -> bool {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(signing_payload(order_id, reference_id).as_bytes());

    let supplied = hex::decode(supplied_signature).unwrap_or_else(|_| vec![0u8; 32]);

    // hmac crate's verify_slice uses constant-time comparison
    mac.verify_slice(&supplied).is_ok()
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().fold(String::new(), |mut s, b| {
            use std::fmt::Write;
            let _ = write!(s, "{b:02x}");
            s
        })
    }

    pub fn decode(s: &str) -> Result<Vec<u8>, ()> {
        if s.len() % 2 != 0 || !s.is_ascii() {
            return Err(());
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| ()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_roundtrip() {
        let secret = b"test-secret";
        let sig = compute_signature(secret, "order_1", "pay_1");
        assert!(verify_signature(secret, "order_1", "pay_1", &sig));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let sig = compute_signature(b"secret-1", "order_1", "pay_1");
        assert!(!verify_signature(b"secret-2", "order_1", "pay_1", &sig));
    }

    #[test]
    fn test_tampered_order_id_rejected() {
        let secret = b"test-secret";
        let sig = compute_signature(secret, "order_1", "pay_1");
        assert!(!verify_signature(secret, "order_2", "pay_1", &sig));
    }

    #[test]
    fn test_tampered_reference_id_rejected() {
        let secret = b"test-secret";
        let sig = compute_signature(secret, "order_1", "pay_1");
        assert!(!verify_signature(secret, "order_1", "pay_2", &sig));
    }

    #[test]
    fn test_every_single_character_mutation_rejected() {
        let secret = b"test-secret";
        let sig = compute_signature(secret, "order_1", "pay_1");

        for i in 0..sig.len() {
            let original = sig.as_bytes()[i];
            // Pick a different hex digit for this position
            let replacement = if original == b'0' { b'1' } else { b'0' };
            let mut mutated = sig.clone().into_bytes();
            mutated[i] = replacement;
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(
                !verify_signature(secret, "order_1", "pay_1", &mutated),
                "mutation at position {i} was accepted"
            );
        }
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(!verify_signature(b"secret", "order_1", "pay_1", "not-hex-zz"));
    }

    #[test]
    fn test_odd_length_hex_rejected() {
        let secret = b"test-secret";
        let mut sig = compute_signature(secret, "order_1", "pay_1");
        sig.pop();
        assert!(!verify_signature(secret, "order_1", "pay_1", &sig));
    }
}
