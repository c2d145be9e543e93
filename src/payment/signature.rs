use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 over `<gateway_order_id>|<payment_id>`, the value the
/// gateway hands back to the client after a successful payment.
pub fn sign(secret: &str, gateway_order_id: &str, payment_id: &str) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(payload(gateway_order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison of a client-supplied hex signature against the
/// locally computed one.
pub fn verify(secret: &str, gateway_order_id: &str, payment_id: &str, supplied: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload(gateway_order_id, payment_id).as_bytes());

    let Ok(raw) = hex::decode(supplied) else {
        return false;
    };
    mac.verify_slice(&raw).is_ok()
}

fn payload(gateway_order_id: &str, payment_id: &str) -> String {
    format!("{gateway_order_id}|{payment_id}")
}
