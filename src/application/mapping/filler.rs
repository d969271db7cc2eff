//! Placeholder identity fields.
//!
//! Some providers insist on a phone number and a plate even though neither
//! affects the price. Fresh values are drawn for every call.

use rand::Rng;

/// Random mobile number, `06` followed by eight digits.
#[must_use]
pub fn phone_number() -> String {
    let mut rng = rand::rng();
    let mut phone = String::with_capacity(10);
    phone.push_str("06");
    push_digits(&mut rng, &mut phone, 8);
    phone
}

/// Random plate, `NNNNN-F-NN` or `NNNNN-A-NN`.
#[must_use]
pub fn plate_number() -> String {
    let mut rng = rand::rng();
    let mut plate = String::with_capacity(10);
    push_digits(&mut rng, &mut plate, 5);
    plate.push_str(if rng.random_bool(0.5) { "-F-" } else { "-A-" });
    push_digits(&mut rng, &mut plate, 2);
    plate
}

/// Rewrites a `06...` number in international form, `+2126...`.
#[must_use]
pub fn international(phone: &str) -> String {
    match phone.strip_prefix('0') {
        Some(rest) => format!("+212{}", rest),
        None if phone.starts_with("+212") => phone.to_string(),
        None => format!("+212{}", phone),
    }
}

fn push_digits(rng: &mut impl Rng, out: &mut String, count: usize) {
    for _ in 0..count {
        let digit = rng.random_range(0..10u8);
        out.push(char::from(b'0' + digit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_shape() {
        let phone = phone_number();
        assert_eq!(phone.len(), 10);
        assert!(phone.starts_with("06"));
        assert!(phone.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn plate_shape() {
        for _ in 0..20 {
            let plate = plate_number();
            let parts: Vec<&str> = plate.split('-').collect();
            assert_eq!(parts.len(), 3);
            assert!(matches!(parts.get(1).copied(), Some("F") | Some("A")));
            assert_eq!(parts.first().map(|p| p.len()), Some(5));
            assert_eq!(parts.get(2).map(|p| p.len()), Some(2));
        }
    }

    #[test]
    fn international_form() {
        assert_eq!(international("0612345678"), "+212612345678");
        assert_eq!(international("+212612345678"), "+212612345678");
        assert_eq!(international("612345678"), "+212612345678");
    }
}
