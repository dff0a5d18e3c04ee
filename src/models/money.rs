//! Amounts are kept as integer cents internally and exchanged as decimal
//! numbers (`12.34`) on the JSON surface.

/// Largest accepted magnitude for an amount, in currency units.
pub const MAX_ABS_AMOUNT: f64 = 1e13;

pub fn amount_to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Like [`amount_to_cents`], but `None` for non-finite amounts or ones
/// beyond [`MAX_ABS_AMOUNT`].
pub fn checked_amount_to_cents(amount: f64) -> Option<i64> {
    (amount.is_finite() && amount.abs() <= MAX_ABS_AMOUNT).then(|| amount_to_cents(amount))
}

fn out_of_range<E: serde::de::Error>(amount: f64) -> E {
    E::custom(format!(
        "amount {} is out of range (max magnitude {})",
        amount, MAX_ABS_AMOUNT
    ))
}

pub fn cents_to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Round to two fraction digits, the precision of every reported figure.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid emitting "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// `#[serde(with = "crate::models::money::as_amount")]` for `i64` cent fields.
pub mod as_amount {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::cents_to_amount(*cents))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        super::checked_amount_to_cents(amount).ok_or_else(|| super::out_of_range(amount))
    }
}

/// Optional variant of [`as_amount`] for partial-update payloads.
pub mod as_optional_amount {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cents: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match cents {
            Some(c) => serializer.serialize_some(&super::cents_to_amount(*c)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<f64>::deserialize(deserializer)? {
            Some(amount) => super::checked_amount_to_cents(amount)
                .map(Some)
                .ok_or_else(|| super::out_of_range(amount)),
            None => Ok(None),
        }
    }
}
