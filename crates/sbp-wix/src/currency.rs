//! ISO 4217 minor-unit digits and the amount conversion used when building
//! SBP invoices.
//!
//! Wix hands order amounts over as integers. The invoice wants a decimal
//! major-unit amount, obtained by dividing by `10^(digits + 1)`: one more
//! decimal place than the currency's own minor unit (EUR divides by 1000,
//! JPY by 10).

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Serialize, Serializer};

use crate::error::SbpError;

const CURRENCY_DIGITS: &[(&str, u32)] = &[
    ("AED", 2), ("AFN", 2), ("ALL", 2), ("AMD", 2), ("ANG", 2), ("AOA", 2),
    ("ARS", 2), ("AUD", 2), ("AWG", 2), ("AZN", 2), ("BAM", 2), ("BBD", 2),
    ("BDT", 2), ("BGN", 2), ("BHD", 3), ("BIF", 0), ("BMD", 2), ("BND", 2),
    ("BOB", 2), ("BRL", 2), ("BSD", 2), ("BTN", 2), ("BWP", 2), ("BYN", 2),
    ("BZD", 2), ("CAD", 2), ("CDF", 2), ("CHF", 2), ("CLP", 0), ("CNY", 2),
    ("COP", 2), ("CRC", 2), ("CUP", 2), ("CVE", 2), ("CZK", 2), ("DJF", 0),
    ("DKK", 2), ("DOP", 2), ("DZD", 2), ("EGP", 2), ("ERN", 2), ("ETB", 2),
    ("EUR", 2), ("FJD", 2), ("FKP", 2), ("FOK", 2), ("GBP", 2), ("GEL", 2),
    ("GGP", 2), ("GHS", 2), ("GIP", 2), ("GMD", 2), ("GNF", 0), ("GTQ", 2),
    ("GYD", 2), ("HKD", 2), ("HNL", 2), ("HRK", 2), ("HTG", 2), ("HUF", 2),
    ("IDR", 2), ("ILS", 2), ("IMP", 2), ("INR", 2), ("IQD", 3), ("IRR", 2),
    ("ISK", 0), ("JEP", 2), ("JMD", 2), ("JOD", 3), ("JPY", 0), ("KES", 2),
    ("KGS", 2), ("KHR", 2), ("KID", 2), ("KMF", 0), ("KRW", 0), ("KWD", 3),
    ("KYD", 2), ("KZT", 2), ("LAK", 2), ("LBP", 2), ("LKR", 2), ("LRD", 2),
    ("LSL", 2), ("LYD", 3), ("MAD", 2), ("MDL", 2), ("MGA", 2), ("MKD", 2),
    ("MMK", 2), ("MNT", 2), ("MOP", 2), ("MRU", 2), ("MUR", 2), ("MVR", 2),
    ("MWK", 2), ("MXN", 2), ("MYR", 2), ("MZN", 2), ("NAD", 2), ("NGN", 2),
    ("NIO", 2), ("NOK", 2), ("NPR", 2), ("NZD", 2), ("OMR", 3), ("PAB", 2),
    ("PEN", 2), ("PGK", 2), ("PHP", 2), ("PKR", 2), ("PLN", 2), ("PYG", 0),
    ("QAR", 2), ("RON", 2), ("RSD", 2), ("RUB", 2), ("RWF", 0), ("SAR", 2),
    ("SBD", 2), ("SCR", 2), ("SDG", 2), ("SEK", 2), ("SGD", 2), ("SHP", 2),
    ("SLE", 2), ("SLL", 2), ("SOS", 2), ("SRD", 2), ("SSP", 2), ("STN", 2),
    ("SYP", 2), ("SZL", 2), ("THB", 2), ("TJS", 2), ("TMT", 2), ("TND", 3),
    ("TOP", 2), ("TRY", 2), ("TTD", 2), ("TVD", 2), ("TWD", 2), ("TZS", 2),
    ("UAH", 2), ("UGX", 0), ("USD", 2), ("UYU", 2), ("UZS", 2), ("VES", 2),
    ("VND", 0), ("VUV", 0), ("WST", 2), ("XAF", 0), ("XCD", 2), ("XOF", 0),
    ("XPF", 0), ("YER", 2), ("ZAR", 2), ("ZMW", 2), ("ZWL", 2),
];

static DIGITS: LazyLock<HashMap<&'static str, u32>> =
    LazyLock::new(|| CURRENCY_DIGITS.iter().copied().collect());

/// Number of minor-unit digits for an ISO 4217 code. There is no fallback:
/// a code missing from the table is an error.
pub fn minor_unit_digits(currency: &str) -> Result<u32, SbpError> {
    DIGITS
        .get(currency)
        .copied()
        .ok_or_else(|| SbpError::UnsupportedCurrency(currency.to_string()))
}

/// Divider turning a Wix integer amount into a major-unit amount: `10^(digits + 1)`.
pub fn divider(currency: &str) -> Result<u64, SbpError> {
    let digits = minor_unit_digits(currency)?;
    Ok(10u64.pow(digits + 1))
}

/// Decimal amount in the currency's major unit, as sent to SBP.
///
/// Serializes as a JSON integer when the value is whole (`50`, not `50.0`)
/// and as the shortest round-tripping decimal otherwise (`1.999`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MajorAmount(pub f64);

impl MajorAmount {
    pub fn from_minor(value: f64, divider: u64) -> Self {
        Self(value / divider as f64)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

// Largest integer an f64 holds exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

impl Serialize for MajorAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_EXACT_INT {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_complete_and_unique() {
        assert_eq!(CURRENCY_DIGITS.len(), 161);
        assert_eq!(DIGITS.len(), CURRENCY_DIGITS.len());
    }

    #[test]
    fn eur_divides_by_one_thousand() {
        assert_eq!(minor_unit_digits("EUR").unwrap(), 2);
        assert_eq!(divider("EUR").unwrap(), 1000);
        let amount = MajorAmount::from_minor(1999.0, divider("EUR").unwrap());
        assert_eq!(amount.value(), 1.999);
    }

    #[test]
    fn jpy_divides_by_ten() {
        assert_eq!(minor_unit_digits("JPY").unwrap(), 0);
        assert_eq!(divider("JPY").unwrap(), 10);
        let amount = MajorAmount::from_minor(500.0, divider("JPY").unwrap());
        assert_eq!(amount.value(), 50.0);
    }

    #[test]
    fn three_digit_currencies() {
        for code in ["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"] {
            assert_eq!(divider(code).unwrap(), 10_000, "{code}");
        }
    }

    #[test]
    fn unknown_currency_is_an_error() {
        match divider("XBT") {
            Err(SbpError::UnsupportedCurrency(code)) => assert_eq!(code, "XBT"),
            other => panic!("expected UnsupportedCurrency, got {other:?}"),
        }
        // lookups are case-sensitive
        assert!(minor_unit_digits("eur").is_err());
    }

    #[test]
    fn whole_amounts_serialize_as_integers() {
        assert_eq!(serde_json::to_string(&MajorAmount(50.0)).unwrap(), "50");
        assert_eq!(serde_json::to_string(&MajorAmount(0.0)).unwrap(), "0");
        assert_eq!(serde_json::to_string(&MajorAmount(1.999)).unwrap(), "1.999");
        assert_eq!(serde_json::to_string(&MajorAmount(12.5)).unwrap(), "12.5");
    }
}
