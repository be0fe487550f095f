//! ISO 4217 currency codes accepted for `InstdAmt/@Ccy`.
//!
//! SEPA profiles only take EUR (see the variant table); the Swiss and
//! Swedish profiles accept any code listed here.

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    CURRENCY_CODES.binary_search(&code).is_ok()
}

/// Currencies of SEPA-area and major trading-partner countries.
/// Sorted for binary search.
static CURRENCY_CODES: &[&str] = &[
    "AED", // UAE Dirham
    "ALL", // Albanian Lek
    "AMD", // Armenian Dram
    "AUD", // Australian Dollar
    "BAM", // Convertible Mark
    "BGN", // Bulgarian Lev
    "BRL", // Brazilian Real
    "CAD", // Canadian Dollar
    "CHF", // Swiss Franc
    "CNY", // Chinese Yuan
    "CZK", // Czech Koruna
    "DKK", // Danish Krone
    "EGP", // Egyptian Pound
    "EUR", // Euro
    "GBP", // Pound Sterling
    "GEL", // Georgian Lari
    "HKD", // Hong Kong Dollar
    "HRK", // Croatian Kuna
    "HUF", // Hungarian Forint
    "IDR", // Indonesian Rupiah
    "ILS", // Israeli Shekel
    "INR", // Indian Rupee
    "ISK", // Icelandic Krona
    "JPY", // Japanese Yen
    "KES", // Kenyan Shilling
    "KRW", // South Korean Won
    "KZT", // Kazakhstani Tenge
    "MDL", // Moldovan Leu
    "MKD", // Macedonian Denar
    "MXN", // Mexican Peso
    "MYR", // Malaysian Ringgit
    "NGN", // Nigerian Naira
    "NOK", // Norwegian Krone
    "NZD", // New Zealand Dollar
    "PHP", // Philippine Peso
    "PLN", // Polish Zloty
    "RON", // Romanian Leu
    "RSD", // Serbian Dinar
    "RUB", // Russian Ruble
    "SAR", // Saudi Riyal
    "SEK", // Swedish Krona
    "SGD", // Singapore Dollar
    "THB", // Thai Baht
    "TRY", // Turkish Lira
    "TWD", // New Taiwan Dollar
    "UAH", // Ukrainian Hryvnia
    "USD", // US Dollar
    "VND", // Vietnamese Dong
    "ZAR", // South African Rand
];
