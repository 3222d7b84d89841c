//! Command handlers and output formatting

pub mod account;
pub mod money;

use anyhow::Result;
use atm_business::{ServiceContext, SessionService};
use atm_core::Session;
use rust_decimal::Decimal;

use crate::Credentials;

/// Log in with the command's credentials.
pub async fn open_session(ctx: &ServiceContext, credentials: &Credentials) -> Result<Session> {
    Ok(SessionService::new(ctx)
        .login(&credentials.name, &credentials.pin)
        .await?)
}

/// Formats an amount with thousands separators, e.g. `1,234,567.50`.
pub fn format_amount(amount: Decimal) -> String {
    let text = amount.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(0)), "0");
        assert_eq!(format_amount(dec!(999)), "999");
        assert_eq!(format_amount(dec!(1000)), "1,000");
        assert_eq!(format_amount(dec!(150000)), "150,000");
        assert_eq!(format_amount(dec!(1234567.50)), "1,234,567.50");
        assert_eq!(format_amount(dec!(-20000)), "-20,000");
    }
}
