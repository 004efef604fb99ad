//! Account and availability parsers.

use serde::Serialize;

use super::{Parsed, fields, field, number};

/// Account summary from `INFOACCOUNT;<time>;<code>;<liquidity>;<gain>;<open P/L>;<equity>;<env>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountInfo {
    /// Platform time (`HH:MM:SS`).
    pub time: String,
    /// Account code.
    pub account_code: String,
    /// Available liquidity.
    pub liquidity: f64,
    /// Realized gain.
    pub gain: f64,
    /// Open profit and loss.
    pub open_profit_loss: f64,
    /// Account equity.
    pub equity: f64,
    /// Trading environment tag (e.g. `REAL`, `SIM`).
    pub environment: String,
}

/// Portfolio liquidity from `AVAILABILITY;<time>;<value>;...`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    /// Platform time (`HH:MM:SS`).
    pub time: String,
    /// Numeric availability fields in wire order.
    pub values: Vec<f64>,
}

/// Parses an `INFOACCOUNT` reply line.
#[must_use]
pub fn parse_account_info(text: &str) -> Parsed<AccountInfo> {
    if let Some(error) = Parsed::platform_error(text) {
        return error;
    }

    let Some(line) = text.lines().find(|line| line.contains("INFOACCOUNT;")) else {
        return Parsed::failure(None, "no INFOACCOUNT line", text.trim());
    };

    let parts = fields(line);
    let info = (|| -> Result<AccountInfo, String> {
        Ok(AccountInfo {
            time: field(&parts, 1, "time")?.to_string(),
            account_code: field(&parts, 2, "account_code")?.to_string(),
            liquidity: number(&parts, 3, "liquidity")?,
            gain: number(&parts, 4, "gain")?,
            open_profit_loss: number(&parts, 5, "open_profit_loss")?,
            equity: number(&parts, 6, "equity")?,
            environment: parts.get(7).copied().unwrap_or_default().to_string(),
        })
    })();

    match info {
        Ok(info) => Parsed::ok(info, line.trim()),
        Err(message) => Parsed::failure(None, message, line.trim()),
    }
}

/// Parses an `AVAILABILITY` reply line.
#[must_use]
pub fn parse_availability(text: &str) -> Parsed<Availability> {
    if let Some(error) = Parsed::platform_error(text) {
        return error;
    }

    let Some(line) = text.lines().find(|line| line.contains("AVAIL")) else {
        return Parsed::failure(None, "no AVAILABILITY line", text.trim());
    };

    let parts = fields(line);
    let Some(time) = parts.get(1) else {
        return Parsed::failure(None, "missing field time", line.trim());
    };

    let values = parts[2..]
        .iter()
        .filter_map(|value| value.parse::<f64>().ok())
        .collect();

    Parsed::ok(
        Availability {
            time: (*time).to_string(),
            values,
        },
        line.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_info() {
        let parsed = parse_account_info("INFOACCOUNT;10:00:00;SIM1234;10000;0;0.0;10000;SIM");
        let info = parsed.data.expect("data");
        assert_eq!(info.account_code, "SIM1234");
        assert_eq!(info.liquidity, 10000.0);
        assert_eq!(info.equity, 10000.0);
        assert_eq!(info.environment, "SIM");
    }

    #[test]
    fn test_account_info_bad_number() {
        let parsed = parse_account_info("INFOACCOUNT;10:00:00;A1;lots;0;0;1;REAL");
        assert!(!parsed.success);
    }

    #[test]
    fn test_availability() {
        let parsed = parse_availability("AVAILABILITY;10:00:00;1500.5;3000;0");
        let availability = parsed.data.expect("data");
        assert_eq!(availability.time, "10:00:00");
        assert_eq!(availability.values, vec![1500.5, 3000.0, 0.0]);
    }

    #[test]
    fn test_availability_error() {
        assert!(!parse_availability("ERR;N/A;1000").success);
        assert!(!parse_availability("AVAILABILITY").success);
    }
}
