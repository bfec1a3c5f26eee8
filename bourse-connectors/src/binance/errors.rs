//! Classification of Binance error responses.

use serde_json::Value;

use bourse_exchange::safe::{safe_bool, safe_string};
use bourse_exchange::{ErrorKind, ExchangeError, ExchangeResult};

use super::ID;

/// Fragments scanned in raw error bodies before any JSON parsing.
const BODY_FRAGMENTS: &[(&str, &str)] = &[
    ("Price * QTY is zero or less", "order cost = amount * price is zero or less"),
    ("LOT_SIZE", "order amount should be evenly divisible by lot size"),
    ("PRICE_FILTER", "order price is invalid, i.e. exceeds allowed price precision, exceeds min price or max price limits or is invalid float value in general, use price_to_precision(symbol, amount)"),
];

/// Exact matches on the error message or code.
const EXACT: &[(&str, ErrorKind)] = &[
    ("System is under maintenance.", ErrorKind::ExchangeNotAvailable),
    ("System abnormality", ErrorKind::ExchangeNotAvailable),
    ("You are not authorized to execute this request.", ErrorKind::PermissionDenied),
    ("API key does not exist", ErrorKind::Authentication),
    ("Order would trigger immediately.", ErrorKind::InvalidOrder),
    ("Stop price would trigger immediately.", ErrorKind::InvalidOrder),
    ("Order would immediately match and take.", ErrorKind::InvalidOrder),
    ("Account has insufficient balance for requested action.", ErrorKind::InsufficientFunds),
    ("Rest API trading is not enabled.", ErrorKind::ExchangeNotAvailable),
    ("You don't have permission.", ErrorKind::PermissionDenied),
    ("Market is closed.", ErrorKind::ExchangeNotAvailable),
    ("Too many requests. Please try again later.", ErrorKind::DDoSProtection),
    ("-1000", ErrorKind::ExchangeNotAvailable),
    ("-1001", ErrorKind::ExchangeNotAvailable),
    ("-1002", ErrorKind::Authentication),
    ("-1003", ErrorKind::DDoSProtection),
    ("-1013", ErrorKind::InvalidOrder),
    ("-1015", ErrorKind::DDoSProtection),
    ("-1016", ErrorKind::ExchangeNotAvailable),
    ("-1020", ErrorKind::BadRequest),
    ("-1021", ErrorKind::InvalidNonce),
    ("-1022", ErrorKind::Authentication),
    ("-1100", ErrorKind::BadRequest),
    ("-1101", ErrorKind::BadRequest),
    ("-1102", ErrorKind::BadRequest),
    ("-1103", ErrorKind::BadRequest),
    ("-1104", ErrorKind::BadRequest),
    ("-1105", ErrorKind::BadRequest),
    ("-1106", ErrorKind::BadRequest),
    ("-1111", ErrorKind::BadRequest),
    ("-1112", ErrorKind::InvalidOrder),
    ("-1114", ErrorKind::BadRequest),
    ("-1115", ErrorKind::BadRequest),
    ("-1116", ErrorKind::BadRequest),
    ("-1117", ErrorKind::BadRequest),
    ("-1118", ErrorKind::BadRequest),
    ("-1119", ErrorKind::BadRequest),
    ("-1120", ErrorKind::BadRequest),
    ("-1121", ErrorKind::BadSymbol),
    ("-1125", ErrorKind::Authentication),
    ("-1127", ErrorKind::BadRequest),
    ("-1128", ErrorKind::BadRequest),
    ("-1130", ErrorKind::BadRequest),
    ("-1131", ErrorKind::BadRequest),
    ("-2008", ErrorKind::Authentication),
    ("-2010", ErrorKind::Exchange),
    ("-2011", ErrorKind::OrderNotFound),
    ("-2013", ErrorKind::OrderNotFound),
    ("-2014", ErrorKind::Authentication),
    ("-2015", ErrorKind::Authentication),
    ("-2019", ErrorKind::InsufficientFunds),
    ("-3005", ErrorKind::InsufficientFunds),
    ("-3008", ErrorKind::InsufficientFunds),
    ("-3010", ErrorKind::Exchange),
    ("-3022", ErrorKind::PermissionDenied),
    ("-4028", ErrorKind::BadRequest),
];

/// Substring matches on the error message.
const BROAD: &[(&str, ErrorKind)] = &[
    ("has no operation privilege", ErrorKind::PermissionDenied),
    ("MAX_POSITION", ErrorKind::InvalidOrder),
];

/// Code Binance overloads for both a rejected key and a suspended one.
const OVERLOADED_AUTH_CODE: &str = "-2015";

fn exact_kind(key: &str) -> Option<ErrorKind> {
    EXACT.iter().find(|(k, _)| *k == key).map(|(_, kind)| *kind)
}

fn broad_kind(message: &str) -> Option<ErrorKind> {
    BROAD.iter().find(|(k, _)| message.contains(k)).map(|(_, kind)| *kind)
}

fn is_affirmative(code: &str) -> bool {
    code == "200" || code.parse::<i64>().is_ok_and(|c| c == 0)
}

/// Classify a response.
///
/// `authenticated` is true once a private request has succeeded; from then
/// on the overloaded key-rejection code means a temporary ban.
pub fn handle_errors(status: u16, reason: &str, body: &str, authenticated: bool) -> ExchangeResult<()> {
    if status == 418 || status == 429 {
        return Err(ExchangeError::DDoSProtection(format!(
            "{} {} {} {}",
            ID, status, reason, body
        )));
    }

    if status >= 400 {
        if let Some((_, message)) = BODY_FRAGMENTS.iter().find(|(fragment, _)| body.contains(fragment)) {
            return Err(ExchangeError::InvalidOrder(format!("{} {} {}", ID, message, body)));
        }
    }

    let mut response: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if status >= 400 => {
            return Err(ErrorKind::from_http_status(status)
                .into_error(format!("{} {} {} {}", ID, status, reason, body)));
        },
        Err(_) => return Ok(()),
    };

    let success = safe_bool(&response, "success").unwrap_or(true);
    if !success {
        let nested = safe_string(&response, "msg")
            .and_then(|msg| serde_json::from_str::<Value>(&msg).ok())
            .filter(Value::is_object);
        if let Some(nested) = nested {
            response = nested;
        }
    }

    if let Some(message) = safe_string(&response, "msg") {
        if let Some(kind) = exact_kind(&message).or_else(|| broad_kind(&message)) {
            return Err(kind.into_error(format!("{} {}", ID, message)));
        }
    }

    if let Some(code) = safe_string(&response, "code") {
        if is_affirmative(&code) {
            return Ok(());
        }
        if code == OVERLOADED_AUTH_CODE && authenticated {
            return Err(ExchangeError::DDoSProtection(format!("{} temporary banned: {}", ID, body)));
        }
        let feedback = format!("{} {}", ID, body);
        return Err(exact_kind(&code).unwrap_or(ErrorKind::Exchange).into_error(feedback));
    }

    if !success {
        return Err(ExchangeError::Exchange(format!("{} {}", ID, body)));
    }

    if status >= 400 {
        return Err(ErrorKind::from_http_status(status)
            .into_error(format!("{} {} {} {}", ID, status, reason, body)));
    }

    Ok(())
}
