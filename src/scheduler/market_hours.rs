//! Exchange trading calendar
//!
//! All gating decisions run in exchange-local time (IST). Functions take
//! the current instant as a parameter so tests can pin any wall-clock
//! moment; `now_ist` is the production entry point.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Asia::Kolkata;
use chrono_tz::Tz;

const MARKET_OPEN_HOUR: u32 = 9;
const MARKET_OPEN_MINUTE: u32 = 15;
const MARKET_CLOSE_HOUR: u32 = 15;
const MARKET_CLOSE_MINUTE: u32 = 30;

/// Current instant in exchange-local time
pub fn now_ist() -> DateTime<Tz> {
    Utc::now().with_timezone(&Kolkata)
}

pub fn is_weekend(t: &DateTime<Tz>) -> bool {
    matches!(t.weekday(), Weekday::Sat | Weekday::Sun)
}

/// At/after the 15:30 close; 15:30:00 itself counts as after close
pub fn is_after_market_close(t: &DateTime<Tz>) -> bool {
    (t.hour(), t.minute()) >= (MARKET_CLOSE_HOUR, MARKET_CLOSE_MINUTE)
}

/// Live-update window: weekday, 09:15-15:30 inclusive
pub fn is_market_open(t: &DateTime<Tz>) -> bool {
    if is_weekend(t) {
        return false;
    }
    let hhmm = (t.hour(), t.minute());
    hhmm >= (MARKET_OPEN_HOUR, MARKET_OPEN_MINUTE)
        && hhmm <= (MARKET_CLOSE_HOUR, MARKET_CLOSE_MINUTE)
}

/// EOD-update window: weekday at/after close
pub fn can_update_eod(t: &DateTime<Tz>) -> bool {
    !is_weekend(t) && is_after_market_close(t)
}

/// The trading date an EOD record written now belongs to.
///
/// A weekday resolves to today; a weekend rolls back to the most recent
/// weekday (Friday).
pub fn last_trading_date(t: &DateTime<Tz>) -> NaiveDate {
    let mut date = t.date_naive();
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date -= Duration::days(1);
    }
    date
}
