mod format_utils;
mod time_utils;

pub use format_utils::{format_price, format_price_plain, format_volume};
pub use time_utils::{TimeUtils, epoch_ms_to_utc, now_rfc3339, now_timestamp_ms};
