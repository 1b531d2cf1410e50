//! Transaction expiration window.
//!
//! Block times travel as `YYYY-MM-DDTHH:mm:ss` without an offset and are
//! always UTC. Only that prefix is read: trailing milliseconds (`.500`) or a
//! zone designator (`Z`) are ignored.

use time::macros::format_description;
use time::{Duration, PrimitiveDateTime};

/// Default distance between head-block time and transaction expiration.
pub const TX_EXPIRATION_IN_MILLIS: i64 = 30_000;

/// Length of `YYYY-MM-DDTHH:mm:ss`.
const BLOCK_TIME_LEN: usize = 19;

/// Parse the `YYYY-MM-DDTHH:mm:ss` prefix of a block timestamp.
pub fn parse_block_time(value: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    let prefix = value.get(..BLOCK_TIME_LEN).unwrap_or(value);
    PrimitiveDateTime::parse(
        prefix,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
}

/// Render a timestamp in the wire format.
pub fn format_block_time(value: PrimitiveDateTime) -> Result<String, time::error::Format> {
    value.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second]"
    ))
}

/// `head_block_time + offset_ms`, in the same format.
///
/// Unparseable input is returned unchanged; the node decides whether the
/// resulting transaction is acceptable.
pub fn time_after_head_block(head_block_time: &str, offset_ms: i64) -> String {
    let parsed = match parse_block_time(head_block_time) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(
                head_block_time = %head_block_time,
                error = %e,
                "Unparseable head block time, using it as expiration"
            );
            return head_block_time.to_string();
        }
    };

    parsed
        .checked_add(Duration::milliseconds(offset_ms))
        .and_then(|t| format_block_time(t).ok())
        .unwrap_or_else(|| head_block_time.to_string())
}

/// Seconds since the Unix epoch, as serialized in a packed transaction.
pub fn to_epoch_seconds(value: &str) -> Option<u32> {
    let parsed = parse_block_time(value).ok()?;
    u32::try_from(parsed.assume_utc().unix_timestamp()).ok()
}
