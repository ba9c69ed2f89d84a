use chrono::DateTime;
use chrono::Utc;

pub const CHARSET_NUMS: &[u8] = b"0123456789";
pub const CHARSET_LOWER_NUM: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const CHARSET_ALPHA_NUM: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of the current time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of random strings.
///
/// Implementations used for identifiers and OAuth state must be
/// cryptographically unpredictable.
pub trait RandomSource: Send + Sync + 'static {
    /// Random string of `len` characters drawn uniformly from `charset`.
    fn string(&self, len: usize, charset: &[u8]) -> String;
}
