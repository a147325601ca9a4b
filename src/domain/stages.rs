//! Well-known stage names.

pub const PRE_FLOW: &str = "PRE_FLOW";
pub const SPLIT: &str = "SPLIT";
pub const PRE_TRANSACTION: &str = "PRE_TRANSACTION";
pub const PAYMENT_CARD_READING: &str = "PAYMENT_CARD_READING";
pub const POST_CARD_READING: &str = "POST_CARD_READING";
pub const TRANSACTION_PROCESSING: &str = "TRANSACTION_PROCESSING";
pub const POST_TRANSACTION: &str = "POST_TRANSACTION";
pub const POST_FLOW: &str = "POST_FLOW";
pub const GENERIC: &str = "GENERIC";
pub const STATUS_UPDATE: &str = "STATUS_UPDATE";
