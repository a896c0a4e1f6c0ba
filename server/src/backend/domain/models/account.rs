/// Account owner that receives the daily report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Assigned by the storage backend on first insert
    pub id: i64,
    /// Unique across all accounts
    pub email: String,
}

/// Account that has not been stored yet; the id is assigned on insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
}

impl NewAccount {
    pub fn new(email: impl Into<String>) -> Self {
        Self { email: email.into() }
    }
}
