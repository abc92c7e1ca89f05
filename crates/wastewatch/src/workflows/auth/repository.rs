use super::domain::{UserAccount, UserId};
use crate::workflows::reports::repository::RepositoryError;

/// Account storage. Emails are stored lowercased and must be unique.
pub trait UserDirectory: Send + Sync {
    fn insert(&self, account: UserAccount) -> Result<UserAccount, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, RepositoryError>;
    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError>;
}
