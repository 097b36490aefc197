//! Account
//!
//! A balance-bearing bank account owned by a single user. The balance is
//! mutated only through the ledger engine; every committed mutation bumps
//! `version`, which is what the optimistic write check compares against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::EntryKind;
use super::money::{Amount, Balance, MoneyError};

/// Account state as read from, and written back to, the account store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    balance: Balance,
    currency: String,
    active: bool,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Fields required to create a new account. Balance starts at zero; an
/// opening balance is applied as an ordinary credit after creation.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub owner_id: Uuid,
    pub name: String,
    pub currency: String,
}

impl Account {
    /// Construct the initial state of a freshly created account.
    pub fn create(id: Uuid, new: NewAccount) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id: new.owner_id,
            name: new.name,
            balance: Balance::zero(),
            currency: new.currency,
            active: true,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate an account from stored state.
    #[allow(clippy::too_many_arguments)]
    pub fn from_stored(
        id: Uuid,
        owner_id: Uuid,
        name: String,
        balance: Balance,
        currency: String,
        active: bool,
        version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name,
            balance,
            currency,
            active,
            version,
            created_at,
            updated_at,
        }
    }

    /// Compute the successor state after applying a credit or debit.
    ///
    /// Does not mutate `self`; the caller commits the returned state with
    /// `self.version()` as the expected version, so a concurrent writer is
    /// detected at the store.
    ///
    /// # Errors
    /// - `MoneyError::Negative` if a debit exceeds the current balance
    /// - `MoneyError::Overflow` if a credit exceeds the representable range
    pub fn apply(&self, kind: EntryKind, amount: &Amount) -> Result<Account, MoneyError> {
        let balance = match kind {
            EntryKind::Credit => self.balance.credit(amount)?,
            EntryKind::Debit => self.balance.debit(amount)?,
        };

        Ok(Self {
            balance,
            version: self.version + 1,
            updated_at: Utc::now(),
            ..self.clone()
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_with_balance(minor_units: i64) -> Account {
        let new = NewAccount {
            owner_id: Uuid::new_v4(),
            name: "Checking".to_string(),
            currency: "USD".to_string(),
        };
        let account = Account::create(Uuid::new_v4(), new);
        if minor_units == 0 {
            return account;
        }
        account
            .apply(EntryKind::Credit, &Amount::new(minor_units).unwrap())
            .unwrap()
    }

    #[test]
    fn test_create_starts_at_zero() {
        let account = account_with_balance(0);
        assert_eq!(account.balance(), Balance::zero());
        assert_eq!(account.version(), 1);
        assert!(account.is_active());
    }

    #[test]
    fn test_apply_credit() {
        let account = account_with_balance(0);
        let next = account
            .apply(EntryKind::Credit, &Amount::new(10_000).unwrap())
            .unwrap();

        assert_eq!(next.balance().minor_units(), 10_000);
        assert_eq!(next.version(), account.version() + 1);
        // The original is untouched
        assert_eq!(account.balance().minor_units(), 0);
    }

    #[test]
    fn test_apply_debit() {
        let account = account_with_balance(10_000);
        let next = account
            .apply(EntryKind::Debit, &Amount::new(3_000).unwrap())
            .unwrap();

        assert_eq!(next.balance().minor_units(), 7_000);
        assert_eq!(next.version(), account.version() + 1);
    }

    #[test]
    fn test_apply_debit_insufficient() {
        let account = account_with_balance(10_000);
        let result = account.apply(EntryKind::Debit, &Amount::new(15_000).unwrap());

        assert!(matches!(result, Err(MoneyError::Negative { .. })));
        assert_eq!(account.balance().minor_units(), 10_000);
    }

    #[test]
    fn test_apply_debit_to_exactly_zero() {
        let account = account_with_balance(10_000);
        let next = account
            .apply(EntryKind::Debit, &Amount::new(10_000).unwrap())
            .unwrap();

        assert_eq!(next.balance().minor_units(), 0);
    }
}
