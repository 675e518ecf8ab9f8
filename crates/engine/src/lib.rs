//! WalletWatch engine.
//!
//! The engine owns every read and write against the database: credentials,
//! friendships, transactions, budgets, posts and the monthly aggregations built
//! on top of them. It holds no in-memory state besides the connection pool, so
//! a single `Engine` can be shared behind an `Arc` by every request handler.

use sea_orm::DatabaseConnection;

pub use aggregation::{BudgetSummary, LeaderboardEntry, LeaderboardScope};
pub use budgets::{Budget, BudgetPeriod};
pub use commands::{NewPost, NewTransaction, PostChanges, TransactionChanges};
pub use error::EngineError;
pub use friendships::{Friend, FriendshipStatus, PendingRequest, UserMatch};
pub use posts::Post;
pub use transactions::Transaction;
pub use users::User;

mod aggregation;
mod budgets;
mod commands;
mod error;
mod friendships;
mod ops;
mod password;
mod posts;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`, checking that the database answers.
    pub async fn build(self) -> ResultEngine<Engine> {
        self.database.ping().await?;
        Ok(Engine {
            database: self.database,
        })
    }
}
