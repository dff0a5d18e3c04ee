pub mod budget;
pub mod goal;
pub mod money;
pub mod transaction;
pub mod user;

pub use budget::{Budget, NewBudget};
pub use goal::{Goal, GoalUpdate, NewGoal};
pub use transaction::{NewTransaction, Transaction, TransactionType, TransactionUpdate};
pub use user::{NewUser, User};
