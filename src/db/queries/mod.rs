pub mod budgets;
pub mod goals;
pub mod transactions;
pub mod users;
