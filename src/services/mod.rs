pub mod advice;
pub mod analytics;
pub mod budgets;
pub mod seed;
