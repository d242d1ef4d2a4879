//! Client-side history: the bounded window dashboards chart from, and a
//! terminal dashboard that maintains one.

pub mod viewer;
pub mod window;

pub use viewer::{Dashboard, watch};
pub use window::{DEFAULT_CAPACITY, HistoryWindow};
