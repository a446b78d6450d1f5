//! Module: db::query
//! Responsibility: page planning and execution over a `PageSource`.
//! Does not own: cursor wire format (`db::cursor`) or predicate shape
//! (`db::predicate`).
//! Boundary: all client input is validated in `plan`, before any I/O.

mod cursor;
mod error;
mod offset;
mod source;
mod window;


pub use cursor::{CursorPage, CursorPageRequest, CursorPaginator, CursorPlan};
pub use error::PageError;
pub use offset::{OffsetPage, OffsetPageRequest, OffsetPaginator};
pub use source::{FetchedPage, PageSource};
pub use window::PageWindow;
