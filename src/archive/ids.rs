//! Record ID allocation

use crate::error::{AppError, AppResult};

/// First book ID handed out by an empty archive
pub const FIRST_BOOK_ID: i32 = 100;
/// First member ID handed out by an empty archive
pub const FIRST_MEMBER_ID: i32 = 200;

/// Monotonic ID counter owned by one archive
#[derive(Debug, Clone)]
pub struct IdAllocator {
    kind: &'static str,
    /// None once the ID space is used up
    next: Option<i32>,
}

impl IdAllocator {
    /// Start one past the highest existing ID, or at `default` when there is none
    pub fn seeded<I>(kind: &'static str, default: i32, existing: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        let next = match existing.into_iter().max() {
            Some(max) => {
                let next = max.checked_add(1);
                if next.is_none() {
                    tracing::warn!("Highest {} ID is {}, no further IDs can be allocated", kind, max);
                }
                next
            }
            None => Some(default),
        };
        Self { kind, next }
    }

    pub fn allocate(&mut self) -> AppResult<i32> {
        let id = self
            .next
            .ok_or_else(|| AppError::IdsExhausted(format!("No {} IDs left.", self.kind)))?;
        self.next = id.checked_add(1);
        Ok(id)
    }
}
