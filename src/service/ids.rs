//! Identifier Allocation
//!
//! Ids are random 32-bit values checked against the store before use.
//! Nothing is reserved: the primary key settles any race.

use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Source of candidate ids
pub trait IdSource: Send + Sync {
    fn candidate(&self) -> u32;
}

/// Leading four bytes of a fresh v4 UUID
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn candidate(&self) -> u32 {
        let bytes = Uuid::new_v4().into_bytes();
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

pub struct IdAllocator {
    source: Box<dyn IdSource>,
    max_attempts: u32,
}

impl IdAllocator {
    pub fn new(source: Box<dyn IdSource>, max_attempts: u32) -> Self {
        Self { source, max_attempts }
    }

    pub fn random(max_attempts: u32) -> Self {
        Self::new(Box::new(RandomIds), max_attempts)
    }

    /// Draw candidates until `exists` reports one as free
    ///
    /// Zero is never returned; it stands for "unset" in stored rows.
    pub fn allocate<F>(&self, mut exists: F) -> DomainResult<u32>
    where
        F: FnMut(u32) -> DomainResult<bool>,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = self.source.candidate();
            if candidate == 0 {
                continue;
            }
            if !exists(candidate)? {
                return Ok(candidate);
            }
            log::warn!("Id {} already taken (attempt {}/{})", candidate, attempt, self.max_attempts);
        }
        Err(DomainError::Internal(format!(
            "no free id after {} attempts",
            self.max_attempts
        )))
    }
}
