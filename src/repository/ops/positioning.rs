//! Positioning Operations
//!
//! Keeps the indices of a sibling scope dense (0, 1, 2, ...): appending,
//! moving a member, and closing the hole left by a removed member.

use crate::domain::{DomainError, DomainResult, Scope};
use crate::repository::traits::StoreTx;

/// Trait for index management inside one scope
pub trait PositioningOperations: StoreTx {
    /// Index a new member of `scope` receives (used in create)
    fn next_index(&self, scope: Scope) -> DomainResult<i32> {
        Ok(self.max_index(scope)?.map_or(0, |max| max + 1))
    }

    /// Check that `target` lies in `0..=max` for `scope`
    ///
    /// An empty scope has no valid target and reports `max` as -1.
    fn check_target(&self, scope: Scope, target: i32) -> DomainResult<()> {
        let max = self.max_index(scope)?.unwrap_or(-1);
        if target < 0 || target > max {
            return Err(DomainError::InvalidIndex { index: target, max });
        }
        Ok(())
    }

    /// Move member `id` from `current` to `target`, shifting the siblings
    /// in between by one
    fn move_member(&mut self, scope: Scope, id: u32, current: i32, target: i32) -> DomainResult<()> {
        self.check_target(scope, target)?;
        if target == current {
            return Ok(());
        }

        // Moving earlier: [target, current) shifts up. Moving later: (current, target] shifts down.
        let (range, step) = if target < current {
            (target..=current - 1, 1)
        } else {
            (current + 1..=target, -1)
        };

        let siblings = self.members(scope, range)?;
        log::debug!(
            "Moving {} in {} from {} to {}, shifting {} siblings by {}",
            id,
            scope,
            current,
            target,
            siblings.len(),
            step
        );
        for sibling in siblings.iter().filter(|sibling| sibling.id != id) {
            self.set_index(scope, sibling.id, sibling.index + step)?;
        }
        self.set_index(scope, id, target)
    }

    /// Decrement every member above `removed` so the scope stays dense
    fn close_gap(&mut self, scope: Scope, removed: i32) -> DomainResult<()> {
        let above = self.members(scope, removed + 1..=i32::MAX)?;
        if !above.is_empty() {
            log::debug!("Closing gap at {} in {}, {} members shift", removed, scope, above.len());
        }
        for member in above {
            self.set_index(scope, member.id, member.index - 1)?;
        }
        Ok(())
    }
}

impl<T: StoreTx + ?Sized> PositioningOperations for T {}
