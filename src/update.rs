//! In-place mutation across a collection of builders.
//!
//! Mutations run in order on exclusively borrowed builders. Changes made before an early
//! stop (or an error) stay applied; there is no rollback.

use tracing::{debug, trace};

/// Apply `mutation` to each builder in order. The mutation returns `true` to continue
/// and `false` to stop. Returns `true` if every builder was processed (vacuously so for
/// an empty collection), `false` if processing stopped early.
pub fn update<'a, B, I, F>(builders: I, mut mutation: F) -> bool
where
    B: ?Sized + 'a,
    I: IntoIterator<Item = &'a mut B>,
    F: FnMut(&mut B) -> bool,
{
    for (index, builder) in builders.into_iter().enumerate() {
        trace!(index, "updating builder");
        if !mutation(builder) {
            debug!(index, "update stopped early");
            return false;
        }
    }
    true
}

/// Apply `mutation` to every builder without stopping. The mutation returns whether it
/// changed the builder; the result is `true` if any call did.
pub fn update_all<'a, B, I, F>(builders: I, mut mutation: F) -> bool
where
    B: ?Sized + 'a,
    I: IntoIterator<Item = &'a mut B>,
    F: FnMut(&mut B) -> bool,
{
    let mut changed = false;
    let mut visited = 0usize;
    for builder in builders {
        changed |= mutation(builder);
        visited += 1;
    }
    debug!(visited, changed, "updated builders");
    changed
}

/// [`update`] with a fallible mutation. The first error is returned at once and the
/// remaining builders are left untouched.
pub fn try_update<'a, B, I, F, E>(builders: I, mut mutation: F) -> Result<bool, E>
where
    B: ?Sized + 'a,
    I: IntoIterator<Item = &'a mut B>,
    F: FnMut(&mut B) -> Result<bool, E>,
{
    for (index, builder) in builders.into_iter().enumerate() {
        if !mutation(builder)? {
            debug!(index, "update stopped early");
            return Ok(false);
        }
    }
    Ok(true)
}
