//! Runtime invariant checks with a per-thread record of what was checked.
//!
//! Session transitions assert their state invariants through
//! [`assert_invariant!`]. Tests can then call [`verify_contract`] to prove a
//! scenario actually exercised the invariants it claims to cover.
//!
//! ```rust
//! use crowdcam::assert_invariant;
//! use crowdcam::invariants::verify_contract;
//!
//! let open_streams = 0;
//! assert_invariant!(open_streams <= 1, "At most one open stream");
//! verify_contract("stream count", &["At most one open stream"]);
//! ```

use std::cell::RefCell;
use std::collections::BTreeSet;

thread_local! {
    static CHECKED: RefCell<BTreeSet<String>> = const { RefCell::new(BTreeSet::new()) };
}

/// Assert a state invariant and record that it was checked.
///
/// Panics with the invariant text (and optional context) when violated.
#[macro_export]
macro_rules! assert_invariant {
    ($condition:expr, $message:expr) => {
        $crate::invariants::__check($condition, $message, None)
    };
    ($condition:expr, $message:expr, $context:expr) => {
        $crate::invariants::__check($condition, $message, Some($context))
    };
}

#[doc(hidden)]
pub fn __check(condition: bool, message: &str, context: Option<&str>) {
    CHECKED.with(|checked| {
        checked.borrow_mut().insert(message.to_string());
    });

    if !condition {
        panic!(
            "invariant violated [{}]: {}",
            context.unwrap_or("unknown"),
            message
        );
    }
}

/// Panic unless every listed invariant was checked on this thread.
pub fn verify_contract(name: &str, required: &[&str]) {
    let missing: Vec<&str> = CHECKED.with(|checked| {
        let checked = checked.borrow();
        required
            .iter()
            .copied()
            .filter(|invariant| !checked.contains(*invariant))
            .collect()
    });

    if !missing.is_empty() {
        panic!(
            "contract '{}' did not check:\n  - {}",
            name,
            missing.join("\n  - ")
        );
    }
}

/// Forget every recorded check on this thread.
pub fn reset_checked() {
    CHECKED.with(|checked| checked.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_invariant_satisfies_contract() {
        reset_checked();
        assert_invariant!(true, "always holds");
        verify_contract("single", &["always holds"]);
    }

    #[test]
    #[should_panic(expected = "did not check")]
    fn test_unchecked_invariant_fails_contract() {
        reset_checked();
        verify_contract("missing", &["never asserted"]);
    }

    #[test]
    #[should_panic(expected = "invariant violated [unit]: must hold")]
    fn test_violation_panics_with_context() {
        assert_invariant!(1 + 1 == 3, "must hold", "unit");
    }
}
