// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Canned responder for the stat operation
//!
//! The action produced here slots straight into a mock expectation:
//!
//! ```
//! use stream_mock::{MockStream, StatFlag, Stream, StreamStat, stat_with_name};
//!
//! let mut mock = MockStream::new();
//! mock.expect_stat().returning(stat_with_name(Some("example")));
//!
//! let mut stat = StreamStat::new();
//! mock.stat(&mut stat, StatFlag::Default).unwrap();
//! assert!(!stat.name.is_null());
//! unsafe { stream_mock::alloc::free_wide(stat.name) };
//! ```

use std::ptr;

use tracing::trace;

use crate::alloc::alloc_wide;
use crate::error::StreamResult;
use crate::types::{StatFlag, StreamStat};

/// Build a stat action that fills the descriptor name field
///
/// With a name, the action stores a newly allocated null-terminated wide
/// copy whose ownership transfers to the caller of `stat`; without one, or
/// when the caller passes [`StatFlag::NoName`], it stores an explicit null.
/// The action always succeeds. Other descriptor fields are left as the
/// caller prefilled them.
pub fn stat_with_name(
    name: Option<&str>,
) -> impl Fn(&mut StreamStat, StatFlag) -> StreamResult<()> + Send + Sync + 'static {
    let name = name.map(str::to_owned);
    move |out, flags| {
        match (&name, flags) {
            (Some(n), StatFlag::Default) => {
                out.name = alloc_wide(n);
                trace!(name = %n, "fabricated stat descriptor");
            }
            _ => {
                out.name = ptr::null_mut();
                trace!("fabricated stat descriptor without name");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{free_wide, wide_to_string};

    #[test]
    fn present_name_is_copied_into_fresh_allocation() {
        let action = stat_with_name(Some("example"));
        let mut stat = StreamStat::new();
        action(&mut stat, StatFlag::Default).unwrap();
        assert!(!stat.name.is_null());
        unsafe {
            assert_eq!(wide_to_string(stat.name).as_deref(), Some("example"));
            free_wide(stat.name);
        }
    }

    #[test]
    fn absent_name_clears_the_field() {
        let action = stat_with_name(None);
        let mut stat = StreamStat::new();
        stat.name = 0xdead as *mut _; // stale garbage must be overwritten
        action(&mut stat, StatFlag::Default).unwrap();
        assert!(stat.name.is_null());
    }

    #[test]
    fn no_name_flag_suppresses_the_allocation() {
        let action = stat_with_name(Some("ignored"));
        let mut stat = StreamStat::new();
        action(&mut stat, StatFlag::NoName).unwrap();
        assert!(stat.name.is_null());
    }

    #[test]
    fn empty_name_yields_empty_copy_not_null() {
        let action = stat_with_name(Some(""));
        let mut stat = StreamStat::new();
        action(&mut stat, StatFlag::Default).unwrap();
        assert!(!stat.name.is_null());
        unsafe {
            assert_eq!(wide_to_string(stat.name).as_deref(), Some(""));
            free_wide(stat.name);
        }
    }

    #[test]
    fn action_is_reusable_across_calls() {
        let action = stat_with_name(Some("twice"));
        for _ in 0..2 {
            let mut stat = StreamStat::new();
            action(&mut stat, StatFlag::Default).unwrap();
            unsafe {
                assert_eq!(wide_to_string(stat.name).as_deref(), Some("twice"));
                free_wide(stat.name);
            }
        }
    }
}
