// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item and supplementary-view addressing.
//!
//! Items are addressed by an [`IndexPath`]: a section index plus an item
//! index within that section. Counts come from the hosting view's data
//! source; the layout never owns them.
//!
//! Supplementary views (headers, footers, section backgrounds) are addressed
//! by a section index plus a *kind* string. Kinds are an open set agreed on
//! out-of-band between a layout and its hosting view; [`SUPPLEMENTARY_HEADER`]
//! and [`SUPPLEMENTARY_FOOTER`] cover the common cases.

use core::fmt;

/// Well-known supplementary kind for section headers.
pub const SUPPLEMENTARY_HEADER: &str = "header";

/// Well-known supplementary kind for section footers.
pub const SUPPLEMENTARY_FOOTER: &str = "footer";

/// The address of one item: `(section, item)`.
///
/// Ordering is section-major, which is also the order hosts use for
/// "next/previous" selection walks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct IndexPath {
    /// Section index.
    pub section: u32,
    /// Item index within the section.
    pub item: u32,
}

impl IndexPath {
    /// Creates an index path.
    #[inline]
    #[must_use]
    pub const fn new(section: u32, item: u32) -> Self {
        Self { section, item }
    }

    /// Returns the path of the following item in the same section.
    ///
    /// Saturates at `u32::MAX`; bounds are the caller's concern.
    #[inline]
    #[must_use]
    pub const fn next_item(self) -> Self {
        Self {
            section: self.section,
            item: self.item.saturating_add(1),
        }
    }
}

impl fmt::Debug for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexPath({}:{})", self.section, self.item)
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.section, self.item)
    }
}

impl From<(u32, u32)> for IndexPath {
    fn from((section, item): (u32, u32)) -> Self {
        Self::new(section, item)
    }
}
