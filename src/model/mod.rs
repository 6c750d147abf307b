/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Data model consumed and produced by the codec: distinguished names,
//! search filters, directory entries, and subtree specifications (§3).

pub mod dn;
pub mod entry;
pub mod filter;
pub mod subtree;

pub use dn::{Ava, Dn, DnError, Rdn};
pub use entry::{Attribute, Entry, Value};
pub use filter::{ExtensibleMatch, Filter, FilterError, SubstringFilter};
pub use subtree::{Refinement, SubtreeError, SubtreeSpecification};
