//! Partial structural comparison of schema entities.
//!
//! Desired definitions are usually sparse: a caller only sets the options
//! it cares about. [`Agrees`] compares such a definition against a fully
//! introspected reference and ignores every option the two sides do not
//! both specify. The relation is not symmetric, so the receiver is always
//! the desired side and the argument the reference side.

use crate::schema::{
    ColumnOptions, ColumnType, DefaultValue, ForeignKey, ForeignKeyAction,
    ForeignKeyOptions, Index, IndexMethod, IndexOptions, TableOptions,
};

/// Partial equality between a desired value and a reference value.
pub trait Agrees {
    /// Returns true if every option specified on both `self` (desired) and
    /// `reference` has the same value on both sides.
    fn agrees_with(&self, reference: &Self) -> bool;
}

macro_rules! agrees_by_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Agrees for $ty {
                fn agrees_with(&self, reference: &Self) -> bool {
                    self == reference
                }
            }
        )*
    };
}

agrees_by_eq!(
    bool,
    u32,
    String,
    ColumnType,
    DefaultValue,
    IndexMethod,
    ForeignKeyAction,
);

/// An option only counts when both sides set it.
impl<T: Agrees> Agrees for Option<T> {
    fn agrees_with(&self, reference: &Self) -> bool {
        match (self, reference) {
            (Some(desired), Some(reference)) => desired.agrees_with(reference),
            _ => true,
        }
    }
}

/// Lists are ordered: same length and pairwise agreement.
impl<T: Agrees> Agrees for Vec<T> {
    fn agrees_with(&self, reference: &Self) -> bool {
        self.len() == reference.len()
            && self
                .iter()
                .zip(reference)
                .all(|(desired, reference)| desired.agrees_with(reference))
    }
}

impl Agrees for ColumnOptions {
    fn agrees_with(&self, reference: &Self) -> bool {
        self.column_type.agrees_with(&reference.column_type)
            && self.length.agrees_with(&reference.length)
            && self.precision.agrees_with(&reference.precision)
            && self.scale.agrees_with(&reference.scale)
            && self.nullable.agrees_with(&reference.nullable)
            && self.unsigned.agrees_with(&reference.unsigned)
            && self.default.agrees_with(&reference.default)
            && self.auto_increment.agrees_with(&reference.auto_increment)
            && self.comment.agrees_with(&reference.comment)
            && self.charset.agrees_with(&reference.charset)
            && self.collation.agrees_with(&reference.collation)
    }
}

impl Agrees for IndexOptions {
    fn agrees_with(&self, reference: &Self) -> bool {
        self.columns.agrees_with(&reference.columns)
            && self.unique.agrees_with(&reference.unique)
            && self.primary.agrees_with(&reference.primary)
            && self.method.agrees_with(&reference.method)
    }
}

impl Agrees for Index {
    fn agrees_with(&self, reference: &Self) -> bool {
        self.name == reference.name && self.options.agrees_with(&reference.options)
    }
}

impl Agrees for ForeignKeyOptions {
    fn agrees_with(&self, reference: &Self) -> bool {
        self.columns.agrees_with(&reference.columns)
            && self.referenced_table == reference.referenced_table
            && self
                .referenced_columns
                .agrees_with(&reference.referenced_columns)
            && self.on_update.agrees_with(&reference.on_update)
            && self.on_delete.agrees_with(&reference.on_delete)
    }
}

impl Agrees for ForeignKey {
    fn agrees_with(&self, reference: &Self) -> bool {
        self.name == reference.name && self.options.agrees_with(&reference.options)
    }
}

impl Agrees for TableOptions {
    fn agrees_with(&self, reference: &Self) -> bool {
        self.engine.agrees_with(&reference.engine)
            && self.charset.agrees_with(&reference.charset)
            && self.collation.agrees_with(&reference.collation)
            && self.comment.agrees_with(&reference.comment)
    }
}

impl TableOptions {
    /// Returns the options set on `self` whose value differs from
    /// `reference`, including options `reference` leaves unset.
    #[must_use]
    pub fn changed_from(&self, reference: &Self) -> Self {
        fn changed(desired: &Option<String>, reference: &Option<String>) -> Option<String> {
            match desired {
                Some(value) if reference.as_ref() != Some(value) => Some(value.clone()),
                _ => None,
            }
        }

        Self {
            engine: changed(&self.engine, &reference.engine),
            charset: changed(&self.charset, &reference.charset),
            collation: changed(&self.collation, &reference.collation),
            comment: changed(&self.comment, &reference.comment),
        }
    }
}
