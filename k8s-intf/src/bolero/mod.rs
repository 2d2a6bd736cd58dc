// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

pub mod gateway;
pub mod peering;
pub mod support;

/// A type on which implement `bolero::TypeGenerator` for legal values of `T`
///
/// Generally, `bolero` type generators should generate all possible values of `T` so that it is possible to test validation logic, etc.
/// But often it is desirable to generate only legal values.
/// Instead of having a custom named `bolero::ValueGenerator` struct, it is easier to implement `bolero::TypeGenerator` for `LegalValue<T>`.
#[derive(Debug, Clone, PartialEq)]
pub struct LegalValue<T>(T);

impl<T> LegalValue<T> {
    #[must_use]
    pub fn take(self) -> T {
        self.0
    }
}

impl<T> AsRef<T> for LegalValue<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}
