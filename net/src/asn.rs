// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use std::num::NonZero;

/// A BGP autonomous system number. Zero is reserved and never a legal [`Asn`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Asn(NonZero<u32>);

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("ASN 0 is reserved")]
pub struct InvalidAsn;

impl Asn {
    /// Create an [`Asn`] from a `u32`.
    ///
    /// # Errors
    ///
    /// Fails with [`InvalidAsn`] if `asn` is zero.
    pub fn new(asn: u32) -> Result<Self, InvalidAsn> {
        NonZero::new(asn).map(Asn).ok_or(InvalidAsn)
    }

    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for Asn {
    type Error = InvalidAsn;
    fn try_from(asn: u32) -> Result<Self, Self::Error> {
        Asn::new(asn)
    }
}

impl std::fmt::Display for Asn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
