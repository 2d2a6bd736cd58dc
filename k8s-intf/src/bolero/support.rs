// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use std::net::Ipv4Addr;

/// Hands out pairwise-disjoint IPv4 prefixes, so that generated objects never
/// collide with each other unless a test makes them.
#[derive(Debug, Clone)]
pub struct DisjointV4Allocator {
    base: u32,
    next: u32,
}

impl DisjointV4Allocator {
    /// Allocate blocks of at most /16 from `base`, which must itself be a /8 or shorter.
    #[must_use]
    pub fn new(base: Ipv4Addr) -> Self {
        Self {
            base: u32::from(base) & 0xff00_0000,
            next: 0,
        }
    }

    /// The next free block with mask `len`, in 16 to 32. Each block consumes a whole /16.
    pub fn next_cidr(&mut self, len: u8) -> String {
        let len = len.clamp(16, 32);
        let addr = Ipv4Addr::from(self.base | ((self.next & 0xff) << 16));
        self.next = self.next.wrapping_add(1);
        format!("{addr}/{len}")
    }
}
