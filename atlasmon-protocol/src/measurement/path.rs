use serde::{Deserialize, Serialize};

/// Autonomous System number.
pub type Asn = u32;

/// Hop-by-hop AS path of a traceroute, as produced by the resolver.
///
/// Each entry is the ASN a hop was resolved to, or `None` when the hop did not
/// answer or could not be resolved. Serialized as `[3333, null, 1267]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AsPath(Vec<Option<Asn>>);

impl AsPath {
    pub fn new(hops: Vec<Option<Asn>>) -> Self {
        Self(hops)
    }

    pub fn hops(&self) -> &[Option<Asn>] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolved ASNs in hop order, gaps skipped.
    pub fn resolved(&self) -> impl Iterator<Item = Asn> + '_ {
        self.0.iter().flatten().copied()
    }

    pub fn last_resolved(&self) -> Option<Asn> {
        self.0.iter().rev().flatten().next().copied()
    }

    /// One entry per AS traversal.
    ///
    /// Consecutive hops in the same AS collapse into a single entry, even when
    /// unresolved hops sit between them. Runs of gaps between two different
    /// ASNs collapse into a single `None`.
    pub fn traversals(&self) -> Vec<Option<Asn>> {
        let mut out = Vec::with_capacity(self.0.len());
        let mut last: Option<Asn> = None;
        let mut pending_gap = false;

        for hop in &self.0 {
            match hop {
                None => pending_gap = true,
                Some(asn) if last == Some(*asn) => pending_gap = false,
                Some(asn) => {
                    if pending_gap {
                        out.push(None);
                        pending_gap = false;
                    }
                    out.push(Some(*asn));
                    last = Some(*asn);
                }
            }
        }

        if pending_gap {
            out.push(None);
        }
        out
    }

    /// Traversals with the probe's own network removed from the head.
    pub fn traversals_after(&self, src_as: Option<Asn>) -> Vec<Option<Asn>> {
        let traversals = self.traversals();
        match src_as {
            Some(src) => traversals
                .into_iter()
                .skip_while(|hop| hop.map_or(true, |asn| asn == src))
                .collect(),
            None => traversals,
        }
    }
}

impl From<Vec<Option<Asn>>> for AsPath {
    fn from(hops: Vec<Option<Asn>>) -> Self {
        AsPath::new(hops)
    }
}

impl FromIterator<Option<Asn>> for AsPath {
    fn from_iter<I: IntoIterator<Item = Option<Asn>>>(iter: I) -> Self {
        AsPath(iter.into_iter().collect())
    }
}
