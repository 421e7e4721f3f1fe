//! Unit identifiers.
//!
//! Each `Unit` (clause or formula) owns exactly one `Inference` describing its rule and parent
//! units. A `Unit` here is purely the identity the rest of the workspace (clauses in `saturate`,
//! naming-premise clauses in the splitter) attaches its provenance to; this crate does not know
//! what a unit *contains*.

/// Identifies one derived (or input) unit in the inference DAG.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct UnitId {
    index: u32,
}

impl UnitId {
    #[inline]
    pub(crate) fn from_index(index: usize) -> UnitId {
        UnitId {
            index: index as u32,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}
