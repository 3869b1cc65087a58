// 🔁 Re-verification Engine
//
// After the operator fixes the error file by hand, the rejected records are
// validated again on their own and the fixed ones join the accepted set.
//
// Duplicate detection only sees the rejected subset: a fixed record whose title
// now equals a neighbour in the accepted file is not caught here.

use crate::record::{AnnotatedRecord, CleanRecord};
use crate::validator::{Partition, Validator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reverification {
    /// Updated accepted / rejected sets
    pub partition: Partition,

    /// Records that moved from rejected to accepted in this run
    pub corrected: usize,
}

pub struct ReverificationEngine<'a> {
    validator: Validator<'a>,
}

impl<'a> ReverificationEngine<'a> {
    pub fn new(validator: Validator<'a>) -> Self {
        ReverificationEngine { validator }
    }

    /// Newly accepted records come first, then everything accepted before
    pub fn reverify(
        &self,
        rejected: Vec<AnnotatedRecord>,
        accepted: Vec<CleanRecord>,
    ) -> Reverification {
        let stripped: Vec<CleanRecord> = rejected
            .into_iter()
            .map(AnnotatedRecord::into_clean)
            .collect();

        let mut partition = self.validator.mark_errors(stripped);
        let corrected = partition.accepted.len();
        partition.accepted.extend(accepted);

        Reverification {
            partition,
            corrected,
        }
    }
}
