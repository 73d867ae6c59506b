//! Write staging
//!
//! A [`WriteBatch`] buffers the writes of one transaction attempt. Nothing in
//! a batch touches the store until `Store::commit`, which applies the whole
//! batch atomically or not at all. Staged operations are applied in the order
//! they were added.

use bazaar_core::{Key, Value};

/// One staged write operation
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Set a hash field to a scalar value
    HashSet {
        /// Hash entry key
        key: Key,
        /// Field name
        field: String,
        /// New value
        value: Value,
    },
    /// Adjust an integer hash field by a signed delta
    ///
    /// A missing entry or field starts from zero. A non-integer field fails
    /// the whole batch.
    HashIncr {
        /// Hash entry key
        key: Key,
        /// Field name
        field: String,
        /// Signed adjustment
        delta: i64,
    },
    /// Add a member to a set
    SetAdd {
        /// Set entry key
        key: Key,
        /// Member to add
        member: String,
    },
    /// Remove a member from a set
    SetRemove {
        /// Set entry key
        key: Key,
        /// Member to remove
        member: String,
    },
    /// Insert or update a sorted member with a score
    SortedAdd {
        /// Sorted entry key
        key: Key,
        /// Member to upsert
        member: String,
        /// Score to store
        score: i64,
    },
    /// Remove a sorted member
    SortedRemove {
        /// Sorted entry key
        key: Key,
        /// Member to remove
        member: String,
    },
    /// Remove a whole entry regardless of kind
    Delete {
        /// Key to remove
        key: Key,
    },
}

impl WriteOp {
    /// The key this operation mutates
    pub fn key(&self) -> &Key {
        match self {
            WriteOp::HashSet { key, .. }
            | WriteOp::HashIncr { key, .. }
            | WriteOp::SetAdd { key, .. }
            | WriteOp::SetRemove { key, .. }
            | WriteOp::SortedAdd { key, .. }
            | WriteOp::SortedRemove { key, .. }
            | WriteOp::Delete { key } => key,
        }
    }
}

/// Ordered buffer of staged writes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        WriteBatch::default()
    }

    /// Stage: set a hash field
    pub fn hash_set(&mut self, key: Key, field: impl Into<String>, value: impl Into<Value>) {
        self.ops.push(WriteOp::HashSet {
            key,
            field: field.into(),
            value: value.into(),
        });
    }

    /// Stage: adjust an integer hash field
    pub fn hash_incr(&mut self, key: Key, field: impl Into<String>, delta: i64) {
        self.ops.push(WriteOp::HashIncr {
            key,
            field: field.into(),
            delta,
        });
    }

    /// Stage: add a set member
    pub fn set_add(&mut self, key: Key, member: impl Into<String>) {
        self.ops.push(WriteOp::SetAdd {
            key,
            member: member.into(),
        });
    }

    /// Stage: remove a set member
    pub fn set_remove(&mut self, key: Key, member: impl Into<String>) {
        self.ops.push(WriteOp::SetRemove {
            key,
            member: member.into(),
        });
    }

    /// Stage: upsert a sorted member with a score
    pub fn sorted_add(&mut self, key: Key, member: impl Into<String>, score: i64) {
        self.ops.push(WriteOp::SortedAdd {
            key,
            member: member.into(),
            score,
        });
    }

    /// Stage: remove a sorted member
    pub fn sorted_remove(&mut self, key: Key, member: impl Into<String>) {
        self.ops.push(WriteOp::SortedRemove {
            key,
            member: member.into(),
        });
    }

    /// Stage: delete a whole entry
    pub fn delete(&mut self, key: Key) {
        self.ops.push(WriteOp::Delete { key });
    }

    /// Staged operations, in staging order
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Number of staged operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing has been staged
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consume the batch, yielding the staged operations
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_preserves_staging_order() {
        let mut batch = WriteBatch::new();
        batch.set_remove(Key::new("inventory:s"), "sword");
        batch.sorted_add(Key::new("market:listings"), "sword:s", 10);

        assert_eq!(batch.len(), 2);
        assert!(matches!(batch.ops()[0], WriteOp::SetRemove { .. }));
        assert!(matches!(batch.ops()[1], WriteOp::SortedAdd { .. }));
    }

    #[test]
    fn op_key_covers_all_variants() {
        let key = Key::new("k");
        let ops = [
            WriteOp::HashSet {
                key: key.clone(),
                field: "f".into(),
                value: Value::Int(1),
            },
            WriteOp::HashIncr {
                key: key.clone(),
                field: "f".into(),
                delta: 1,
            },
            WriteOp::SetAdd {
                key: key.clone(),
                member: "m".into(),
            },
            WriteOp::SetRemove {
                key: key.clone(),
                member: "m".into(),
            },
            WriteOp::SortedAdd {
                key: key.clone(),
                member: "m".into(),
                score: 0,
            },
            WriteOp::SortedRemove {
                key: key.clone(),
                member: "m".into(),
            },
            WriteOp::Delete { key: key.clone() },
        ];
        for op in &ops {
            assert_eq!(op.key(), &key);
        }
    }

    #[test]
    fn empty_batch_reports_empty() {
        let batch = WriteBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
        assert!(batch.into_ops().is_empty());
    }
}
