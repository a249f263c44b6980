//! Immutable key/value chain carried by a [`Context`](super::Context).
//!
//! Each binding is a node pointing at the previous chain, so deriving a context is `O(1)`
//! and siblings share their common prefix. Lookups walk newest to oldest.

use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

pub(crate) type Value = Arc<dyn Any + Send + Sync>;

pub(crate) struct ValueNode {
    key: Cow<'static, str>,
    value: Value,
    next: Option<Arc<ValueNode>>,
}

impl ValueNode {
    pub(crate) fn push(
        head: &Option<Arc<ValueNode>>,
        key: Cow<'static, str>,
        value: Value,
    ) -> Arc<ValueNode> {
        Arc::new(ValueNode {
            key,
            value,
            next: head.clone(),
        })
    }

    /// Returns the newest binding for `key`, or `None` if absent or of another type.
    pub(crate) fn find<'a, T: Any>(head: &'a Option<Arc<ValueNode>>, key: &str) -> Option<&'a T> {
        let mut cur = head.as_deref();
        while let Some(node) = cur {
            if node.key == key {
                return node.value.downcast_ref::<T>();
            }
            cur = node.next.as_deref();
        }
        None
    }

    pub(crate) fn keys(head: &Option<Arc<ValueNode>>) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cur = head.as_deref();
        while let Some(node) = cur {
            out.push(node.key.as_ref());
            cur = node.next.as_deref();
        }
        out
    }
}
