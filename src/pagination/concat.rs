//! Concatenation policies
//!
//! A policy merges the items of a freshly loaded page into the items
//! accumulated so far. The default appends; the distinct variants drop
//! items whose identity is already present, keeping first occurrences
//! in their original order.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

type ConcatFn<I> = dyn Fn(&[I], Vec<I>) -> Vec<I> + Send + Sync;

/// How a new page joins the accumulated list
pub struct ConcatPolicy<I> {
    name: &'static str,
    concat: Arc<ConcatFn<I>>,
}

impl<I: Clone + 'static> ConcatPolicy<I> {
    /// Naive append: `old ++ new`
    ///
    /// Overlapping pages (items inserted server-side between fetches)
    /// produce duplicates.
    pub fn append() -> Self {
        Self {
            name: "append",
            concat: Arc::new(|accumulated: &[I], page: Vec<I>| {
                let mut merged = Vec::with_capacity(accumulated.len() + page.len());
                merged.extend_from_slice(accumulated);
                merged.extend(page);
                merged
            }),
        }
    }

    /// Append only items whose key has not been seen
    pub fn distinct_by<K, F>(key: F) -> Self
    where
        K: Eq + Hash,
        F: Fn(&I) -> K + Send + Sync + 'static,
    {
        Self {
            name: "distinct_by",
            concat: Arc::new(move |accumulated: &[I], page: Vec<I>| {
                let mut seen: HashSet<K> = accumulated.iter().map(&key).collect();
                let mut merged = Vec::with_capacity(accumulated.len() + page.len());
                merged.extend_from_slice(accumulated);
                merged.extend(page.into_iter().filter(|item| seen.insert(key(item))));
                merged
            }),
        }
    }

    /// Caller-supplied merge
    pub fn custom<F>(concat: F) -> Self
    where
        F: Fn(&[I], Vec<I>) -> Vec<I> + Send + Sync + 'static,
    {
        Self {
            name: "custom",
            concat: Arc::new(concat),
        }
    }
}

impl<I: Clone + Eq + Hash + 'static> ConcatPolicy<I> {
    /// Append only items not already present (identity is the item itself)
    pub fn distinct() -> Self {
        let mut policy = Self::distinct_by(|item: &I| item.clone());
        policy.name = "distinct";
        policy
    }
}

impl<I> ConcatPolicy<I> {
    /// Merge a page into the accumulated items
    pub fn concat(&self, accumulated: &[I], page: Vec<I>) -> Vec<I> {
        (self.concat)(accumulated, page)
    }

    /// Policy name, for logs
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<I: Clone + 'static> Default for ConcatPolicy<I> {
    fn default() -> Self {
        Self::append()
    }
}

impl<I> Clone for ConcatPolicy<I> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            concat: Arc::clone(&self.concat),
        }
    }
}

impl<I> fmt::Debug for ConcatPolicy<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcatPolicy")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
