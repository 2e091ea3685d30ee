//! Participant ordering
//!
//! Every output (series order, legend order, difference sign) uses the same
//! participant order: lexical, with an optional configured "self" identity
//! pinned first.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::EnrichedMessage;

/// Distinct senders of a dataset in their canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParticipantSet {
    names: Vec<String>,
}

impl ParticipantSet {
    /// Build from sender names. Duplicates collapse; a `self_name` that
    /// doesn't match any sender leaves pure lexical order.
    pub fn new<I, S>(senders: I, self_name: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = senders.into_iter().map(Into::into).collect();
        let mut names: Vec<String> = unique.into_iter().collect();

        if let Some(me) = self_name {
            if let Some(pos) = names.iter().position(|n| n == me) {
                let pinned = names.remove(pos);
                names.insert(0, pinned);
            } else {
                tracing::debug!(self_name = me, "Self identity not among senders");
            }
        }

        Self { names }
    }

    pub fn from_messages(messages: &[EnrichedMessage], self_name: Option<&str>) -> Self {
        Self::new(messages.iter().map(|m| m.sender()), self_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, sender: &str) -> Option<usize> {
        self.names.iter().position(|n| n == sender)
    }

    pub fn contains(&self, sender: &str) -> bool {
        self.position(sender).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}
