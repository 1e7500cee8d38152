//! Per-window mapping from event code to the callbacks subscribed to it.
//!
//! Each code maps to an ordered sequence of `(secret, handler)` entries.
//! Iteration follows insertion order, but removal may reorder the remaining
//! entries (see [`RemovalPolicy`]). Aggregation over the handlers is
//! commutative, so dispatch results never depend on that order.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::token::CallbackToken;
use super::EventCode;

/// How the 16-bit secret of a new token is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretPolicy {
    /// Fresh entropy-seeded draw per registration. Two entries under the same
    /// code collide with probability 1/65536; a removal then deletes either one.
    #[default]
    Random,
    /// Per-registry wrapping counter. Unique until 65536 registrations.
    Sequential,
}

/// How an entry is taken out of its code's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Swap with the last entry and pop. O(1), reorders the tail.
    #[default]
    SwapRemove,
    /// Shift later entries down. Preserves registration order.
    Ordered,
}

#[derive(Debug, Clone)]
struct Entry<H> {
    secret: u16,
    handler: H,
}

/// Event code to callback list mapping, generic over the handler type.
#[derive(Debug, Clone)]
pub struct CallbackRegistry<H> {
    entries: HashMap<EventCode, Vec<Entry<H>>>,
    secret_policy: SecretPolicy,
    removal_policy: RemovalPolicy,
    next_secret: u16,
}

impl<H> CallbackRegistry<H> {
    /// Create an empty registry with random secrets and swap removal.
    pub fn new() -> Self {
        Self::with_policies(SecretPolicy::default(), RemovalPolicy::default())
    }

    pub fn with_policies(secret_policy: SecretPolicy, removal_policy: RemovalPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            secret_policy,
            removal_policy,
            next_secret: 0,
        }
    }

    /// Append `handler` to the sequence for `code` and return its token.
    pub fn register(&mut self, code: EventCode, handler: H) -> CallbackToken {
        let secret = self.next_secret();
        self.entries
            .entry(code)
            .or_default()
            .push(Entry { secret, handler });
        CallbackToken::new(code, secret)
    }

    /// Remove the entry `token` refers to.
    ///
    /// Returns false if the code has no entries or no secret matches. That is
    /// a normal outcome, e.g. for a token that was already spent.
    pub fn unregister(&mut self, token: CallbackToken) -> bool {
        let code = token.code();
        let secret = token.secret();

        let Some(list) = self.entries.get_mut(&code) else {
            return false;
        };
        let Some(index) = list.iter().position(|entry| entry.secret == secret) else {
            return false;
        };

        match self.removal_policy {
            RemovalPolicy::SwapRemove => {
                list.swap_remove(index);
            }
            RemovalPolicy::Ordered => {
                list.remove(index);
            }
        }

        if list.is_empty() {
            self.entries.remove(&code);
        }
        true
    }

    /// Handlers currently registered for `code`, in iteration order.
    ///
    /// Empty both for codes that never had entries and for codes whose
    /// entries were all removed.
    pub fn lookup(&self, code: EventCode) -> impl Iterator<Item = &H> + '_ {
        self.entries
            .get(&code)
            .into_iter()
            .flat_map(|list| list.iter().map(|entry| &entry.handler))
    }

    /// Number of handlers registered for `code`.
    pub fn len_for(&self, code: EventCode) -> usize {
        self.entries.get(&code).map_or(0, Vec::len)
    }

    /// Total number of handlers across all codes.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Outstanding tokens become spent.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn secret_policy(&self) -> SecretPolicy {
        self.secret_policy
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }

    fn next_secret(&mut self) -> u16 {
        match self.secret_policy {
            SecretPolicy::Random => StdRng::from_entropy().gen(),
            SecretPolicy::Sequential => {
                let secret = self.next_secret;
                self.next_secret = self.next_secret.wrapping_add(1);
                secret
            }
        }
    }
}

impl<H> Default for CallbackRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential(removal: RemovalPolicy) -> CallbackRegistry<&'static str> {
        CallbackRegistry::with_policies(SecretPolicy::Sequential, removal)
    }

    #[test]
    fn test_empty_lookup() {
        let registry: CallbackRegistry<u8> = CallbackRegistry::new();
        assert_eq!(registry.lookup(100).count(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_then_unregister_once() {
        let mut registry = CallbackRegistry::new();
        let token = registry.register(100, "a");
        assert_eq!(token.code(), 100);
        assert!(registry.unregister(token));
        assert!(!registry.unregister(token));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_follows_insertion_order() {
        let mut registry = sequential(RemovalPolicy::SwapRemove);
        registry.register(7, "a");
        registry.register(7, "b");
        registry.register(7, "c");
        assert_eq!(registry.lookup(7).copied().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn test_swap_remove_moves_last_into_hole() {
        let mut registry = sequential(RemovalPolicy::SwapRemove);
        let first = registry.register(7, "a");
        registry.register(7, "b");
        registry.register(7, "c");

        assert!(registry.unregister(first));
        assert_eq!(registry.lookup(7).copied().collect::<Vec<_>>(), ["c", "b"]);
    }

    #[test]
    fn test_ordered_remove_preserves_order() {
        let mut registry = sequential(RemovalPolicy::Ordered);
        let first = registry.register(7, "a");
        registry.register(7, "b");
        registry.register(7, "c");

        assert!(registry.unregister(first));
        assert_eq!(registry.lookup(7).copied().collect::<Vec<_>>(), ["b", "c"]);
    }

    #[test]
    fn test_unregister_unknown_code_is_false() {
        let mut registry = sequential(RemovalPolicy::SwapRemove);
        let token = registry.register(1, "a");
        assert!(!registry.unregister(CallbackToken::new(2, token.secret())));
        assert_eq!(registry.len_for(1), 1);
    }

    #[test]
    fn test_unregister_unknown_secret_is_false() {
        let mut registry = sequential(RemovalPolicy::SwapRemove);
        let token = registry.register(1, "a");
        assert!(!registry.unregister(CallbackToken::new(1, token.secret().wrapping_add(1))));
        assert_eq!(registry.len_for(1), 1);
    }

    #[test]
    fn test_sequential_secrets_are_distinct_per_registry() {
        let mut registry = sequential(RemovalPolicy::SwapRemove);
        let a = registry.register(1, "a");
        let b = registry.register(2, "b");
        let c = registry.register(1, "c");
        assert_eq!((a.secret(), b.secret(), c.secret()), (0, 1, 2));
    }

    #[test]
    fn test_sequential_secret_wraps() {
        let mut registry: CallbackRegistry<()> =
            CallbackRegistry::with_policies(SecretPolicy::Sequential, RemovalPolicy::SwapRemove);
        registry.next_secret = u16::MAX;
        assert_eq!(registry.register(1, ()).secret(), u16::MAX);
        assert_eq!(registry.register(1, ()).secret(), 0);
    }

    #[test]
    fn test_len_counts_all_codes() {
        let mut registry = CallbackRegistry::new();
        registry.register(1, ());
        registry.register(1, ());
        registry.register(2, ());
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.len_for(1), 2);
        assert_eq!(registry.len_for(3), 0);
    }

    #[test]
    fn test_clear_spends_tokens() {
        let mut registry = CallbackRegistry::new();
        let token = registry.register(1, ());
        registry.clear();
        assert!(!registry.unregister(token));
    }

    #[test]
    fn test_default_policies() {
        let registry: CallbackRegistry<()> = CallbackRegistry::default();
        assert_eq!(registry.secret_policy(), SecretPolicy::Random);
        assert_eq!(registry.removal_policy(), RemovalPolicy::SwapRemove);
    }
}
