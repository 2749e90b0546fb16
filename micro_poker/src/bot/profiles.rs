//! Per-participant behavior profiles the house uses to adjust its play.

use super::models::OpponentProfile;
use crate::game::entities::{Action, UserId};
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Profile store shared by every hand
#[derive(Debug, Default)]
pub struct ProfileStore {
    /// Profiles keyed by participant
    profiles: Arc<RwLock<HashMap<UserId, OpponentProfile>>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted action
    ///
    /// # Arguments
    ///
    /// * `user_id` - Participant who acted
    /// * `action` - The action the hand accepted
    ///
    /// # Returns
    ///
    /// * `OpponentProfile` - The updated profile
    pub async fn record_action(&self, user_id: UserId, action: &Action) -> OpponentProfile {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.entry(user_id).or_default();
        profile.record(action, Utc::now());
        log::trace!(
            "profile for {user_id}: {} actions, {} all-ins",
            profile.action_count,
            profile.all_in_count
        );
        profile.clone()
    }

    pub async fn get_profile(&self, user_id: UserId) -> Option<OpponentProfile> {
        self.profiles.read().await.get(&user_id).cloned()
    }

    /// Number of participants with a profile
    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_participant_has_no_profile() {
        let store = ProfileStore::new();
        assert!(store.get_profile(1).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_record_action_accumulates() {
        let store = ProfileStore::new();
        store.record_action(1, &Action::Call).await;
        store.record_action(1, &Action::AllIn).await;
        let profile = store.record_action(1, &Action::AllIn).await;

        assert_eq!(profile.action_count, 3);
        assert_eq!(profile.all_in_count, 2);
        assert!(profile.last_action_at.is_some());
        assert_eq!(store.get_profile(1).await, Some(profile));
        assert!(store.get_profile(2).await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_records_are_not_lost() {
        let store = Arc::new(ProfileStore::new());
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let action = if i % 2 == 0 { Action::AllIn } else { Action::Check };
                store.record_action(7, &action).await;
                store.record_action(8, &Action::Fold).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let profile = store.get_profile(7).await.unwrap();
        assert_eq!(profile.action_count, 20);
        assert_eq!(profile.all_in_count, 10);
        assert_eq!(store.get_profile(8).await.unwrap().action_count, 20);
        assert_eq!(store.len().await, 2);
    }
}
