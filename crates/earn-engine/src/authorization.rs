use earn_types::{ActorRole, Quest, UserId};

/// Whether an actor may decide submissions for a quest: platform admins,
/// the quest creator, and listed verifiers. Pure read-only check against
/// the already-loaded quest.
pub fn authorize_decision(quest: &Quest, actor: &UserId, role: ActorRole) -> bool {
    role == ActorRole::Admin || &quest.creator == actor || quest.has_verifier(actor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use earn_types::{QuestId, RewardAmount};

    fn quest() -> Quest {
        Quest {
            id: QuestId::from("q-1"),
            title: "Translate docs".to_string(),
            contract_task_id: "task-q-1".to_string(),
            reward: RewardAmount::from_tokens(50.0),
            reward_asset: "XLM".to_string(),
            creator: UserId::from("creator"),
            verifiers: vec![UserId::from("v-1")],
        }
    }

    #[test]
    fn test_admin_always_authorized() {
        assert!(authorize_decision(
            &quest(),
            &UserId::from("anyone"),
            ActorRole::Admin
        ));
    }

    #[test]
    fn test_creator_authorized() {
        assert!(authorize_decision(
            &quest(),
            &UserId::from("creator"),
            ActorRole::Verifier
        ));
    }

    #[test]
    fn test_listed_verifier_authorized() {
        assert!(authorize_decision(
            &quest(),
            &UserId::from("v-1"),
            ActorRole::Verifier
        ));
    }

    #[test]
    fn test_stranger_rejected() {
        assert!(!authorize_decision(
            &quest(),
            &UserId::from("stranger"),
            ActorRole::Verifier
        ));
        assert!(!authorize_decision(
            &quest(),
            &UserId::from("stranger"),
            ActorRole::Worker
        ));
    }
}
