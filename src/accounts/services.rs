use time::{Duration, OffsetDateTime};
use tracing::{debug, info, instrument};

use crate::accounts::repo_types::UserAccount;
use crate::error::StoreError;
use crate::mining::{apply_reward, evaluate, Eligibility};
use crate::state::AppState;

/// Result of a `/mine` request.
#[derive(Debug, Clone, PartialEq)]
pub enum MineOutcome {
    Mined {
        reward: f64,
        new_balance: f64,
        mined_at: OffsetDateTime,
    },
    TooSoon {
        remaining: Duration,
    },
}

/// Load the caller's account, creating it on first contact.
#[instrument(skip(st))]
pub async fn open_account(st: &AppState, user_id: &str) -> Result<UserAccount, StoreError> {
    st.store()?.fetch_or_initialize(user_id).await
}

#[instrument(skip(st))]
pub async fn balance(st: &AppState, user_id: &str) -> Result<f64, StoreError> {
    Ok(open_account(st, user_id).await?.balance)
}

/// Credit the reward if the cooldown has passed at `now`.
///
/// Read and write are separate round trips; two racing requests from the
/// same user can both be credited.
#[instrument(skip(st))]
pub async fn mine(
    st: &AppState,
    user_id: &str,
    now: OffsetDateTime,
) -> Result<MineOutcome, StoreError> {
    let store = st.store()?;
    let account = store.fetch_or_initialize(user_id).await?;

    match evaluate(account.last_mine_at, now) {
        Eligibility::Eligible => {
            let (reward, new_balance) = apply_reward(account.balance);
            store.apply_mine(user_id, new_balance, now).await?;
            info!(%user_id, reward, new_balance, "mined");
            Ok(MineOutcome::Mined {
                reward,
                new_balance,
                mined_at: now,
            })
        }
        Eligibility::NotYet(remaining) => {
            debug!(%user_id, remaining_secs = remaining.whole_seconds(), "mine on cooldown");
            Ok(MineOutcome::TooSoon { remaining })
        }
    }
}

#[cfg(test)]
mod service_tests {
    use super::*;
    use crate::accounts::memory::MemoryStore;
    use crate::accounts::repo_types::UserDocument;
    use crate::mining::{COOLDOWN, NEVER_MINED};
    use std::sync::Arc;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-06-01 12:00:00 UTC);

    #[tokio::test]
    async fn new_user_starts_empty_and_eligible() {
        let store = Arc::new(MemoryStore::default());
        let state = AppState::fake_with(store.clone());

        let acc = open_account(&state, "42").await.unwrap();
        assert_eq!(acc.balance, 0.0);
        assert_eq!(acc.last_mine_at, NEVER_MINED);
        assert_eq!(evaluate(acc.last_mine_at, NOW), Eligibility::Eligible);

        let doc = store.get("42").await.expect("document created");
        assert_eq!(doc.balance, 0.0);
        assert_eq!(doc.last_mine, "0001-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn first_mine_then_cooldown() {
        let state = AppState::fake();

        let first = mine(&state, "42", NOW).await.unwrap();
        assert_eq!(
            first,
            MineOutcome::Mined {
                reward: 10.0,
                new_balance: 10.0,
                mined_at: NOW,
            }
        );
        assert_eq!(balance(&state, "42").await.unwrap(), 10.0);

        let later = NOW + Duration::hours(1);
        let second = mine(&state, "42", later).await.unwrap();
        assert_eq!(
            second,
            MineOutcome::TooSoon {
                remaining: COOLDOWN - Duration::hours(1)
            }
        );
        assert_eq!(balance(&state, "42").await.unwrap(), 10.0);

        let third = mine(&state, "42", NOW + COOLDOWN).await.unwrap();
        assert!(matches!(third, MineOutcome::Mined { new_balance, .. } if new_balance == 20.0));
    }

    #[tokio::test]
    async fn eligible_mine_updates_existing_record() {
        let store = Arc::new(MemoryStore::default());
        store
            .insert(
                "7",
                UserDocument {
                    balance: 100.0,
                    last_mine: "2025-05-31T00:00:00Z".into(),
                },
            )
            .await;
        let state = AppState::fake_with(store.clone());

        let outcome = mine(&state, "7", NOW).await.unwrap();
        assert_eq!(
            outcome,
            MineOutcome::Mined {
                reward: 10.0,
                new_balance: 110.0,
                mined_at: NOW,
            }
        );

        let acc = open_account(&state, "7").await.unwrap();
        assert_eq!(acc.balance, 110.0);
        assert_eq!(acc.last_mine_at, NOW);
        assert_eq!(store.get("7").await.unwrap().last_mine, "2025-06-01T12:00:00Z");
    }

    #[tokio::test]
    async fn one_minute_short_of_cooldown() {
        let store = Arc::new(MemoryStore::default());
        store
            .insert(
                "9",
                UserDocument {
                    balance: 30.0,
                    last_mine: "2025-06-01T04:01:00Z".into(),
                },
            )
            .await;
        let state = AppState::fake_with(store);

        let outcome = mine(&state, "9", NOW).await.unwrap();
        assert_eq!(
            outcome,
            MineOutcome::TooSoon {
                remaining: Duration::minutes(1)
            }
        );
    }

    #[tokio::test]
    async fn malformed_record_is_not_rewritten() {
        let store = Arc::new(MemoryStore::default());
        let broken = UserDocument {
            balance: 5.0,
            last_mine: "not a time".into(),
        };
        store.insert("3", broken.clone()).await;
        let state = AppState::fake_with(store.clone());

        let err = mine(&state, "3", NOW).await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedRecord { .. }));
        assert_eq!(store.get("3").await, Some(broken));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_operation() {
        let state = AppState::fake_unavailable();
        assert!(matches!(
            open_account(&state, "1").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(balance(&state, "1").await, Err(StoreError::Unavailable(_))));
        assert!(matches!(
            mine(&state, "1", NOW).await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
