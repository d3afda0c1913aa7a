use tracing::{debug, info, instrument};

use crate::app_state::SharedAppState;

/// Drops sessions whose refresh token expired, so abandoned logins do not
/// pile up in memory.
#[instrument(skip(app_state))]
pub async fn purge_expired_sessions(app_state: SharedAppState) -> usize {
    let purged = app_state.sessions.purge_expired().await;
    if purged > 0 {
        info!("Purged {} expired sessions", purged);
    } else {
        debug!("No expired sessions to purge");
    }
    purged
}

pub fn setup_session_cleanup(
    app_state: SharedAppState,
) -> tokio::task::JoinHandle<anyhow::Result<()>> {
    let stop_flag = app_state.stop_flag.clone();
    let mut scheduler = clokwerk::AsyncScheduler::new();

    {
        let app_state = app_state.clone();
        scheduler
            .every(app_state.settings.scheduler.session_cleanup.into())
            .run(move || {
                let app_state = app_state.clone();
                async move {
                    purge_expired_sessions(app_state).await;
                }
            });
    }

    tokio::spawn(async move {
        while !stop_flag.is_stopped() {
            scheduler.run_pending().await;
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        info!("Session cleanup stopped");
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_utils::create_test_app_state_with;

    #[tokio::test]
    async fn test_purge_expired_sessions() {
        let (state, _dir) = create_test_app_state_with(&[
            ("api.access_token_ttl", "1"),
            ("api.refresh_token_ttl", "1"),
        ])
        .await;
        let user = state.users.list().await.remove(0);
        state.sessions.issue(user.id).await;
        assert_eq!(purge_expired_sessions(state.clone()).await, 0);

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert_eq!(purge_expired_sessions(state.clone()).await, 1);
        assert_eq!(state.sessions.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_task_ends_with_the_stop_flag() {
        let (state, _dir) = create_test_app_state_with(&[]).await;
        let handle = setup_session_cleanup(state.clone());

        state.stop_flag.stop();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("cleanup task did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
