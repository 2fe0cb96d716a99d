use crate::database::ReputationStore;
use crate::error::StoreError;
use std::future::Future;

/// Looks up the name a user currently has on the chat platform.
pub trait NameResolver {
    fn current_name(&self, user_id: &str) -> impl Future<Output = anyhow::Result<String>> + Send;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub scanned: usize,
    pub renamed: usize,
    pub failed: usize,
}

/// Brings stored display names in line with the platform. All records are
/// scanned before any rename is written.
pub async fn reconcile_display_names<R: NameResolver>(
    store: &ReputationStore,
    resolver: &R,
) -> Result<ReconcileReport, StoreError> {
    let records = store.list_all().await?;
    let mut report = ReconcileReport {
        scanned: records.len(),
        ..Default::default()
    };

    let mut pending = Vec::new();
    for record in records {
        match resolver.current_name(&record.user_id).await {
            Ok(name) if name != record.display_name => {
                tracing::debug!("{} is now known as {}", record.display_name, name);
                pending.push((record.user_id, name));
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Could not resolve name for user {}: {}", record.user_id, e);
                report.failed += 1;
            }
        }
    }

    for (user_id, name) in pending {
        match store.rename(&user_id, &name).await {
            Ok(()) => report.renamed += 1,
            Err(e) => {
                tracing::error!("Failed to rename user {}: {}", user_id, e);
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        "Name reconciliation finished: {} scanned, {} renamed, {} failed",
        report.scanned,
        report.renamed,
        report.failed
    );
    Ok(report)
}
