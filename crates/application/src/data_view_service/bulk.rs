use super::*;

impl DataViewService {
    /// Applies a bulk action to the selected records and returns how many were
    /// affected.
    ///
    /// The action is all-or-nothing: an unknown id aborts it with `NotFound`
    /// before any record changes.
    pub async fn bulk_action(
        &self,
        grid: &GridConfig,
        action_key: &str,
        record_ids: &[String],
    ) -> AppResult<usize> {
        let bulk_action = grid.bulk_action(action_key).ok_or_else(|| {
            AppError::Validation(format!(
                "unknown bulk action '{action_key}' for resource '{}'",
                grid.resource()
            ))
        })?;

        let record_ids = distinct_ids(record_ids);
        if record_ids.is_empty() {
            return Err(AppError::Validation(
                "select at least one record for a bulk action".to_owned(),
            ));
        }

        match bulk_action.operation() {
            BulkOperation::Delete => {
                self.repository
                    .bulk_delete(grid.resource(), &record_ids)
                    .await
            }
            BulkOperation::SetField { field, value } => {
                self.repository
                    .bulk_set_field(
                        grid.resource(),
                        &record_ids,
                        field,
                        value.clone(),
                        grid.is_unique_field(field),
                    )
                    .await
            }
        }
    }
}

fn distinct_ids(record_ids: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    record_ids
        .iter()
        .map(|record_id| record_id.trim())
        .filter(|record_id| !record_id.is_empty() && seen.insert(*record_id))
        .map(str::to_owned)
        .collect()
}
