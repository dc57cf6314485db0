use auditsweep_core::{AppError, AppResult};

pub(crate) fn validate_lock_request(
    name: &str,
    holder_id: &str,
    lease_seconds: u32,
) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "distributed lock name must not be empty".to_owned(),
        ));
    }

    if holder_id.trim().is_empty() {
        return Err(AppError::Validation(
            "distributed lock holder_id must not be empty".to_owned(),
        ));
    }

    if lease_seconds == 0 {
        return Err(AppError::Validation(
            "distributed lock lease_seconds must be greater than zero".to_owned(),
        ));
    }

    Ok(())
}
