use std::env;

use auditsweep_application::DEFAULT_LEASE_SECONDS;
use auditsweep_core::{AppError, AppResult};
use auditsweep_infrastructure::DEFAULT_TRIM_BATCH_SIZE;

/// How the worker process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMode {
    /// Sweep on every tick until interrupted.
    Loop,
    /// Run exactly one sweep and exit, for cron-style triggers.
    Once,
    /// Apply database migrations and exit.
    MigrateOnly,
}

/// Backend providing the cross-node audit trimming lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockBackend {
    /// Redis `SET NX EX` leases.
    Redis {
        /// Redis connection URL.
        redis_url: String,
    },
    /// Lease rows in the `distributed_locks` table.
    Postgres,
}

impl LockBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redis { .. } => "redis",
            Self::Postgres => "postgres",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub mode: WorkerMode,
    pub database_url: String,
    pub lock_backend: LockBackend,
    pub lock_key_prefix: String,
    pub worker_id: String,
    pub lease_seconds: u32,
    pub tick_seconds: u64,
    pub batch_size: u32,
}

impl WorkerConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_source(env::args().nth(1).as_deref(), |name| env::var(name).ok())
    }

    fn from_source(
        command: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let mode = match command {
            None => WorkerMode::Loop,
            Some("once") => WorkerMode::Once,
            Some("migrate") => WorkerMode::MigrateOnly,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "unknown worker command '{other}', expected 'once' or 'migrate'"
                )));
            }
        };

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        let redis_url = non_empty(lookup("REDIS_URL"));
        let lock_backend = match non_empty(lookup("AUDIT_SWEEP_LOCK_BACKEND")).as_deref() {
            None => match redis_url {
                Some(redis_url) => LockBackend::Redis { redis_url },
                None => LockBackend::Postgres,
            },
            Some("postgres") => LockBackend::Postgres,
            Some("redis") => LockBackend::Redis {
                redis_url: redis_url.ok_or_else(|| {
                    AppError::Validation(
                        "REDIS_URL is required when AUDIT_SWEEP_LOCK_BACKEND=redis".to_owned(),
                    )
                })?,
            },
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "invalid AUDIT_SWEEP_LOCK_BACKEND value '{other}', expected 'redis' or 'postgres'"
                )));
            }
        };
        let lock_key_prefix = non_empty(lookup("AUDIT_SWEEP_LOCK_KEY_PREFIX"))
            .unwrap_or_else(|| "auditsweep:lock".to_owned());
        let worker_id = non_empty(lookup("WORKER_ID"))
            .unwrap_or_else(|| format!("worker-{}", std::process::id()));
        let lease_seconds =
            parse_u32(&lookup, "AUDIT_SWEEP_LEASE_SECONDS", DEFAULT_LEASE_SECONDS)?;
        let tick_seconds = parse_u64(&lookup, "AUDIT_SWEEP_TICK_SECONDS", 60)?;
        let batch_size =
            parse_u32(&lookup, "AUDIT_SWEEP_BATCH_SIZE", DEFAULT_TRIM_BATCH_SIZE)?;

        if lease_seconds == 0 {
            return Err(AppError::Validation(
                "AUDIT_SWEEP_LEASE_SECONDS must be greater than zero".to_owned(),
            ));
        }

        if tick_seconds == 0 {
            return Err(AppError::Validation(
                "AUDIT_SWEEP_TICK_SECONDS must be greater than zero".to_owned(),
            ));
        }

        if batch_size == 0 {
            return Err(AppError::Validation(
                "AUDIT_SWEEP_BATCH_SIZE must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            mode,
            database_url,
            lock_backend,
            lock_key_prefix,
            worker_id,
            lease_seconds,
            tick_seconds,
            batch_size,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_u32(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u32,
) -> AppResult<u32> {
    match lookup(name) {
        Some(value) => value.trim().parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> AppResult<u64> {
    match lookup(name) {
        Some(value) => value.trim().parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
