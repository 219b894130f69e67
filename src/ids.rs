//! Transient identifiers for CTIM entities

use uuid::Uuid;

/// Source of request-scoped entity ids (`transient:<kind>-<suffix>`).
pub trait IdGenerator: Send + Sync {
    fn transient_id(&self, kind: &str) -> String;
}

/// Random UUIDv4 ids
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn transient_id(&self, kind: &str) -> String {
        format!("transient:{}-{}", kind, Uuid::new_v4())
    }
}

/// Deterministic ids for tests: `transient:<kind>-1`, `-2`, ...
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl IdGenerator for SequentialIdGenerator {
    fn transient_id(&self, kind: &str) -> String {
        let n = self.next.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        format!("transient:{}-{}", kind, n)
    }
}
