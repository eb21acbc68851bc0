use tower_sessions::session::Id;

/// Source of fresh session ids.
///
/// Ids must be unpredictable and collision resistant; the default generator
/// draws 128 random bits per id.
pub trait IdGenerator: Send + Sync + 'static {
    fn generate(&self) -> String;
}

/// 128-bit random ids, rendered as unpadded URL-safe base64.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        Id::default().to_string()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync + 'static,
{
    fn generate(&self) -> String {
        self()
    }
}
