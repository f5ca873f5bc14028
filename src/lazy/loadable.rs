use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The value a library resolves to once loaded.
///
/// Cloning is cheap; all clones share the same underlying value.
#[derive(Clone)]
pub struct LibraryValue(Arc<dyn Any + Send + Sync>);

impl LibraryValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for LibraryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LibraryValue(..)")
    }
}

/// Something that can asynchronously produce a library.
#[async_trait]
pub trait Loadable: Send + Sync {
    async fn load(&self) -> Result<LibraryValue, BoxError>;
}

/// Adapts an async closure into a [`Loadable`].
pub struct LoadFn<F>(F);

impl<F> LoadFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> Loadable for LoadFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<LibraryValue, BoxError>> + Send + 'static,
{
    async fn load(&self) -> Result<LibraryValue, BoxError> {
        (self.0)().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast() {
        let value = LibraryValue::new(String::from("prettier"));
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("prettier"));
        assert!(value.downcast_ref::<u32>().is_none());
        assert!(value.ptr_eq(&value.clone()));
    }

    #[tokio::test]
    async fn test_load_fn() {
        let loadable = LoadFn::new(|| async { Ok::<_, BoxError>(LibraryValue::new(7u32)) });
        let value = loadable.load().await.unwrap();
        assert_eq!(value.downcast_ref::<u32>(), Some(&7));
    }
}
