use async_trait::async_trait;
use census::ShapeIndex;

/// Gets tract geometry from an external provider.
#[async_trait]
pub trait GeometrySource {
    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
    /// Loads every tract geometry the provider has, keyed by tract.
    async fn geometries(&self) -> anyhow::Result<ShapeIndex>;
}
